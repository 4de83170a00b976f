use serde::{Deserialize, Serialize};

use crate::market::Market;

/// Headline outcomes of a single market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    /// Mean true rank of matched colleges, `None` if nobody matched
    pub student_welfare: Option<f64>,
    pub college_welfare: f64,
    /// Share of students holding a seat
    pub match_rate: f64,
    /// Share of seats filled
    pub fill_rate: f64,
    pub mean_apps: f64,
    /// Share of matched students placed at their true first choice
    pub first_choice_rate: f64,
}

impl MarketSummary {
    pub fn from_market(market: &Market) -> Self {
        let n = market.num_students() as f64;
        let matched = market.num_matched();
        let ranks = market.student_rank_of_matches();
        let first_choices = ranks.iter().filter(|&&r| r == 1).count();
        let seats: usize = market.college_caps().iter().sum();
        let empty: usize = market.vacancies().iter().sum();
        let apps: usize = market.num_apps_submitted().iter().sum();

        MarketSummary {
            student_welfare: market.student_welfare().ok(),
            college_welfare: market.college_welfare(),
            match_rate: matched as f64 / n,
            fill_rate: (seats - empty) as f64 / seats as f64,
            mean_apps: apps as f64 / n,
            first_choice_rate: if matched == 0 {
                0.0
            } else {
                first_choices as f64 / matched as f64
            },
        }
    }
}

/// Mean, spread and range of one metric across runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl MeanStd {
    /// `None` for an empty sample
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mean = mean(values);
        Some(MeanStd {
            mean,
            std: std_dev(values, mean),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Results across many independent markets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResults {
    pub num_runs: usize,
    /// Runs where no student matched, left out of `student_welfare`
    pub runs_without_matches: usize,
    pub student_welfare: Option<MeanStd>,
    pub college_welfare: Option<MeanStd>,
    pub match_rate: Option<MeanStd>,
    pub fill_rate: Option<MeanStd>,
    pub mean_apps: Option<MeanStd>,
    pub first_choice_rate: Option<MeanStd>,
}

impl AggregateResults {
    pub fn from_summaries(summaries: &[MarketSummary]) -> Self {
        let collect = |f: fn(&MarketSummary) -> f64| -> Option<MeanStd> {
            MeanStd::from_values(&summaries.iter().map(f).collect::<Vec<_>>())
        };
        let student: Vec<f64> = summaries.iter().filter_map(|s| s.student_welfare).collect();

        AggregateResults {
            num_runs: summaries.len(),
            runs_without_matches: summaries.len() - student.len(),
            student_welfare: MeanStd::from_values(&student),
            college_welfare: collect(|s| s.college_welfare),
            match_rate: collect(|s| s.match_rate),
            fill_rate: collect(|s| s.fill_rate),
            mean_apps: collect(|s| s.mean_apps),
            first_choice_rate: collect(|s| s.first_choice_rate),
        }
    }

    pub fn print_summary(&self, label: &str) {
        println!("\n{}", label);
        println!(
            "  Runs: {} ({} without matches)",
            self.num_runs, self.runs_without_matches
        );
        let rows = [
            ("Student welfare (rank)", &self.student_welfare),
            ("College welfare (pct)", &self.college_welfare),
            ("Match rate", &self.match_rate),
            ("Fill rate", &self.fill_rate),
            ("Applications", &self.mean_apps),
            ("First choice rate", &self.first_choice_rate),
        ];
        for (name, stat) in rows {
            match stat {
                Some(s) => println!(
                    "  {}: {:.4} (±{:.4}) [{:.4}, {:.4}]",
                    name, s.mean, s.std, s.min, s.max
                ),
                None => println!("  {}: n/a", name),
            }
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::FixedPreferences;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn summary(student_welfare: Option<f64>, college_welfare: f64) -> MarketSummary {
        MarketSummary {
            student_welfare,
            college_welfare,
            match_rate: 1.0,
            fill_rate: 1.0,
            mean_apps: 2.0,
            first_choice_rate: 1.0,
        }
    }

    #[test]
    fn summary_of_simple_market() {
        // Both students want college 0, which seats one; college 0 prefers student 1
        let fixed = FixedPreferences::exact(vec![vec![0, 1], vec![0, 1]], vec![vec![1, 0]; 2]);
        let mut rng = StdRng::seed_from_u64(0);
        let market = Market::new(2, 2, vec![1, 2], &fixed, &mut rng).unwrap();
        let s = MarketSummary::from_market(&market);

        assert_eq!(s.student_welfare, Some(1.5));
        assert_relative_eq!(s.match_rate, 1.0);
        assert_relative_eq!(s.fill_rate, 2.0 / 3.0);
        assert_relative_eq!(s.mean_apps, 2.0);
        assert_relative_eq!(s.first_choice_rate, 0.5);
        // Percentiles 1.0 and 0.0 over three seats
        assert_relative_eq!(s.college_welfare, 1.0 / 3.0);
    }

    #[test]
    fn aggregate_skips_runs_without_matches() {
        let results = AggregateResults::from_summaries(&[
            summary(Some(1.0), 0.5),
            summary(None, 0.0),
            summary(Some(3.0), 1.0),
        ]);

        assert_eq!(results.num_runs, 3);
        assert_eq!(results.runs_without_matches, 1);
        let student = results.student_welfare.unwrap();
        assert_relative_eq!(student.mean, 2.0);
        assert_relative_eq!(student.std, 2.0_f64.sqrt());
        let college = results.college_welfare.unwrap();
        assert_relative_eq!(college.mean, 0.5);
        assert_relative_eq!(college.min, 0.0);
        assert_relative_eq!(college.max, 1.0);
    }

    #[test]
    fn empty_aggregate_has_no_stats() {
        let results = AggregateResults::from_summaries(&[]);
        assert_eq!(results.num_runs, 0);
        assert!(results.college_welfare.is_none());
        assert!(results.student_welfare.is_none());
    }

    #[test]
    fn single_value_has_zero_spread() {
        let stat = MeanStd::from_values(&[0.7]).unwrap();
        assert_relative_eq!(stat.mean, 0.7);
        assert_relative_eq!(stat.std, 0.0);
    }
}
