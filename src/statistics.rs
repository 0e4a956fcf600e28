//! Statistics

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    records::{Metric, PredictionRecord},
    result_set::ResultSet,
};

/// Number of values per metric that were substituted with zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricFlags {
    /// Substituted cost values
    pub cost: usize,
    /// Substituted CO2 values
    pub co2: usize,
    /// Substituted sustainability scores
    pub sustainability: usize,
}

impl MetricFlags {
    /// True when any average includes a substituted zero.
    pub fn any(&self) -> bool {
        self.cost + self.co2 + self.sustainability > 0
    }
}

/// Averages over a result set, held at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedStatistics {
    /// Number of records averaged
    pub count: usize,
    /// Mean predicted cost
    pub avg_cost: Decimal,
    /// Mean CO2
    pub avg_co2: Decimal,
    /// Mean sustainability score
    pub avg_sustainability: Decimal,
    /// Substitutions included in the means
    pub flags: MetricFlags,
}

impl DerivedStatistics {
    /// The same statistics with every mean rounded to two decimal places.
    pub fn rounded(&self) -> Self {
        Self {
            avg_cost: round_for_display(self.avg_cost),
            avg_co2: round_for_display(self.avg_co2),
            avg_sustainability: round_for_display(self.avg_sustainability),
            ..*self
        }
    }
}

/// Compute the mean of each metric. A [`ResultSet`] is never empty.
pub fn compute_statistics(result_set: &ResultSet) -> DerivedStatistics {
    let records = result_set.records();

    DerivedStatistics {
        count: records.len(),
        avg_cost: mean(records, |r| r.predicted_cost),
        avg_co2: mean(records, |r| r.co2),
        avg_sustainability: mean(records, |r| r.sustainability_score),
        flags: MetricFlags {
            cost: coerced(records, |r| r.predicted_cost),
            co2: coerced(records, |r| r.co2),
            sustainability: coerced(records, |r| r.sustainability_score),
        },
    }
}

/// Round half away from zero to two decimal places.
pub fn round_for_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a value with exactly two decimal places.
pub fn format_2dp(value: Decimal) -> String {
    format!("{:.2}", round_for_display(value))
}

fn mean(records: &[PredictionRecord], metric: impl Fn(&PredictionRecord) -> Metric) -> Decimal {
    if records.is_empty() {
        return Decimal::ZERO;
    }

    let total = records
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(metric(r).value()));

    total / Decimal::from(records.len())
}

fn coerced(records: &[PredictionRecord], metric: impl Fn(&PredictionRecord) -> Metric) -> usize {
    records.iter().filter(|r| metric(r).is_coerced()).count()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn dec(text: &str) -> Result<Decimal, rust_decimal::Error> {
        text.parse()
    }

    fn example_set() -> TestResult<ResultSet> {
        Ok(ResultSet::new(
            vec![
                PredictionRecord::new(1, "Recycled Cardboard", dec("12.5")?, dec("0.8")?, dec("92")?)?,
                PredictionRecord::new(2, "Bubble Wrap", dec("8.0")?, dec("2.1")?, dec("61")?)?,
            ],
            None,
        )?)
    }

    #[test]
    fn averages_match_worked_example() -> TestResult {
        let stats = compute_statistics(&example_set()?).rounded();

        assert_eq!(stats.count, 2);
        assert_eq!(stats.avg_cost, dec("10.25")?);
        assert_eq!(stats.avg_co2, dec("1.45")?);
        assert_eq!(stats.avg_sustainability, dec("76.5")?);
        assert!(!stats.flags.any());

        Ok(())
    }

    #[test]
    fn means_lie_between_min_and_max() -> TestResult {
        let set = ResultSet::new(
            vec![
                PredictionRecord::new(1, "A", dec("3.333")?, dec("0")?, dec("100")?)?,
                PredictionRecord::new(2, "B", dec("1.1")?, dec("9.99")?, dec("0")?)?,
                PredictionRecord::new(3, "C", dec("7")?, dec("4.5")?, dec("33.3")?)?,
            ],
            None,
        )?;

        let stats = compute_statistics(&set);

        assert!(stats.avg_cost >= dec("1.1")? && stats.avg_cost <= dec("7")?);
        assert!(stats.avg_co2 >= Decimal::ZERO && stats.avg_co2 <= dec("9.99")?);
        assert!(stats.avg_sustainability >= Decimal::ZERO && stats.avg_sustainability <= dec("100")?);

        Ok(())
    }

    #[test]
    fn substituted_values_are_counted() -> TestResult {
        let set = ResultSet::new(
            vec![
                PredictionRecord::new(1, "A", Metric::substituted(), dec("2")?, dec("50")?)?,
                PredictionRecord::new(2, "B", dec("4")?, dec("2")?, dec("50")?)?,
            ],
            None,
        )?;

        let stats = compute_statistics(&set);

        assert_eq!(stats.avg_cost, dec("2")?);
        assert_eq!(stats.flags.cost, 1);
        assert!(stats.flags.any());

        Ok(())
    }

    #[test]
    fn display_rounding_pads_and_rounds_half_up() -> TestResult {
        assert_eq!(format_2dp(dec("76.5")?), "76.50");
        assert_eq!(format_2dp(dec("1.005")?), "1.01");
        assert_eq!(format_2dp(dec("10.25")?), "10.25");

        Ok(())
    }
}
