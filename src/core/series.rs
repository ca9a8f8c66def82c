use crate::core::timeline::Timeline;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A per-period monetary series.
///
/// Values are keyed by period (first of month) and sparse: an absent period
/// reads as zero. A series produced by an item may cover any sub-range of
/// the analysis timeline; [`CashFlowSeries::reindexed`] projects it onto the
/// full timeline before it participates in any aggregate.
///
/// # Examples
///
/// ```
/// use proforma_engine::core::series::CashFlowSeries;
/// use proforma_engine::core::timeline::Timeline;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let timeline = Timeline::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 3);
/// let series = CashFlowSeries::constant(timeline.periods(), dec!(12_500));
/// assert_eq!(series.total(), dec!(37_500));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowSeries {
    values: BTreeMap<NaiveDate, Decimal>,
}

impl CashFlowSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero-filled series spanning the full timeline.
    pub fn zero(timeline: &Timeline) -> Self {
        Self {
            values: timeline
                .periods()
                .iter()
                .map(|p| (*p, Decimal::ZERO))
                .collect(),
        }
    }

    /// The same amount in every given period.
    pub fn constant(periods: &[NaiveDate], amount: Decimal) -> Self {
        Self {
            values: periods.iter().map(|p| (*p, amount)).collect(),
        }
    }

    /// Value for one period; absent periods read as zero.
    pub fn value_at(&self, period: NaiveDate) -> Decimal {
        self.values.get(&period).copied().unwrap_or(Decimal::ZERO)
    }

    /// Set the value for one period.
    pub fn set(&mut self, period: NaiveDate, amount: Decimal) {
        self.values.insert(period, amount);
    }

    /// Add an amount into one period.
    pub fn add_at(&mut self, period: NaiveDate, amount: Decimal) {
        *self.values.entry(period).or_insert(Decimal::ZERO) += amount;
    }

    /// Add another series into this one, period by period.
    pub fn add_assign_series(&mut self, other: &CashFlowSeries) {
        for (period, amount) in &other.values {
            *self.values.entry(*period).or_insert(Decimal::ZERO) += amount;
        }
    }

    /// Subtract another series from this one, period by period.
    pub fn subtract_series(&mut self, other: &CashFlowSeries) {
        for (period, amount) in &other.values {
            *self.values.entry(*period).or_insert(Decimal::ZERO) -= amount;
        }
    }

    /// Multiply every value by a factor, returning a new series.
    pub fn scale(&self, factor: Decimal) -> CashFlowSeries {
        Self {
            values: self
                .values
                .iter()
                .map(|(p, v)| (*p, v * factor))
                .collect(),
        }
    }

    /// Project this series onto the run timeline.
    ///
    /// Periods missing from the series become zero; periods outside the
    /// timeline are dropped. The result always has exactly one value per
    /// timeline period, so a wayward series can never extend or shrink the
    /// analysis window.
    pub fn reindexed(&self, timeline: &Timeline) -> CashFlowSeries {
        Self {
            values: timeline
                .periods()
                .iter()
                .map(|p| (*p, self.value_at(*p)))
                .collect(),
        }
    }

    /// The sub-series falling inside `[from, to]`, inclusive.
    pub fn windowed(&self, from: NaiveDate, to: NaiveDate) -> CashFlowSeries {
        Self {
            values: self
                .values
                .range(from..=to)
                .map(|(p, v)| (*p, *v))
                .collect(),
        }
    }

    /// Sum of all values.
    pub fn total(&self) -> Decimal {
        self.values.values().sum()
    }

    /// Number of periods carrying a value (including explicit zeros).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All (period, value) pairs in period order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Decimal)> {
        self.values.iter()
    }
}

impl FromIterator<(NaiveDate, Decimal)> for CashFlowSeries {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
