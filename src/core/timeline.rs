use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ordered set of monthly periods under analysis.
///
/// Every period is identified by the first day of its calendar month.
/// A timeline is immutable for the lifetime of one analysis run: every
/// computed series is ultimately reindexed onto it, and the summary table
/// has exactly one row per period.
///
/// # Examples
///
/// ```
/// use proforma_engine::core::timeline::Timeline;
/// use chrono::NaiveDate;
///
/// let timeline = Timeline::new(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(), 12);
/// assert_eq!(timeline.len(), 12);
/// // The start date is normalized to the first of the month.
/// assert_eq!(timeline.start(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    periods: Vec<NaiveDate>,
}

/// Normalize an arbitrary date to the first day of its month.
pub fn month_of(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("first of an existing month is always a valid date")
}

/// Advance a date by a whole number of months.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .expect("timeline arithmetic stays far from the date range limits")
}

/// Whole months elapsed from the month of `from` to the month of `to`.
/// Negative when `to` precedes `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32
}

impl Timeline {
    /// Create a timeline of `months` consecutive monthly periods starting at
    /// the month containing `start`.
    ///
    /// # Panics
    ///
    /// Panics if `months` is zero — an analysis over no periods is a
    /// construction bug, not a degenerate input.
    pub fn new(start: NaiveDate, months: usize) -> Self {
        assert!(months > 0, "a timeline must contain at least one period");
        let first = month_of(start);
        let periods = (0..months)
            .map(|i| add_months(first, i as u32))
            .collect();
        Self { periods }
    }

    /// First period of the analysis.
    pub fn start(&self) -> NaiveDate {
        self.periods[0]
    }

    /// Last period of the analysis.
    pub fn end(&self) -> NaiveDate {
        self.periods[self.periods.len() - 1]
    }

    /// Number of monthly periods.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// All periods in order.
    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    /// Position of the period containing `date`, if it falls inside the
    /// analysis window.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let month = month_of(date);
        self.periods.binary_search(&month).ok()
    }

    /// Whether the period containing `date` is part of this timeline.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {} ({} months)",
            self.start().format("%Y-%m"),
            self.end().format("%Y-%m"),
            self.len()
        )
    }
}
