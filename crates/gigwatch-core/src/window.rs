//! Date windows: the inclusive day range a run considers relevant.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An inclusive range of calendar days.
///
/// Events are matched on their canonical (day-granularity) date, so both ends
/// are plain dates rather than instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl DateWindow {
  /// Build a window, rejecting `start > end`.
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidWindow { start, end });
    }
    Ok(Self { start, end })
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }
}

/// How a run's window is derived from "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPolicy {
  /// Days before today that are still considered relevant.
  pub include_past_day_offset: u32,
  /// Days after today to look ahead.
  pub date_range_days:         u32,
}

impl Default for WindowPolicy {
  fn default() -> Self {
    Self { include_past_day_offset: 0, date_range_days: 90 }
  }
}

impl WindowPolicy {
  /// `[today - include_past_day_offset, today + date_range_days]`.
  ///
  /// Saturates at the calendar bounds chrono can represent.
  pub fn window_for(&self, today: NaiveDate) -> DateWindow {
    let start = today
      .checked_sub_days(Days::new(self.include_past_day_offset.into()))
      .unwrap_or(NaiveDate::MIN);
    let end = today
      .checked_add_days(Days::new(self.date_range_days.into()))
      .unwrap_or(NaiveDate::MAX);
    DateWindow { start, end }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn window_rejects_reversed_bounds() {
    let err = DateWindow::new(day(2026, 5, 2), day(2026, 5, 1)).unwrap_err();
    assert!(matches!(err, Error::InvalidWindow { .. }));
  }

  #[test]
  fn single_day_window_is_valid() {
    let w = DateWindow::new(day(2026, 5, 1), day(2026, 5, 1)).unwrap();
    assert!(w.contains(day(2026, 5, 1)));
    assert!(!w.contains(day(2026, 5, 2)));
  }

  #[test]
  fn policy_spans_past_offset_and_range() {
    let policy = WindowPolicy { include_past_day_offset: 2, date_range_days: 30 };
    let w = policy.window_for(day(2026, 12, 20));
    assert_eq!(w.start, day(2026, 12, 18));
    assert_eq!(w.end, day(2027, 1, 19));
    assert!(w.contains(day(2026, 12, 18)));
    assert!(w.contains(day(2027, 1, 19)));
    assert!(!w.contains(day(2026, 12, 17)));
  }
}
