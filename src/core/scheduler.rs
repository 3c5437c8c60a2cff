//! Maintenance scheduling math.
//!
//! Projects the next maintenance date from the last one and a frequency, and
//! reclassifies a stored status for display. Everything here is pure: no I/O, no
//! clock access (callers pass `today`), and malformed input degrades to `None`
//! instead of an error so half-filled forms keep working.

use crate::entities::MaintenanceStatus;
use chrono::{Days, NaiveDate};

/// Frequency value that defers to `custom_interval_days`
pub const CUSTOM_FREQUENCY: &str = "custom";

/// A parsed maintenance frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceFrequency {
    /// Fixed interval in days
    Days(u32),
    /// Interval supplied separately as `custom_interval_days`
    Custom,
}

impl MaintenanceFrequency {
    /// The intervals offered by the maintenance form
    pub const FIXED: [Self; 4] = [Self::Days(30), Self::Days(90), Self::Days(180), Self::Days(365)];

    /// Parses a frequency as stored on a maintenance item.
    ///
    /// Returns `None` for anything that is neither `"custom"` nor a positive integer.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(CUSTOM_FREQUENCY) {
            return Some(Self::Custom);
        }

        value
            .parse::<u32>()
            .ok()
            .filter(|days| *days > 0)
            .map(Self::Days)
    }

    /// The stored form of this frequency
    #[must_use]
    pub fn as_str(self) -> String {
        match self {
            Self::Days(days) => days.to_string(),
            Self::Custom => CUSTOM_FREQUENCY.to_string(),
        }
    }

    /// Resolves the interval in days, consulting `custom_interval_days` only for
    /// [`MaintenanceFrequency::Custom`]. Zero or negative intervals resolve to `None`.
    #[must_use]
    pub fn interval_days(self, custom_interval_days: Option<i64>) -> Option<u64> {
        let days = match self {
            Self::Days(days) => i64::from(days),
            Self::Custom => custom_interval_days.unwrap_or(0),
        };

        u64::try_from(days).ok().filter(|days| *days > 0)
    }
}

/// Computes the next maintenance date.
///
/// Returns `None` when the last date or the frequency is missing, when the
/// frequency cannot be parsed, or when the resolved interval is not positive.
/// Otherwise the result is `last_date` plus the interval in calendar days.
#[must_use]
pub fn compute_next_maintenance_date(
    last_date: Option<NaiveDate>,
    frequency: Option<&str>,
    custom_interval_days: Option<i64>,
) -> Option<NaiveDate> {
    let last_date = last_date?;
    let interval = MaintenanceFrequency::parse(frequency?)?.interval_days(custom_interval_days)?;

    last_date.checked_add_days(Days::new(interval))
}

/// Status to display for a maintenance item on `today`.
///
/// Done always stays Done. Anything else whose next date is strictly before
/// `today` shows as Overdue; a next date equal to `today` is still on time.
/// This never changes what is stored.
#[must_use]
pub fn classify_status(
    stored_status: MaintenanceStatus,
    next_maintenance_date: Option<NaiveDate>,
    today: NaiveDate,
) -> MaintenanceStatus {
    if stored_status == MaintenanceStatus::Done {
        return MaintenanceStatus::Done;
    }

    match next_maintenance_date {
        Some(next) if next < today => MaintenanceStatus::Overdue,
        _ => stored_status,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixed_frequencies_add_calendar_days() {
        let last = date(2024, 1, 1);
        for frequency in MaintenanceFrequency::FIXED {
            let MaintenanceFrequency::Days(days) = frequency else {
                panic!("fixed frequencies are day counts");
            };
            let next = compute_next_maintenance_date(Some(last), Some(&frequency.as_str()), None);
            assert_eq!(next, last.checked_add_days(Days::new(u64::from(days))));
        }
    }

    #[test]
    fn test_ninety_days_from_new_year() {
        // 2024 is a leap year: Jan 31 + Feb 29 + Mar 30 = 90
        let next = compute_next_maintenance_date(Some(date(2024, 1, 1)), Some("90"), None);
        assert_eq!(next, Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_any_positive_day_count_is_accepted() {
        let next = compute_next_maintenance_date(Some(date(2024, 12, 25)), Some("7"), None);
        assert_eq!(next, Some(date(2025, 1, 1)));
    }

    #[test]
    fn test_custom_frequency_uses_custom_interval() {
        let next = compute_next_maintenance_date(Some(date(2024, 2, 20)), Some("custom"), Some(10));
        assert_eq!(next, Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_custom_frequency_without_positive_interval() {
        let last = Some(date(2024, 1, 1));
        assert_eq!(compute_next_maintenance_date(last, Some("custom"), Some(0)), None);
        assert_eq!(compute_next_maintenance_date(last, Some("custom"), None), None);
        assert_eq!(compute_next_maintenance_date(last, Some("custom"), Some(-5)), None);
    }

    #[test]
    fn test_custom_interval_ignored_for_fixed_frequency() {
        let next = compute_next_maintenance_date(Some(date(2024, 1, 1)), Some("30"), Some(1000));
        assert_eq!(next, Some(date(2024, 1, 31)));
    }

    #[test]
    fn test_missing_inputs_yield_none() {
        assert_eq!(compute_next_maintenance_date(None, Some("30"), None), None);
        assert_eq!(compute_next_maintenance_date(Some(date(2024, 1, 1)), None, Some(30)), None);
    }

    #[test]
    fn test_malformed_frequency_yields_none() {
        let last = Some(date(2024, 1, 1));
        for frequency in ["", "weekly", "0", "-30", "30.5", "9999999999999"] {
            assert_eq!(compute_next_maintenance_date(last, Some(frequency), None), None, "{frequency}");
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let first = compute_next_maintenance_date(Some(date(2023, 6, 15)), Some("180"), None);
        let second = compute_next_maintenance_date(Some(date(2023, 6, 15)), Some("180"), None);
        assert_eq!(first, second);
        assert_eq!(first, Some(date(2023, 12, 12)));
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!(MaintenanceFrequency::parse("Custom"), Some(MaintenanceFrequency::Custom));
        assert_eq!(MaintenanceFrequency::parse(" 365 "), Some(MaintenanceFrequency::Days(365)));
        assert_eq!(MaintenanceFrequency::parse("abc"), None);
        assert_eq!(MaintenanceFrequency::Custom.as_str(), "custom");
    }

    #[test]
    fn test_done_is_never_overdue() {
        let status = classify_status(MaintenanceStatus::Done, Some(date(2000, 1, 1)), date(2024, 4, 1));
        assert_eq!(status, MaintenanceStatus::Done);
    }

    #[test]
    fn test_past_next_date_is_overdue() {
        let today = date(2024, 4, 1);
        for stored in [
            MaintenanceStatus::Pending,
            MaintenanceStatus::Scheduled,
            MaintenanceStatus::InProgress,
        ] {
            assert_eq!(
                classify_status(stored, Some(date(2024, 3, 31)), today),
                MaintenanceStatus::Overdue
            );
        }
    }

    #[test]
    fn test_same_day_or_future_keeps_stored_status() {
        let today = date(2024, 4, 1);
        assert_eq!(
            classify_status(MaintenanceStatus::Scheduled, Some(today), today),
            MaintenanceStatus::Scheduled
        );
        assert_eq!(
            classify_status(MaintenanceStatus::Scheduled, Some(date(2024, 5, 1)), today),
            MaintenanceStatus::Scheduled
        );
        assert_eq!(
            classify_status(MaintenanceStatus::Pending, None, today),
            MaintenanceStatus::Pending
        );
    }

    #[test]
    fn test_schedule_then_classify_end_to_end() {
        let next = compute_next_maintenance_date(Some(date(2024, 1, 1)), Some("90"), None);
        assert_eq!(next, Some(date(2024, 3, 31)));

        let status = classify_status(MaintenanceStatus::Scheduled, next, date(2024, 4, 1));
        assert_eq!(status, MaintenanceStatus::Overdue);
    }
}
