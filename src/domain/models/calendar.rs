//! Exam countdown and the 21-day study cycle.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Length of one study cycle in days.
pub const CYCLE_LENGTH_DAYS: i64 = 21;

/// Days remaining until an exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub exam_date: NaiveDate,
    /// Whole days from `today` to the exam, never negative.
    pub days_remaining: i64,
    /// `days_remaining / 7`
    pub weeks_remaining: i64,
    /// Leftover days after whole weeks.
    pub extra_days: i64,
    /// The exam date is today or earlier.
    pub exam_passed: bool,
}

impl Countdown {
    /// Countdown from `today` to `exam_date`.
    pub fn until(exam_date: NaiveDate, today: NaiveDate) -> Self {
        let raw = (exam_date - today).num_days();
        let days_remaining = raw.max(0);
        Self {
            exam_date,
            days_remaining,
            weeks_remaining: days_remaining / 7,
            extra_days: days_remaining % 7,
            exam_passed: raw <= 0,
        }
    }
}

/// Where a cycle anchor came from, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    /// Explicit cycle-start set by the student.
    Override,
    /// Date of the first recorded study session.
    FirstSession,
    /// Account creation date.
    AccountCreated,
    /// Nothing known; the cycle starts today.
    Today,
}

/// Candidate base dates for the study cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleAnchors {
    pub cycle_start_override: Option<NaiveDate>,
    pub first_session: Option<NaiveDate>,
    pub account_created: Option<NaiveDate>,
}

impl CycleAnchors {
    /// The most specific anchor available, falling back to `today`.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, AnchorSource) {
        self.cycle_start_override
            .map(|d| (d, AnchorSource::Override))
            .or_else(|| self.first_session.map(|d| (d, AnchorSource::FirstSession)))
            .or_else(|| self.account_created.map(|d| (d, AnchorSource::AccountCreated)))
            .unwrap_or((today, AnchorSource::Today))
    }
}

/// Position of `today` inside the repeating 21-day cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudyCycle {
    pub anchor: NaiveDate,
    pub anchor_source: AnchorSource,
    /// 1-based cycle number; 0 when the anchor lies in the future.
    pub cycle_number: i64,
    /// 1..=21, or 0 before the anchor.
    pub day_in_cycle: i64,
    pub cycle_start: NaiveDate,
    /// Last day of the current cycle, inclusive.
    pub cycle_end: NaiveDate,
    /// Days left after today in this cycle.
    pub days_left: i64,
}

impl StudyCycle {
    /// Locate `today` in the cycle anchored by the best of `anchors`.
    ///
    /// `None` when the cycle would end past the last representable date.
    pub fn locate(anchors: &CycleAnchors, today: NaiveDate) -> Option<Self> {
        let (anchor, anchor_source) = anchors.resolve(today);
        let elapsed = (today - anchor).num_days();

        if elapsed < 0 {
            // Override set in the future: first cycle has not begun.
            return Some(Self {
                anchor,
                anchor_source,
                cycle_number: 0,
                day_in_cycle: 0,
                cycle_start: anchor,
                cycle_end: add_days(anchor, CYCLE_LENGTH_DAYS - 1)?,
                days_left: CYCLE_LENGTH_DAYS,
            });
        }

        let completed = elapsed / CYCLE_LENGTH_DAYS;
        let offset = elapsed % CYCLE_LENGTH_DAYS;
        let cycle_start = add_days(anchor, completed * CYCLE_LENGTH_DAYS)?;
        Some(Self {
            anchor,
            anchor_source,
            cycle_number: completed + 1,
            day_in_cycle: offset + 1,
            cycle_start,
            cycle_end: add_days(cycle_start, CYCLE_LENGTH_DAYS - 1)?,
            days_left: CYCLE_LENGTH_DAYS - offset - 1,
        })
    }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_countdown_weeks_and_days() {
        let countdown = Countdown::until(date(2027, 1, 22), date(2026, 12, 1));
        assert_eq!(countdown.days_remaining, 52);
        assert_eq!(countdown.weeks_remaining, 7);
        assert_eq!(countdown.extra_days, 3);
        assert!(!countdown.exam_passed);
    }

    #[test]
    fn test_countdown_after_exam_clamps_to_zero() {
        let countdown = Countdown::until(date(2026, 5, 3), date(2026, 6, 1));
        assert_eq!(countdown.days_remaining, 0);
        assert!(countdown.exam_passed);
    }

    #[test]
    fn test_most_specific_anchor_wins() {
        let today = date(2026, 10, 18);
        let anchors = CycleAnchors {
            cycle_start_override: Some(date(2026, 9, 1)),
            first_session: Some(date(2026, 8, 1)),
            account_created: Some(date(2026, 7, 1)),
        };
        assert_eq!(anchors.resolve(today), (date(2026, 9, 1), AnchorSource::Override));

        let anchors = CycleAnchors {
            cycle_start_override: None,
            ..anchors
        };
        assert_eq!(anchors.resolve(today), (date(2026, 8, 1), AnchorSource::FirstSession));

        assert_eq!(
            CycleAnchors::default().resolve(today),
            (today, AnchorSource::Today)
        );
    }

    #[test]
    fn test_cycle_boundaries() {
        let anchors = CycleAnchors {
            account_created: Some(date(2026, 1, 1)),
            ..Default::default()
        };

        // Day 21 of cycle 1
        let cycle = StudyCycle::locate(&anchors, date(2026, 1, 21)).unwrap();
        assert_eq!(cycle.cycle_number, 1);
        assert_eq!(cycle.day_in_cycle, 21);
        assert_eq!(cycle.days_left, 0);
        assert_eq!(cycle.cycle_end, date(2026, 1, 21));

        // Day 1 of cycle 2
        let cycle = StudyCycle::locate(&anchors, date(2026, 1, 22)).unwrap();
        assert_eq!(cycle.cycle_number, 2);
        assert_eq!(cycle.day_in_cycle, 1);
        assert_eq!(cycle.cycle_start, date(2026, 1, 22));
        assert_eq!(cycle.days_left, 20);
    }

    #[test]
    fn test_future_override_has_not_started() {
        let anchors = CycleAnchors {
            cycle_start_override: Some(date(2026, 11, 1)),
            ..Default::default()
        };
        let cycle = StudyCycle::locate(&anchors, date(2026, 10, 18)).unwrap();
        assert_eq!(cycle.cycle_number, 0);
        assert_eq!(cycle.day_in_cycle, 0);
        assert_eq!(cycle.cycle_start, date(2026, 11, 1));
    }

    #[test]
    fn test_cycle_past_last_date_is_none() {
        let anchors = CycleAnchors {
            cycle_start_override: Some(NaiveDate::MAX),
            ..Default::default()
        };
        assert_eq!(StudyCycle::locate(&anchors, NaiveDate::MAX), None);

        // Last cycle that still fits
        let start = NaiveDate::MAX - Duration::days(CYCLE_LENGTH_DAYS - 1);
        let anchors = CycleAnchors {
            cycle_start_override: Some(start),
            ..Default::default()
        };
        let cycle = StudyCycle::locate(&anchors, NaiveDate::MAX).unwrap();
        assert_eq!(cycle.day_in_cycle, CYCLE_LENGTH_DAYS);
        assert_eq!(cycle.cycle_end, NaiveDate::MAX);
    }

    #[test]
    fn test_countdown_at_date_extremes() {
        let countdown = Countdown::until(NaiveDate::MAX, NaiveDate::MIN);
        assert!(countdown.days_remaining > 0);
        let countdown = Countdown::until(NaiveDate::MIN, NaiveDate::MAX);
        assert!(countdown.exam_passed);
    }
}
