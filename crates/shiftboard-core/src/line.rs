use crate::log::ShiftLogEntry;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Year-month label format used by the rollover tracker.
pub const MONTH_FORMAT: &str = "%Y-%m";

// ---------------------------------------------------------------------------
// UpdateMode / ShiftOutcome
// ---------------------------------------------------------------------------

/// Semantics of the update-actual action. Both variants ship because both
/// were deployed at different points; which one a site runs is config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Set `actual_day` to the supplied value.
    #[default]
    Explicit,
    /// Add exactly 1 to `actual_day`, ignoring any supplied value.
    Increment,
}

/// Result of a shift action. No-op outcomes are informational, not errors:
/// the record was left untouched and the operator just gets told why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftOutcome {
    Started,
    /// Started, and the calendar month changed since the last shift, so the
    /// monthly totals were zeroed first.
    StartedNewMonth,
    AlreadyActive,
    Updated,
    NotActive,
    Ended,
    AlreadyIdle,
}

impl ShiftOutcome {
    pub fn is_noop(self) -> bool {
        matches!(
            self,
            ShiftOutcome::AlreadyActive | ShiftOutcome::NotActive | ShiftOutcome::AlreadyIdle
        )
    }

    pub fn message(self) -> &'static str {
        match self {
            ShiftOutcome::Started => "shift started",
            ShiftOutcome::StartedNewMonth => {
                "shift started; new month detected, monthly totals reset"
            }
            ShiftOutcome::AlreadyActive => "shift is already active",
            ShiftOutcome::Updated => "actual updated",
            ShiftOutcome::NotActive => "shift is not active; start a shift first",
            ShiftOutcome::Ended => "shift ended; logged and monthly totals updated",
            ShiftOutcome::AlreadyIdle => "no active shift to end",
        }
    }
}

// ---------------------------------------------------------------------------
// LineRecord
// ---------------------------------------------------------------------------

/// Live counters for one production line. Gaps are derived from their
/// plan/actual pair on every mutation and are never set directly. The two
/// timestamps are present exactly while a shift is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub plan_day: i64,
    #[serde(default)]
    pub actual_day: i64,
    #[serde(default)]
    pub gap_day: i64,
    #[serde(default)]
    pub plan_month: i64,
    #[serde(default)]
    pub actual_month: i64,
    #[serde(default)]
    pub gap_month: i64,
    #[serde(default)]
    pub shift_active: bool,
    #[serde(default)]
    pub shift_start_time: Option<DateTime<Local>>,
    #[serde(default)]
    pub last_update_time: Option<DateTime<Local>>,
    #[serde(default)]
    pub month_tracker: Option<String>,
}

impl LineRecord {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            plan_day: 0,
            actual_day: 0,
            gap_day: 0,
            plan_month: 0,
            actual_month: 0,
            gap_month: 0,
            shift_active: false,
            shift_start_time: None,
            last_update_time: None,
            month_tracker: None,
        }
    }

    pub(crate) fn recompute_gaps(&mut self) {
        self.gap_day = self.plan_day - self.actual_day;
        self.gap_month = self.plan_month - self.actual_month;
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Idle → Active. The month-rollover check lives here, and only here:
    /// zeroing monthly totals at shift start keeps a mid-shift display
    /// stable, which a lazy check on every read would not.
    pub fn start_shift(&mut self, plan: i64, now: DateTime<Local>) -> ShiftOutcome {
        if self.shift_active {
            return ShiftOutcome::AlreadyActive;
        }

        let month = now.format(MONTH_FORMAT).to_string();
        let rolled = self.month_tracker.as_deref() != Some(month.as_str());
        if rolled {
            self.plan_month = 0;
            self.actual_month = 0;
        }
        self.month_tracker = Some(month);

        self.shift_active = true;
        self.shift_start_time = Some(now);
        self.last_update_time = Some(now);
        self.plan_day = plan;
        self.actual_day = 0;
        self.recompute_gaps();

        if rolled {
            ShiftOutcome::StartedNewMonth
        } else {
            ShiftOutcome::Started
        }
    }

    /// Active → Active. `value` is ignored under `UpdateMode::Increment`.
    pub fn update_actual(
        &mut self,
        mode: UpdateMode,
        value: i64,
        now: DateTime<Local>,
    ) -> ShiftOutcome {
        if !self.shift_active {
            return ShiftOutcome::NotActive;
        }
        match mode {
            UpdateMode::Explicit => self.actual_day = value,
            UpdateMode::Increment => self.actual_day += 1,
        }
        self.recompute_gaps();
        self.last_update_time = Some(now);
        ShiftOutcome::Updated
    }

    /// Active → Idle. Returns the log entry snapshotted before the day
    /// counters fold into the month and reset.
    pub fn end_shift(&mut self, now: DateTime<Local>) -> (ShiftOutcome, Option<ShiftLogEntry>) {
        if !self.shift_active {
            return (ShiftOutcome::AlreadyIdle, None);
        }

        // Month-at-end totals include the day that is being committed.
        let entry = ShiftLogEntry {
            timestamp: now,
            prod_no: self.id,
            shift_start_time: self.shift_start_time.unwrap_or(now),
            shift_end_time: now,
            day_plan_shift: self.plan_day,
            day_actual_shift: self.actual_day,
            day_gap_shift: self.gap_day,
            month_plan_at_shift_end: self.plan_month + self.plan_day,
            month_actual_at_shift_end: self.actual_month + self.actual_day,
            month_gap_at_shift_end: (self.plan_month + self.plan_day)
                - (self.actual_month + self.actual_day),
        };

        self.plan_month += self.plan_day;
        self.actual_month += self.actual_day;
        self.plan_day = 0;
        self.actual_day = 0;
        self.recompute_gaps();

        self.shift_active = false;
        self.shift_start_time = None;
        self.last_update_time = None;

        (ShiftOutcome::Ended, Some(entry))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn start_shift_from_idle() {
        let mut line = LineRecord::new(1);
        line.month_tracker = Some("2026-08".to_string());

        let outcome = line.start_shift(100, at(2026, 8, 3, 6));
        assert_eq!(outcome, ShiftOutcome::Started);
        assert_eq!(line.plan_day, 100);
        assert_eq!(line.actual_day, 0);
        assert_eq!(line.gap_day, 100);
        assert!(line.shift_active);
        assert!(line.shift_start_time.is_some());
        assert!(line.last_update_time.is_some());
    }

    #[test]
    fn start_while_active_is_noop() {
        let mut line = LineRecord::new(1);
        line.month_tracker = Some("2026-08".to_string());
        line.start_shift(100, at(2026, 8, 3, 6));

        let before = line.clone();
        let outcome = line.start_shift(500, at(2026, 8, 3, 7));
        assert_eq!(outcome, ShiftOutcome::AlreadyActive);
        assert!(outcome.is_noop());
        assert_eq!(line, before);
    }

    #[test]
    fn update_sets_actual_explicitly() {
        let mut line = LineRecord::new(2);
        line.month_tracker = Some("2026-08".to_string());
        line.start_shift(100, at(2026, 8, 3, 6));

        let outcome = line.update_actual(UpdateMode::Explicit, 42, at(2026, 8, 3, 8));
        assert_eq!(outcome, ShiftOutcome::Updated);
        assert_eq!(line.actual_day, 42);
        assert_eq!(line.gap_day, 58);
        assert_eq!(line.last_update_time, Some(at(2026, 8, 3, 8)));
    }

    #[test]
    fn update_increment_mode_ignores_value() {
        let mut line = LineRecord::new(2);
        line.month_tracker = Some("2026-08".to_string());
        line.start_shift(100, at(2026, 8, 3, 6));

        line.update_actual(UpdateMode::Increment, 999, at(2026, 8, 3, 7));
        line.update_actual(UpdateMode::Increment, 999, at(2026, 8, 3, 8));
        assert_eq!(line.actual_day, 2);
        assert_eq!(line.gap_day, 98);
    }

    #[test]
    fn update_while_idle_is_noop() {
        let mut line = LineRecord::new(2);
        let before = line.clone();
        let outcome = line.update_actual(UpdateMode::Explicit, 42, at(2026, 8, 3, 8));
        assert_eq!(outcome, ShiftOutcome::NotActive);
        assert_eq!(line, before);
    }

    #[test]
    fn end_shift_folds_day_into_month_and_resets() {
        let mut line = LineRecord::new(1);
        line.month_tracker = Some("2026-08".to_string());
        line.start_shift(100, at(2026, 8, 3, 6));
        line.update_actual(UpdateMode::Explicit, 42, at(2026, 8, 3, 12));

        let (outcome, entry) = line.end_shift(at(2026, 8, 3, 14));
        assert_eq!(outcome, ShiftOutcome::Ended);
        let entry = entry.unwrap();
        assert_eq!(entry.day_plan_shift, 100);
        assert_eq!(entry.day_actual_shift, 42);
        assert_eq!(entry.day_gap_shift, 58);
        assert_eq!(entry.month_plan_at_shift_end, 100);
        assert_eq!(entry.month_actual_at_shift_end, 42);
        assert_eq!(entry.month_gap_at_shift_end, 58);

        assert_eq!(line.plan_day, 0);
        assert_eq!(line.actual_day, 0);
        assert_eq!(line.gap_day, 0);
        assert_eq!(line.plan_month, 100);
        assert_eq!(line.actual_month, 42);
        assert_eq!(line.gap_month, 58);
        assert!(!line.shift_active);
        assert!(line.shift_start_time.is_none());
        assert!(line.last_update_time.is_none());
    }

    #[test]
    fn end_while_idle_is_noop() {
        let mut line = LineRecord::new(1);
        let before = line.clone();
        let (outcome, entry) = line.end_shift(at(2026, 8, 3, 14));
        assert_eq!(outcome, ShiftOutcome::AlreadyIdle);
        assert!(entry.is_none());
        assert_eq!(line, before);
    }

    #[test]
    fn month_at_end_includes_prior_shifts() {
        let mut line = LineRecord::new(3);
        line.month_tracker = Some("2026-08".to_string());
        line.start_shift(100, at(2026, 8, 3, 6));
        line.update_actual(UpdateMode::Explicit, 90, at(2026, 8, 3, 12));
        line.end_shift(at(2026, 8, 3, 14));

        line.start_shift(80, at(2026, 8, 4, 6));
        line.update_actual(UpdateMode::Explicit, 70, at(2026, 8, 4, 12));
        let (_, entry) = line.end_shift(at(2026, 8, 4, 14));
        let entry = entry.unwrap();
        assert_eq!(entry.month_plan_at_shift_end, 180);
        assert_eq!(entry.month_actual_at_shift_end, 160);
        assert_eq!(entry.month_gap_at_shift_end, 20);
        assert_eq!(line.plan_month, 180);
        assert_eq!(line.actual_month, 160);
    }

    #[test]
    fn month_rollover_fires_only_at_start() {
        let mut line = LineRecord::new(1);
        line.month_tracker = Some("2026-07".to_string());
        line.plan_month = 900;
        line.actual_month = 850;
        line.gap_month = 50;

        // Rollover happens at the first start in the new month, not before.
        let outcome = line.start_shift(100, at(2026, 8, 1, 6));
        assert_eq!(outcome, ShiftOutcome::StartedNewMonth);
        assert_eq!(line.plan_month, 0);
        assert_eq!(line.actual_month, 0);
        assert_eq!(line.gap_month, 0);
        assert_eq!(line.month_tracker.as_deref(), Some("2026-08"));

        // A second start in the same month must not reset again.
        line.end_shift(at(2026, 8, 1, 14));
        let outcome = line.start_shift(50, at(2026, 8, 2, 6));
        assert_eq!(outcome, ShiftOutcome::Started);
        assert_eq!(line.plan_month, 100);
    }

    #[test]
    fn gaps_hold_after_every_mutation() {
        let mut line = LineRecord::new(1);
        line.month_tracker = Some("2026-08".to_string());
        line.start_shift(100, at(2026, 8, 3, 6));
        assert_eq!(line.gap_day, line.plan_day - line.actual_day);

        line.update_actual(UpdateMode::Explicit, 37, at(2026, 8, 3, 9));
        assert_eq!(line.gap_day, line.plan_day - line.actual_day);
        assert_eq!(line.gap_month, line.plan_month - line.actual_month);

        line.end_shift(at(2026, 8, 3, 14));
        assert_eq!(line.gap_day, line.plan_day - line.actual_day);
        assert_eq!(line.gap_month, line.plan_month - line.actual_month);
    }
}
