use crate::line::LineRecord;
use chrono::{DateTime, Duration, Local};

/// Lower bound on `actual_day` under repeated decay, so a line left active
/// and unviewed for months cannot drive the counter to an absurd value.
pub const PENALTY_FLOOR: i64 = -999_999;

/// Number of complete `interval` periods elapsed between `last_update` and
/// `now`.
pub fn missed_intervals(
    last_update: DateTime<Local>,
    now: DateTime<Local>,
    interval: Duration,
) -> u32 {
    if interval <= Duration::zero() {
        return 0;
    }
    let elapsed = now - last_update;
    if elapsed < interval {
        0
    } else {
        (elapsed.num_seconds() / interval.num_seconds()) as u32
    }
}

/// Apply automatic decay to a line that went silent during an active shift:
/// decrement `actual_day` by one per complete interval since the last
/// update, floored at [`PENALTY_FLOOR`], and advance `last_update_time` to
/// `now` so the same silence is not charged twice. Returns the number of
/// penalties applied (0 for idle lines and lines updated recently).
///
/// Callers run this only when a single line is about to be shown; there is
/// deliberately no sweep over all lines and no background timer, so a line
/// nobody views does not decay.
pub fn apply(record: &mut LineRecord, now: DateTime<Local>, interval: Duration) -> u32 {
    if !record.shift_active {
        return 0;
    }
    let Some(last_update) = record.last_update_time else {
        return 0;
    };
    let missed = missed_intervals(last_update, now, interval);
    if missed == 0 {
        return 0;
    }

    record.actual_day = (record.actual_day - i64::from(missed)).max(PENALTY_FLOOR);
    record.recompute_gaps();
    record.last_update_time = Some(now);
    tracing::warn!(
        line = record.id,
        missed,
        "penalty applied for missed updates"
    );
    missed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::UpdateMode;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 3, h, m, 0).unwrap()
    }

    fn active_line() -> LineRecord {
        let mut line = LineRecord::new(1);
        line.month_tracker = Some("2026-08".to_string());
        line.start_shift(100, at(6, 0));
        line.update_actual(UpdateMode::Explicit, 42, at(6, 0));
        line
    }

    #[test]
    fn no_penalty_within_interval() {
        let mut line = active_line();
        let applied = apply(&mut line, at(7, 59), Duration::hours(2));
        assert_eq!(applied, 0);
        assert_eq!(line.actual_day, 42);
        assert_eq!(line.last_update_time, Some(at(6, 0)));
    }

    #[test]
    fn one_penalty_per_complete_interval() {
        let mut line = active_line();
        // 6:00 → 12:30 is three complete 2-hour intervals.
        let applied = apply(&mut line, at(12, 30), Duration::hours(2));
        assert_eq!(applied, 3);
        assert_eq!(line.actual_day, 39);
        assert_eq!(line.gap_day, 61);
        assert_eq!(line.last_update_time, Some(at(12, 30)));
    }

    #[test]
    fn penalty_not_charged_twice_for_same_silence() {
        let mut line = active_line();
        apply(&mut line, at(8, 30), Duration::hours(2));
        assert_eq!(line.actual_day, 41);
        // Viewing again shortly after must not decay further.
        let applied = apply(&mut line, at(8, 45), Duration::hours(2));
        assert_eq!(applied, 0);
        assert_eq!(line.actual_day, 41);
    }

    #[test]
    fn decay_is_floored() {
        let mut line = active_line();
        line.actual_day = PENALTY_FLOOR + 1;
        apply(&mut line, at(12, 0), Duration::hours(2));
        assert_eq!(line.actual_day, PENALTY_FLOOR);
        assert_eq!(line.gap_day, line.plan_day - PENALTY_FLOOR);
    }

    #[test]
    fn idle_line_never_decays() {
        let mut line = LineRecord::new(1);
        let applied = apply(&mut line, at(23, 0), Duration::hours(2));
        assert_eq!(applied, 0);
        assert_eq!(line.actual_day, 0);
    }

    #[test]
    fn missed_intervals_exact_boundary() {
        assert_eq!(missed_intervals(at(6, 0), at(8, 0), Duration::hours(2)), 1);
        assert_eq!(missed_intervals(at(6, 0), at(7, 59), Duration::hours(2)), 0);
        assert_eq!(missed_intervals(at(6, 0), at(10, 0), Duration::hours(2)), 2);
    }
}
