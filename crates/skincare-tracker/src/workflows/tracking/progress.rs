use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DAYS_PER_WEEK: i64 = 7;

/// Week-by-week completion state of one tracking cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleProgress {
    pub weeks_completed: u32,
    pub total_weeks: u32,
    pub is_completed: bool,
    pub percent: u8,
}

/// Progress of a cycle that began on `start_date` and needs `required_days`,
/// evaluated on `now`.
///
/// Start dates after `now` count as zero elapsed days. `required_days == 0` is
/// rejected when the routine item is saved and never reaches this function in
/// practice; it yields zero weeks and zero percent.
pub fn compute_progress(start_date: NaiveDate, required_days: u32, now: NaiveDate) -> CycleProgress {
    let total_weeks = required_days.div_ceil(DAYS_PER_WEEK as u32);
    let elapsed_days = (now - start_date).num_days().max(0);
    let elapsed_weeks = u32::try_from(elapsed_days / DAYS_PER_WEEK).unwrap_or(u32::MAX);
    let weeks_completed = elapsed_weeks.min(total_weeks);

    let percent = if total_weeks == 0 {
        0
    } else {
        let ratio = f64::from(weeks_completed) / f64::from(total_weeks);
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    };

    CycleProgress {
        weeks_completed,
        total_weeks,
        is_completed: weeks_completed >= total_weeks,
        percent,
    }
}

/// The date progress is evaluated on: the wall clock, unless tracking was
/// stopped, in which case progress stays frozen at the stop date.
pub fn effective_now(today: NaiveDate, stopped_on: Option<NaiveDate>) -> NaiveDate {
    match stopped_on {
        Some(stopped) if stopped < today => stopped,
        _ => today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date")
    }

    #[test]
    fn full_window_elapsed_completes_cycle() {
        let progress = compute_progress(today() - Duration::days(28), 28, today());
        assert_eq!(
            progress,
            CycleProgress {
                weeks_completed: 4,
                total_weeks: 4,
                is_completed: true,
                percent: 100,
            }
        );
    }

    #[test]
    fn partial_weeks_round_down() {
        let progress = compute_progress(today() - Duration::days(10), 28, today());
        assert_eq!(progress.weeks_completed, 1);
        assert_eq!(progress.total_weeks, 4);
        assert!(!progress.is_completed);
        assert_eq!(progress.percent, 25);
    }

    #[test]
    fn total_weeks_round_up_and_weeks_are_capped() {
        let progress = compute_progress(today() - Duration::days(200), 30, today());
        assert_eq!(progress.total_weeks, 5);
        assert_eq!(progress.weeks_completed, 5);
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        // 1 of 3 weeks = 33.3%, 2 of 3 = 66.7%
        let start = today() - Duration::days(7);
        assert_eq!(compute_progress(start, 21, today()).percent, 33);
        let start = today() - Duration::days(14);
        assert_eq!(compute_progress(start, 21, today()).percent, 67);
    }

    #[test]
    fn future_start_never_goes_negative() {
        let progress = compute_progress(today() + Duration::days(9), 28, today());
        assert_eq!(progress.weeks_completed, 0);
        assert_eq!(progress.percent, 0);
        assert!(!progress.is_completed);
    }

    #[test]
    fn zero_window_is_total() {
        let progress = compute_progress(today(), 0, today());
        assert_eq!(progress.total_weeks, 0);
        assert_eq!(progress.percent, 0);
    }

    #[test]
    fn stopped_tracking_freezes_the_clock() {
        let stopped = today() - Duration::days(3);
        assert_eq!(effective_now(today(), Some(stopped)), stopped);
        assert_eq!(effective_now(today(), None), today());
        assert_eq!(
            effective_now(today(), Some(today() + Duration::days(5))),
            today()
        );
    }
}
