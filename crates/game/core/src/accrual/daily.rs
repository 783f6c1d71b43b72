/// Hours consumed on one calendar day.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DailyCapState {
    /// `YYYY-MM-DD`; empty before the first settlement.
    pub date_key: String,
    pub hours_consumed_today: f64,
}

/// Tracks today's consumption and rolls it over lazily.
///
/// The tracker never clamps consumption against the cap; the accrual engine
/// only asks for [`remaining`](Self::remaining) before each settlement and
/// never consumes more than that.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DailyCapTracker {
    state: DailyCapState,
}

impl DailyCapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: DailyCapState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &DailyCapState {
        &self.state
    }

    /// Resets consumption if `today` differs from the stored day.
    ///
    /// Returns true only on the call that performed the reset; further calls
    /// on the same day are no-ops.
    pub fn check_daily_reset(&mut self, today: &str) -> bool {
        if self.state.date_key == today {
            return false;
        }
        self.state.date_key = today.to_string();
        self.state.hours_consumed_today = 0.0;
        true
    }

    /// Hours left today under `cap_hours`, after a lazy reset.
    pub fn remaining(&mut self, today: &str, cap_hours: f64) -> f64 {
        self.check_daily_reset(today);
        (cap_hours - self.state.hours_consumed_today).max(0.0)
    }

    /// Hours left today without touching the stored state.
    pub fn peek_remaining(&self, today: &str, cap_hours: f64) -> f64 {
        if self.state.date_key != today {
            return cap_hours.max(0.0);
        }
        (cap_hours - self.state.hours_consumed_today).max(0.0)
    }

    pub fn consume(&mut self, today: &str, hours: f64) {
        self.check_daily_reset(today);
        if hours > 0.0 {
            self.state.hours_consumed_today += hours;
        }
    }

    pub fn hours_consumed_today(&self) -> f64 {
        self.state.hours_consumed_today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_happens_once_per_day() {
        let mut tracker = DailyCapTracker::new();
        assert!(tracker.check_daily_reset("2024-05-01"));
        tracker.consume("2024-05-01", 3.0);

        for _ in 0..5 {
            assert!(!tracker.check_daily_reset("2024-05-01"));
        }
        assert_eq!(tracker.hours_consumed_today(), 3.0);

        assert!(tracker.check_daily_reset("2024-05-02"));
        assert_eq!(tracker.hours_consumed_today(), 0.0);
        assert!(!tracker.check_daily_reset("2024-05-02"));
    }

    #[test]
    fn remaining_floors_at_zero() {
        let mut tracker = DailyCapTracker::new();
        tracker.consume("2024-05-01", 30.0);
        assert_eq!(tracker.remaining("2024-05-01", 24.0), 0.0);
    }

    #[test]
    fn peek_sees_rollover_without_mutating() {
        let mut tracker = DailyCapTracker::new();
        tracker.consume("2024-05-01", 20.0);
        assert_eq!(tracker.peek_remaining("2024-05-02", 24.0), 24.0);
        assert_eq!(tracker.state().date_key, "2024-05-01");
        assert_eq!(tracker.peek_remaining("2024-05-01", 24.0), 4.0);
    }
}
