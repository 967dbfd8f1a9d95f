use chrono::NaiveTime;
use serde::Serialize;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Time left until a clock time, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Counts down to `target` today, or tomorrow if `target` is not after `now`.
    pub fn until(target: NaiveTime, now: NaiveTime) -> Self {
        let mut diff = target.signed_duration_since(now).num_seconds();
        if diff <= 0 {
            diff += SECONDS_PER_DAY;
        }
        Self::from_secs(diff)
    }

    pub fn from_secs(secs: i64) -> Self {
        let secs = secs.max(0);
        Self {
            hours: secs / 3600,
            minutes: (secs % 3600) / 60,
            seconds: secs % 60,
        }
    }

    pub fn total_secs(&self) -> i64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_seconds() {
        let now = NaiveTime::from_hms_opt(11, 50, 15).unwrap();
        let target = NaiveTime::from_hms_opt(12, 2, 0).unwrap();
        let c = Countdown::until(target, now);
        assert_eq!(c.to_string(), "00:11:45");
    }

    #[test]
    fn passed_target_rolls_to_tomorrow() {
        let now = NaiveTime::from_hms_opt(19, 30, 0).unwrap();
        let target = NaiveTime::from_hms_opt(4, 50, 0).unwrap();
        assert_eq!(Countdown::until(target, now).to_string(), "09:20:00");
    }

    #[test]
    fn equal_target_is_a_full_day_away() {
        let t = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert_eq!(Countdown::until(t, t).hours, 24);
    }

    #[test]
    fn negative_seconds_clamp_to_zero() {
        assert_eq!(Countdown::from_secs(-5).total_secs(), 0);
    }
}
