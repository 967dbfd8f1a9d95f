//! Time-window logic over one day's five prayer times.
//!
//! Every function takes the reference time explicitly. Comparisons are done
//! in whole minutes since midnight; seconds of `now` are ignored.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::models::{CardStatus, PrayerCard, PrayerTimes, PrayerType};
use crate::prayer_times::countdown::Countdown;

/// Minutes before a prayer's time at which its window opens.
pub const WINDOW_BEFORE_MINUTES: i32 = 10;
/// Minutes after a prayer's time at which its window closes.
pub const WINDOW_AFTER_MINUTES: i32 = 30;

pub fn minutes_since_midnight(t: NaiveTime) -> i32 {
    (t.hour() * 60 + t.minute()) as i32
}

/// `now` falls within [-10, +30] minutes of `prayer_time`, both ends inclusive.
pub fn is_active(prayer_time: NaiveTime, now: NaiveTime) -> bool {
    let diff = minutes_since_midnight(now) - minutes_since_midnight(prayer_time);
    (-WINDOW_BEFORE_MINUTES..=WINDOW_AFTER_MINUTES).contains(&diff)
}

/// First prayer, in daily order, whose window contains `now`.
pub fn active_prayer(times: &PrayerTimes, now: NaiveTime) -> Option<PrayerType> {
    times
        .schedule()
        .into_iter()
        .find(|(_, t)| is_active(*t, now))
        .map(|(p, _)| p)
}

/// Earliest prayer at or after `now`; after Isha this wraps to Fajr.
pub fn next_prayer(times: &PrayerTimes, now: NaiveTime) -> PrayerType {
    let now = minutes_since_midnight(now);
    times
        .schedule()
        .into_iter()
        .find(|(_, t)| now <= minutes_since_midnight(*t))
        .map(|(p, _)| p)
        .unwrap_or(PrayerType::Fajr)
}

/// The prayer whose time most recently passed. Before Fajr that is still
/// last night's Isha.
pub fn current_prayer(times: &PrayerTimes, now: NaiveTime) -> PrayerType {
    let now = minutes_since_midnight(now);
    let mut current = PrayerType::Isha;
    for (prayer, t) in times.schedule() {
        if now < minutes_since_midnight(t) {
            break;
        }
        current = prayer;
    }
    current
}

/// Daily order rotated to begin at `start`.
pub fn rotation(start: PrayerType) -> [PrayerType; 5] {
    let offset = start.index();
    std::array::from_fn(|i| PrayerType::ALL[(offset + i) % PrayerType::ALL.len()])
}

/// Five cards starting at `start`, every status `Idle`.
pub fn mobile_sequence(times: &PrayerTimes, start: PrayerType) -> Vec<PrayerCard> {
    rotation(start)
        .into_iter()
        .map(|p| PrayerCard::new(p, times.time_of(p), CardStatus::Idle))
        .collect()
}

/// Daily order without the current and the upcoming prayer.
pub fn remaining_prayers(
    times: &PrayerTimes,
    current: PrayerType,
    next: PrayerType,
) -> Vec<PrayerCard> {
    PrayerType::ALL
        .into_iter()
        .filter(|p| *p != current && *p != next)
        .map(|p| PrayerCard::new(p, times.time_of(p), CardStatus::Idle))
        .collect()
}

/// Everything the prayer board needs for one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub active: Option<PrayerType>,
    pub next: PrayerType,
    pub current: PrayerType,
    /// Fixed daily order; only the next prayer is highlighted.
    pub desktop: Vec<PrayerCard>,
    /// Starts at the active prayer, or the next one when none is active.
    pub mobile: Vec<PrayerCard>,
    /// Present only while no prayer is active.
    pub countdown: Option<Countdown>,
}

pub fn resolve(times: &PrayerTimes, now: NaiveTime) -> Board {
    let active = active_prayer(times, now);
    let next = next_prayer(times, now);
    let current = current_prayer(times, now);

    let desktop = PrayerType::ALL
        .into_iter()
        .map(|p| {
            let status = if p != next {
                CardStatus::Idle
            } else if is_active(times.time_of(p), now) {
                CardStatus::InProgress
            } else {
                CardStatus::Upcoming
            };
            PrayerCard::new(p, times.time_of(p), status)
        })
        .collect();

    let mobile = mobile_sequence(times, active.unwrap_or(next))
        .into_iter()
        .map(|mut card| {
            card.status = if Some(card.prayer) == active {
                CardStatus::InProgress
            } else if card.prayer == next {
                CardStatus::Upcoming
            } else {
                CardStatus::Idle
            };
            card
        })
        .collect();

    let countdown = match active {
        Some(_) => None,
        None => Some(Countdown::until(times.time_of(next), now)),
    };

    Board {
        active,
        next,
        current,
        desktop,
        mobile,
        countdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrayerSource;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample() -> PrayerTimes {
        PrayerTimes {
            fajr: hm(4, 53),
            dhuhr: hm(12, 2),
            asr: hm(15, 23),
            maghrib: hm(17, 55),
            isha: hm(19, 8),
            date: "16 Oct 2026".to_string(),
            hijri_date: None,
            location: "Jakarta, Indonesia".to_string(),
            source: PrayerSource::Api,
        }
    }

    fn keys(cards: &[PrayerCard]) -> Vec<&'static str> {
        cards.iter().map(|c| c.key).collect()
    }

    #[test]
    fn window_edges_are_inclusive() {
        let dhuhr = hm(12, 2);
        assert!(is_active(dhuhr, hm(11, 52)));
        assert!(is_active(dhuhr, hm(12, 32)));
        assert!(!is_active(dhuhr, hm(11, 51)));
        assert!(!is_active(dhuhr, hm(12, 33)));
    }

    #[test]
    fn seconds_of_reference_are_ignored() {
        let dhuhr = hm(12, 2);
        let late = NaiveTime::from_hms_opt(12, 32, 59).unwrap();
        assert!(is_active(dhuhr, late));
    }

    #[test]
    fn before_dhuhr_shows_countdown() {
        let board = resolve(&sample(), hm(11, 50));
        assert_eq!(board.active, None);
        assert_eq!(board.next, PrayerType::Dhuhr);
        let countdown = board.countdown.unwrap();
        assert_eq!((countdown.hours, countdown.minutes, countdown.seconds), (0, 12, 0));
        assert_eq!(
            keys(&board.mobile),
            vec!["dhuhr", "asr", "maghrib", "isha", "fajr"]
        );
        assert_eq!(board.mobile[0].status, CardStatus::Upcoming);
    }

    #[test]
    fn exact_prayer_time_is_active_and_next() {
        let board = resolve(&sample(), hm(12, 2));
        assert_eq!(board.active, Some(PrayerType::Dhuhr));
        assert_eq!(board.next, PrayerType::Dhuhr);
        assert!(board.countdown.is_none());
        assert_eq!(board.mobile[0].prayer, PrayerType::Dhuhr);
        assert_eq!(board.mobile[0].status, CardStatus::InProgress);
        assert_eq!(board.desktop[1].status, CardStatus::InProgress);
    }

    #[test]
    fn after_prayer_time_active_stays_but_next_moves_on() {
        let board = resolve(&sample(), hm(15, 45));
        assert_eq!(board.active, Some(PrayerType::Asr));
        assert_eq!(board.next, PrayerType::Maghrib);
        assert_eq!(board.mobile[0].status, CardStatus::InProgress);
        assert_eq!(board.mobile[1].prayer, PrayerType::Maghrib);
        assert_eq!(board.mobile[1].status, CardStatus::Upcoming);
        // desktop highlights the next prayer, which is not yet in its window
        assert_eq!(board.desktop[3].status, CardStatus::Upcoming);
        assert_eq!(board.desktop[2].status, CardStatus::Idle);
    }

    #[test]
    fn early_window_highlights_in_progress_on_desktop() {
        let board = resolve(&sample(), hm(11, 55));
        assert_eq!(board.active, Some(PrayerType::Dhuhr));
        assert_eq!(board.desktop[1].status, CardStatus::InProgress);
    }

    #[test]
    fn next_not_yet_active_on_desktop() {
        let board = resolve(&sample(), hm(18, 30));
        assert_eq!(board.active, None);
        assert_eq!(board.next, PrayerType::Isha);
        assert_eq!(board.desktop[4].status, CardStatus::Upcoming);
        assert!(board.desktop[..4].iter().all(|c| c.status == CardStatus::Idle));
    }

    #[test]
    fn rotation_from_asr() {
        let seq = mobile_sequence(&sample(), PrayerType::Asr);
        assert_eq!(keys(&seq), vec!["asr", "maghrib", "isha", "fajr", "dhuhr"]);
    }

    #[test]
    fn next_wraps_to_fajr_after_isha_window() {
        let times = sample();
        let now = hm(20, 0);
        assert_eq!(active_prayer(&times, now), None);
        assert_eq!(next_prayer(&times, now), PrayerType::Fajr);
        let board = resolve(&times, now);
        let countdown = board.countdown.unwrap();
        // 20:00 -> 04:53 the following morning
        assert_eq!((countdown.hours, countdown.minutes), (8, 53));
    }

    #[test]
    fn after_midnight_next_is_same_day_fajr() {
        let times = sample();
        assert_eq!(next_prayer(&times, hm(0, 30)), PrayerType::Fajr);
        assert_eq!(current_prayer(&times, hm(0, 30)), PrayerType::Isha);
        let board = resolve(&times, hm(0, 30));
        let countdown = board.countdown.unwrap();
        assert_eq!((countdown.hours, countdown.minutes), (4, 23));
    }

    #[test]
    fn current_prayer_tracks_last_passed() {
        let times = sample();
        assert_eq!(current_prayer(&times, hm(13, 0)), PrayerType::Dhuhr);
        assert_eq!(current_prayer(&times, hm(23, 0)), PrayerType::Isha);
    }

    #[test]
    fn remaining_excludes_current_and_next() {
        let rest = remaining_prayers(&sample(), PrayerType::Dhuhr, PrayerType::Asr);
        assert_eq!(keys(&rest), vec!["fajr", "maghrib", "isha"]);
    }

    #[test]
    fn maghrib_active_at_its_time() {
        let board = resolve(&sample(), hm(17, 55));
        assert_eq!(board.active, Some(PrayerType::Maghrib));
        assert_eq!(
            keys(&board.mobile),
            vec!["maghrib", "isha", "fajr", "dhuhr", "asr"]
        );
    }
}
