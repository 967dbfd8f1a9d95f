use anyhow::{Result, anyhow};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime};
use salah::prelude::{Configuration, Coordinates, Madhab, Method, Prayer, PrayerSchedule};

use crate::models::{Location, PrayerSource, PrayerTimes};
use crate::utils::hijri::hijri_string;

/// Offline prayer times, used when no API candidate answers.
pub struct PrayerCalculator {
    pub method_str: String,
    pub madhab_str: String,
    pub tz_offset_minutes: i32,
    pub hijri_offset: i32,
}

impl PrayerCalculator {
    pub fn new(method: &str, madhab: &str, tz_offset_minutes: i32, hijri_offset: i32) -> Result<Self> {
        // Validate method + madhab early
        parse_method(method)?;
        parse_madhab(madhab)?;
        Ok(Self {
            method_str: method.to_string(),
            madhab_str: madhab.to_string(),
            tz_offset_minutes,
            hijri_offset,
        })
    }

    fn compute_times(&self, location: &Location, date: NaiveDate) -> Result<[NaiveTime; 5]> {
        let coords = Coordinates::new(location.latitude, location.longitude);
        let method = parse_method(&self.method_str)?;
        let madhab = parse_madhab(&self.madhab_str)?;
        let params = Configuration::with(method, madhab);

        let times = PrayerSchedule::new()
            .on(date)
            .for_location(coords)
            .with_configuration(params)
            .calculate()
            .map_err(|e| anyhow!("Prayer calculation failed: {}", e))?;

        let offset = FixedOffset::east_opt(self.tz_offset_minutes * 60)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", self.tz_offset_minutes))?;

        let to_local = |utc: chrono::DateTime<chrono::Utc>| -> NaiveTime {
            utc.with_timezone(&offset).time()
        };

        Ok([
            to_local(times.time(Prayer::Fajr)),
            to_local(times.time(Prayer::Dhuhr)),
            to_local(times.time(Prayer::Asr)),
            to_local(times.time(Prayer::Maghrib)),
            to_local(times.time(Prayer::Isha)),
        ])
    }

    /// Astronomical times for `location`, or the seasonal table if the
    /// calculation fails.
    pub fn local_times(&self, location: &Location, date: NaiveDate) -> PrayerTimes {
        let (times, source) = match self.compute_times(location, date) {
            Ok(times) => (times, PrayerSource::Local),
            Err(e) => {
                log::warn!("Local calculation failed, using seasonal table: {e:#}");
                (seasonal_times(date), PrayerSource::Fallback)
            }
        };
        let [fajr, dhuhr, asr, maghrib, isha] = times;
        PrayerTimes {
            fajr,
            dhuhr,
            asr,
            maghrib,
            isha,
            date: readable_date(date),
            hijri_date: hijri_string(date, self.hijri_offset).ok(),
            location: location.label(),
            source,
        }
    }
}

/// Approximate Jakarta times by season.
pub fn seasonal_times(date: NaiveDate) -> [NaiveTime; 5] {
    let table: [(u32, u32); 5] = match date.month() {
        3..=5 => [(4, 45), (11, 59), (15, 21), (17, 53), (19, 23)],
        6..=8 => [(4, 30), (11, 55), (15, 15), (17, 45), (19, 15)],
        9..=11 => [(4, 40), (11, 58), (15, 18), (17, 50), (19, 20)],
        _ => [(4, 50), (12, 2), (15, 25), (17, 55), (19, 25)],
    };
    table.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN))
}

/// Same shape as the API's `readable` date, e.g. `16 Oct 2026`.
pub fn readable_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

fn parse_method(s: &str) -> Result<Method> {
    match s {
        "MuslimWorldLeague" => Ok(Method::MuslimWorldLeague),
        "Egyptian" => Ok(Method::Egyptian),
        "Karachi" => Ok(Method::Karachi),
        "UmmAlQura" => Ok(Method::UmmAlQura),
        "Dubai" => Ok(Method::Dubai),
        "MoonsightingCommittee" => Ok(Method::MoonsightingCommittee),
        "NorthAmerica" => Ok(Method::NorthAmerica),
        "Kuwait" => Ok(Method::Kuwait),
        "Qatar" => Ok(Method::Qatar),
        "Singapore" => Ok(Method::Singapore),
        "Tehran" => Ok(Method::Tehran),
        "Turkey" => Ok(Method::Turkey),
        "Other" => Ok(Method::Other),
        _ => Err(anyhow!("Unknown calculation method: '{}'", s)),
    }
}

fn parse_madhab(s: &str) -> Result<Madhab> {
    match s {
        "Hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" => Ok(Madhab::Shafi),
        _ => Err(anyhow!("Unknown madhab: '{}'", s)),
    }
}
