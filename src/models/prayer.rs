use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerType {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerType {
    /// Fixed daily order, dawn first.
    pub const ALL: [PrayerType; 5] = [
        PrayerType::Fajr,
        PrayerType::Dhuhr,
        PrayerType::Asr,
        PrayerType::Maghrib,
        PrayerType::Isha,
    ];

    pub fn index(self) -> usize {
        match self {
            PrayerType::Fajr => 0,
            PrayerType::Dhuhr => 1,
            PrayerType::Asr => 2,
            PrayerType::Maghrib => 3,
            PrayerType::Isha => 4,
        }
    }

    /// Stable key, also used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            PrayerType::Fajr => "fajr",
            PrayerType::Dhuhr => "dhuhr",
            PrayerType::Asr => "asr",
            PrayerType::Maghrib => "maghrib",
            PrayerType::Isha => "isha",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PrayerType::Fajr => "Subuh",
            PrayerType::Dhuhr => "Dzuhur",
            PrayerType::Asr => "Ashar",
            PrayerType::Maghrib => "Maghrib",
            PrayerType::Isha => "Isya",
        }
    }

    pub fn arabic(self) -> &'static str {
        match self {
            PrayerType::Fajr => "الفجر",
            PrayerType::Dhuhr => "الظهر",
            PrayerType::Asr => "العصر",
            PrayerType::Maghrib => "المغرب",
            PrayerType::Isha => "العشاء",
        }
    }
}

impl std::fmt::Display for PrayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fajr" | "subuh" | "shubuh" => Ok(PrayerType::Fajr),
            "dhuhr" | "zuhr" | "dzuhur" | "dhuhur" | "zuhur" => Ok(PrayerType::Dhuhr),
            "asr" | "ashar" | "asar" => Ok(PrayerType::Asr),
            "maghrib" | "magrib" => Ok(PrayerType::Maghrib),
            "isha" | "isya" | "isyak" => Ok(PrayerType::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerSource {
    /// Fetched from the prayer-times API.
    Api,
    /// Computed on this machine.
    Local,
    /// Static seasonal table.
    Fallback,
}

impl PrayerSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PrayerSource::Api => "api",
            PrayerSource::Local => "local",
            PrayerSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid clock time '{0}', expected HH:MM")]
pub struct TimeParseError(pub String);

/// Parse an `HH:MM` clock time. Anything after the first whitespace
/// (e.g. `"04:35 (WIB)"`) is ignored.
pub fn parse_clock(s: &str) -> Result<NaiveTime, TimeParseError> {
    let head = s.split_whitespace().next().unwrap_or("");
    NaiveTime::parse_from_str(head, "%H:%M").map_err(|_| TimeParseError(s.to_string()))
}

/// One day's five prayer times. Replaced wholesale on refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerTimes {
    pub fajr: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
    pub date: String,
    pub hijri_date: Option<String>,
    pub location: String,
    pub source: PrayerSource,
}

impl PrayerTimes {
    pub fn time_of(&self, prayer: PrayerType) -> NaiveTime {
        match prayer {
            PrayerType::Fajr => self.fajr,
            PrayerType::Dhuhr => self.dhuhr,
            PrayerType::Asr => self.asr,
            PrayerType::Maghrib => self.maghrib,
            PrayerType::Isha => self.isha,
        }
    }

    /// Prayers paired with their times, in daily order.
    pub fn schedule(&self) -> [(PrayerType, NaiveTime); 5] {
        PrayerType::ALL.map(|p| (p, self.time_of(p)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    InProgress,
    Upcoming,
    Idle,
}

impl CardStatus {
    pub fn label(self) -> &'static str {
        match self {
            CardStatus::InProgress => "Sedang Berlangsung",
            CardStatus::Upcoming => "Selanjutnya",
            CardStatus::Idle => "",
        }
    }
}

/// Display entity for a single prayer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerCard {
    pub prayer: PrayerType,
    pub name: &'static str,
    pub arabic: &'static str,
    pub time: NaiveTime,
    pub key: &'static str,
    pub status: CardStatus,
}

impl PrayerCard {
    pub fn new(prayer: PrayerType, time: NaiveTime, status: CardStatus) -> Self {
        Self {
            prayer,
            name: prayer.display_name(),
            arabic: prayer.arabic(),
            time,
            key: prayer.key(),
            status,
        }
    }
}
