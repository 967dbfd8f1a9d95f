pub mod location;
pub mod prayer;
pub mod quran;

pub use location::Location;
pub use prayer::{CardStatus, PrayerCard, PrayerSource, PrayerTimes, PrayerType, TimeParseError, parse_clock};
pub use quran::{QuranAyat, QuranDetail, QuranSurah, Revelation};
