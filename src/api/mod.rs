pub mod aladhan;
pub mod error;
pub mod fallback;
pub mod quran;

pub use aladhan::{PrayerTimesSource, build_http_client};
pub use error::{FetchError, QuranError};
pub use quran::QuranClient;
