pub mod calculator;
pub mod countdown;
pub mod resolver;

pub use calculator::PrayerCalculator;
pub use countdown::Countdown;
pub use resolver::{Board, resolve};
