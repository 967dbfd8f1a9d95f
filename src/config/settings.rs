use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::Location;
use crate::models::location::{DEFAULT_CITY, DEFAULT_COUNTRY, DEFAULT_LATITUDE, DEFAULT_LONGITUDE};

/// Environment variable that overrides [`PrayerConfig::mode`].
pub const MODE_ENV: &str = "ALAMIN_ENV";

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}
fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}
fn default_latitude() -> f64 {
    DEFAULT_LATITUDE
}
fn default_longitude() -> f64 {
    DEFAULT_LONGITUDE
}
fn default_dev_base_url() -> String {
    "http://localhost:3001".to_string()
}
fn default_aladhan_base_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}
fn default_methods() -> Vec<u32> {
    vec![8, 2, 1]
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_stale_after_minutes() -> u64 {
    30
}
fn default_refetch_interval_minutes() -> u64 {
    60
}
fn default_calc_method() -> String {
    "Singapore".to_string()
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_timezone_offset() -> i32 {
    420
}
fn default_quran_base_url() -> String {
    "https://quran-api.santrikoding.com/api".to_string()
}
fn default_quran_stale_minutes() -> u64 {
    60
}
fn default_quran_gc_hours() -> u64 {
    24
}
fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl std::str::FromStr for Mode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            _ => Err(anyhow::anyhow!("Unknown mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            country: default_country(),
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

impl LocationConfig {
    pub fn to_location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
            city: Some(self.city.clone()),
            country: Some(self.country.clone()),
        }
        .or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerConfig {
    #[serde(default)]
    pub mode: Mode,
    /// Relay origin used in development.
    #[serde(default = "default_dev_base_url")]
    pub dev_base_url: String,
    /// Relay origin used in production. Without one, only the direct API is tried.
    #[serde(default)]
    pub site_origin: Option<String>,
    #[serde(default = "default_aladhan_base_url")]
    pub aladhan_base_url: String,
    /// Calculation methods, in the order they are tried.
    #[serde(default = "default_methods")]
    pub methods: Vec<u32>,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_stale_after_minutes")]
    pub stale_after_minutes: u64,
    #[serde(default = "default_refetch_interval_minutes")]
    pub refetch_interval_minutes: u64,
    /// Offline calculation method (salah names).
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32, // minutes from UTC
    #[serde(default)]
    pub hijri_offset: i32,
}

impl Default for PrayerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            dev_base_url: default_dev_base_url(),
            site_origin: None,
            aladhan_base_url: default_aladhan_base_url(),
            methods: default_methods(),
            retry_delay_ms: default_retry_delay_ms(),
            stale_after_minutes: default_stale_after_minutes(),
            refetch_interval_minutes: default_refetch_interval_minutes(),
            calc_method: default_calc_method(),
            madhab: default_madhab(),
            timezone_offset: default_timezone_offset(),
            hijri_offset: 0,
        }
    }
}

impl PrayerConfig {
    /// Configured mode unless `env_value` names another.
    pub fn effective_mode(&self, env_value: Option<&str>) -> Mode {
        match env_value.map(str::parse::<Mode>) {
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                log::warn!("Ignoring {}: {}", MODE_ENV, e);
                self.mode
            }
            None => self.mode,
        }
    }

    /// Relay origin for `mode`, without a trailing slash.
    pub fn base_url_for(&self, mode: Mode) -> Option<String> {
        let url = match mode {
            Mode::Development => Some(self.dev_base_url.as_str()),
            Mode::Production => self.site_origin.as_deref(),
        };
        url.map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
    }

    pub fn base_url(&self) -> Option<String> {
        let env = std::env::var(MODE_ENV).ok();
        self.base_url_for(self.effective_mode(env.as_deref()))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_minutes * 60)
    }

    pub fn refetch_interval(&self) -> Duration {
        Duration::from_secs(self.refetch_interval_minutes.max(1) * 60)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuranConfig {
    #[serde(default = "default_quran_base_url")]
    pub base_url: String,
    #[serde(default = "default_quran_stale_minutes")]
    pub stale_after_minutes: u64,
    #[serde(default = "default_quran_gc_hours")]
    pub gc_after_hours: u64,
}

impl Default for QuranConfig {
    fn default() -> Self {
        Self {
            base_url: default_quran_base_url(),
            stale_after_minutes: default_quran_stale_minutes(),
            gc_after_hours: default_quran_gc_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_aladhan_base_url")]
    pub upstream_base_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            upstream_base_url: default_aladhan_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub prayer: PrayerConfig,
    #[serde(default)]
    pub quran: QuranConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "alamin")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }
}
