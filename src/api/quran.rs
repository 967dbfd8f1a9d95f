use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::api::error::QuranError;
use crate::config::settings::QuranConfig;
use crate::models::{QuranDetail, QuranSurah};

pub const SURAH_COUNT: u32 = 114;

struct Cached<T> {
    at: Instant,
    value: T,
}

/// Client for the Quran text API. Responses are handed through as-is and
/// kept in memory: reused while fresh, dropped once past the gc age.
pub struct QuranClient {
    http: Client,
    base_url: String,
    stale_after: Duration,
    gc_after: Duration,
    list: Mutex<Option<Cached<Vec<QuranSurah>>>>,
    details: Mutex<HashMap<u32, Cached<QuranDetail>>>,
}

impl QuranClient {
    pub fn new(http: Client, config: &QuranConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            stale_after: Duration::from_secs(config.stale_after_minutes * 60),
            gc_after: Duration::from_secs(config.gc_after_hours * 3600),
            list: Mutex::new(None),
            details: Mutex::new(HashMap::new()),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: String) -> Result<T, QuranError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| QuranError::Http { what: what.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuranError::Status { what, status });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| QuranError::Http { what, source })
    }

    /// All chapters' metadata.
    pub async fn surah_list(&self) -> Result<Vec<QuranSurah>, QuranError> {
        if let Ok(list) = self.list.lock() {
            if let Some(cached) = list.as_ref().filter(|c| c.at.elapsed() < self.stale_after) {
                return Ok(cached.value.clone());
            }
        }

        let surahs: Vec<QuranSurah> = self.get_json("/surah/", "Quran list".to_string()).await?;
        if let Ok(mut list) = self.list.lock() {
            *list = Some(Cached {
                at: Instant::now(),
                value: surahs.clone(),
            });
        }
        Ok(surahs)
    }

    /// One chapter with its verses.
    pub async fn surah(&self, number: u32) -> Result<QuranDetail, QuranError> {
        if !(1..=SURAH_COUNT).contains(&number) {
            return Err(QuranError::InvalidSurah(number));
        }

        if let Ok(mut details) = self.details.lock() {
            let gc_after = self.gc_after;
            details.retain(|_, c| c.at.elapsed() < gc_after);
            if let Some(cached) = details
                .get(&number)
                .filter(|c| c.at.elapsed() < self.stale_after)
            {
                log::debug!("Surah {} served from cache", number);
                return Ok(cached.value.clone());
            }
        }

        let detail: QuranDetail = self
            .get_json(&format!("/surah/{}", number), format!("Surah {}", number))
            .await?;
        if let Ok(mut details) = self.details.lock() {
            details.insert(
                number,
                Cached {
                    at: Instant::now(),
                    value: detail.clone(),
                },
            );
        }
        Ok(detail)
    }

    #[cfg(test)]
    fn cached_surahs(&self) -> usize {
        self.details.lock().map(|d| d.len()).unwrap_or(0)
    }
}
