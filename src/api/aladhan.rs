//! Prayer-time data source backed by the Aladhan API, directly or through
//! the relay, with a local fallback when every candidate fails.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::api::error::FetchError;
use crate::api::fallback::first_success_or;
use crate::config::settings::PrayerConfig;
use crate::models::{Location, PrayerSource, PrayerTimes, parse_clock};
use crate::prayer_times::PrayerCalculator;
use crate::prayer_times::calculator::readable_date;
use crate::utils::hijri::hijri_string;

/// Path of the relay endpoint on a site origin.
pub const RELAY_PATH: &str = "/api/prayer-times";

/// Used for any timing missing from an otherwise valid response.
const DEFAULT_TIMINGS: [(&str, &str); 5] = [
    ("Fajr", "04:53"),
    ("Dhuhr", "12:02"),
    ("Asr", "15:23"),
    ("Maghrib", "17:55"),
    ("Isha", "19:08"),
];

pub fn build_http_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("alamin/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

fn by_city_url(base: &str, path: &str, location: &Location, method: u32) -> Option<Url> {
    let method = method.to_string();
    Url::parse_with_params(
        &format!("{}{}", base.trim_end_matches('/'), path),
        [
            ("city", location.query_city()),
            ("country", location.query_country()),
            ("method", method.as_str()),
        ],
    )
    .map_err(|e| log::warn!("Skipping malformed URL base {}: {}", base, e))
    .ok()
}

fn by_position_url(base: &str, location: &Location, method: u32) -> Option<Url> {
    Url::parse_with_params(
        &format!("{}/timings", base.trim_end_matches('/')),
        [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("method", method.to_string()),
        ],
    )
    .map_err(|e| log::warn!("Skipping malformed URL base {}: {}", base, e))
    .ok()
}

/// Ordered candidate URLs: relay with the first method, the API directly,
/// then the relay with each remaining method. Without a relay origin every
/// method goes to the API directly. A device position has no city to relay,
/// so it asks the API by coordinates for each method.
pub fn candidate_urls(
    relay_base: Option<&str>,
    aladhan_base: &str,
    location: &Location,
    methods: &[u32],
) -> Vec<Url> {
    let Some((&first, rest)) = methods.split_first() else {
        return Vec::new();
    };

    if location.is_device() {
        return methods
            .iter()
            .filter_map(|&method| by_position_url(aladhan_base, location, method))
            .collect();
    }

    let mut urls = Vec::new();
    match relay_base {
        Some(relay) => {
            urls.extend(by_city_url(relay, RELAY_PATH, location, first));
            urls.extend(by_city_url(aladhan_base, "/timingsByCity", location, first));
            for &method in rest {
                urls.extend(by_city_url(relay, RELAY_PATH, location, method));
            }
        }
        None => {
            for &method in methods {
                urls.extend(by_city_url(aladhan_base, "/timingsByCity", location, method));
            }
        }
    }
    urls
}

fn text_at(body: &Value, pointer: &str) -> Option<String> {
    match body.pointer(pointer)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn an Aladhan `timings` or `timingsByCity` body into [`PrayerTimes`].
pub fn parse_timings(
    body: &Value,
    location: &Location,
    today: NaiveDate,
    hijri_offset: i32,
) -> Result<PrayerTimes, FetchError> {
    let timings = body
        .pointer("/data/timings")
        .filter(|t| t.is_object())
        .ok_or(FetchError::InvalidPayload("missing data or timings"))?;

    let mut parsed = [chrono::NaiveTime::MIN; 5];
    for (slot, (name, default)) in parsed.iter_mut().zip(DEFAULT_TIMINGS) {
        let raw = timings.get(name).and_then(Value::as_str).unwrap_or(default);
        *slot = parse_clock(raw)?;
    }
    let [fajr, dhuhr, asr, maghrib, isha] = parsed;

    let date = text_at(body, "/data/date/readable").unwrap_or_else(|| readable_date(today));
    let hijri_date = match (
        text_at(body, "/data/date/hijri/day"),
        text_at(body, "/data/date/hijri/month/en"),
        text_at(body, "/data/date/hijri/year"),
    ) {
        (Some(day), Some(month), Some(year)) => Some(format!("{} {} {}", day, month, year)),
        _ => hijri_string(today, hijri_offset).ok(),
    };

    Ok(PrayerTimes {
        fajr,
        dhuhr,
        asr,
        maghrib,
        isha,
        date,
        hijri_date,
        location: location.label(),
        source: PrayerSource::Api,
    })
}

struct CachedTimes {
    key: (i64, i64),
    day: NaiveDate,
    fetched_at: Instant,
    times: PrayerTimes,
}

/// Hands out the day's prayer times for a location. Never fails: when no
/// candidate answers, the local calculation is used.
pub struct PrayerTimesSource {
    http: Client,
    relay_base: Option<String>,
    aladhan_base: String,
    methods: Vec<u32>,
    retry_delay: Duration,
    stale_after: Duration,
    hijri_offset: i32,
    calculator: PrayerCalculator,
    cache: Mutex<Option<CachedTimes>>,
}

impl PrayerTimesSource {
    pub fn new(http: Client, config: &PrayerConfig) -> Result<Self> {
        let calculator = PrayerCalculator::new(
            &config.calc_method,
            &config.madhab,
            config.timezone_offset,
            config.hijri_offset,
        )?;
        Ok(Self {
            http,
            relay_base: config.base_url(),
            aladhan_base: config.aladhan_base_url.clone(),
            methods: config.methods.clone(),
            retry_delay: config.retry_delay(),
            stale_after: config.stale_after(),
            hijri_offset: config.hijri_offset,
            calculator,
            cache: Mutex::new(None),
        })
    }

    #[cfg(test)]
    fn with_relay_base(mut self, relay_base: Option<String>) -> Self {
        self.relay_base = relay_base;
        self
    }

    pub fn candidates(&self, location: &Location) -> Vec<Url> {
        candidate_urls(
            self.relay_base.as_deref(),
            &self.aladhan_base,
            location,
            &self.methods,
        )
    }

    async fn fetch_one(&self, url: Url, location: &Location, today: NaiveDate) -> Result<PrayerTimes, FetchError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        log::debug!("Response status: {}", status);
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body: Value = response.json().await?;
        let times = parse_timings(&body, location, today, self.hijri_offset)?;
        log::info!("Prayer times fetched for {}", times.location);
        Ok(times)
    }

    /// Walk the candidate chain, without consulting the cache; the result
    /// replaces it.
    pub async fn refresh(&self, location: &Location) -> PrayerTimes {
        let today = Local::now().date_naive();
        let times = first_success_or(
            self.candidates(location),
            self.retry_delay,
            move |url| self.fetch_one(url, location, today),
            |exhausted| {
                log::warn!("Failed to fetch prayer times ({}), using local calculation", exhausted);
                self.calculator.local_times(location, today)
            },
        )
        .await;

        if let Ok(mut cache) = self.cache.lock() {
            *cache = Some(CachedTimes {
                key: location.cache_key(),
                day: today,
                fetched_at: Instant::now(),
                times: times.clone(),
            });
        }
        times
    }

    /// Cached times when fresh, otherwise a refresh.
    pub async fn get(&self, location: &Location) -> PrayerTimes {
        if let Some(times) = self.cached(location, Local::now().date_naive()) {
            log::debug!("Using cached prayer times");
            return times;
        }
        self.refresh(location).await
    }

    fn cached(&self, location: &Location, today: NaiveDate) -> Option<PrayerTimes> {
        let cache = self.cache.lock().ok()?;
        cache
            .as_ref()
            .filter(|c| {
                c.key == location.cache_key()
                    && c.day == today
                    && c.fetched_at.elapsed() < self.stale_after
            })
            .map(|c| c.times.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use httpmock::prelude::*;
    use serde_json::json;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
    }

    fn aladhan_body() -> Value {
        json!({
            "code": 200,
            "status": "OK",
            "data": {
                "timings": {
                    "Fajr": "04:36",
                    "Sunrise": "05:55",
                    "Dhuhr": "11:58",
                    "Asr": "15:19",
                    "Maghrib": "17:51",
                    "Isha": "19:04 (WIB)"
                },
                "date": {
                    "readable": "20 Jul 2025",
                    "hijri": { "day": "24", "month": { "number": 1, "en": "Muḥarram" }, "year": "1447" }
                }
            }
        })
    }

    fn source(relay: Option<String>, aladhan: String) -> PrayerTimesSource {
        let config = PrayerConfig {
            aladhan_base_url: aladhan,
            retry_delay_ms: 0,
            ..PrayerConfig::default()
        };
        PrayerTimesSource::new(Client::new(), &config)
            .unwrap()
            .with_relay_base(relay)
    }

    #[test]
    fn parses_full_payload() {
        let times = parse_timings(&aladhan_body(), &Location::default(), today(), 0).unwrap();
        assert_eq!(times.fajr, hm(4, 36));
        assert_eq!(times.isha, hm(19, 4));
        assert_eq!(times.date, "20 Jul 2025");
        assert_eq!(times.hijri_date.as_deref(), Some("24 Muḥarram 1447"));
        assert_eq!(times.source, PrayerSource::Api);
    }

    #[test]
    fn missing_timing_uses_default() {
        let body = json!({ "data": { "timings": { "Fajr": "04:40" } } });
        let times = parse_timings(&body, &Location::default(), today(), 0).unwrap();
        assert_eq!(times.fajr, hm(4, 40));
        assert_eq!(times.dhuhr, hm(12, 2));
        assert_eq!(times.isha, hm(19, 8));
        assert_eq!(times.date, "20 Jul 2025");
        assert!(times.hijri_date.is_some());
    }

    #[test]
    fn rejects_payload_without_timings() {
        let err = parse_timings(&json!({ "code": 400 }), &Location::default(), today(), 0).unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload(_)));
    }

    #[test]
    fn rejects_malformed_time() {
        let body = json!({ "data": { "timings": { "Asr": "3pm" } } });
        let err = parse_timings(&body, &Location::default(), today(), 0).unwrap_err();
        assert!(matches!(err, FetchError::Time(_)));
    }

    #[test]
    fn candidate_order_with_relay() {
        let urls = candidate_urls(
            Some("http://localhost:3001/"),
            "https://api.aladhan.com/v1",
            &Location::default(),
            &[8, 2, 1],
        );
        let urls: Vec<String> = urls.into_iter().map(String::from).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:3001/api/prayer-times?city=Jakarta&country=Indonesia&method=8",
                "https://api.aladhan.com/v1/timingsByCity?city=Jakarta&country=Indonesia&method=8",
                "http://localhost:3001/api/prayer-times?city=Jakarta&country=Indonesia&method=2",
                "http://localhost:3001/api/prayer-times?city=Jakarta&country=Indonesia&method=1",
            ]
        );
    }

    #[test]
    fn candidates_without_relay_go_direct() {
        let urls = candidate_urls(None, "https://api.aladhan.com/v1", &Location::default(), &[8, 2]);
        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|u| u.path() == "/v1/timingsByCity"));
        assert!(candidate_urls(None, "https://api.aladhan.com/v1", &Location::default(), &[]).is_empty());
    }

    #[test]
    fn device_position_is_queried_by_coordinates() {
        let urls = candidate_urls(
            Some("http://localhost:3001"),
            "https://api.aladhan.com/v1",
            &Location::from_coordinates(-6.4, 106.82),
            &[8, 2],
        );
        let urls: Vec<String> = urls.into_iter().map(String::from).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.aladhan.com/v1/timings?latitude=-6.4&longitude=106.82&method=8",
                "https://api.aladhan.com/v1/timings?latitude=-6.4&longitude=106.82&method=2",
            ]
        );
    }

    #[tokio::test]
    async fn device_position_uses_coordinates_endpoint() {
        let aladhan = MockServer::start_async().await;
        let mock = aladhan
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/timings")
                    .query_param("latitude", "-6.4")
                    .query_param("longitude", "106.82")
                    .query_param("method", "8");
                then.status(200).json_body(aladhan_body());
            })
            .await;

        let src = source(Some("http://127.0.0.1:9".to_string()), aladhan.url("/v1"));
        let times = src.refresh(&Location::from_coordinates(-6.4, 106.82)).await;
        assert_eq!(times.source, PrayerSource::Api);
        assert_eq!(times.location, "Your Location, Indonesia");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn relay_answers_first() {
        let relay = MockServer::start_async().await;
        let relay_mock = relay
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/prayer-times")
                    .query_param("city", "Jakarta")
                    .query_param("method", "8");
                then.status(200).json_body(aladhan_body());
            })
            .await;

        let src = source(Some(relay.base_url()), "http://127.0.0.1:9/v1".to_string());
        let times = src.refresh(&Location::default()).await;
        assert_eq!(times.dhuhr, hm(11, 58));
        relay_mock.assert_async().await;
    }

    #[tokio::test]
    async fn falls_through_to_direct_api() {
        let relay = MockServer::start_async().await;
        let relay_mock = relay
            .mock_async(|when, then| {
                when.method(GET).path("/api/prayer-times");
                then.status(500).json_body(json!({ "error": "Failed to fetch prayer times" }));
            })
            .await;
        let aladhan = MockServer::start_async().await;
        let direct_mock = aladhan
            .mock_async(|when, then| {
                when.method(GET).path("/v1/timingsByCity").query_param("method", "8");
                then.status(200).json_body(aladhan_body());
            })
            .await;

        let src = source(Some(relay.base_url()), aladhan.url("/v1"));
        let times = src.refresh(&Location::default()).await;
        assert_eq!(times.source, PrayerSource::Api);
        relay_mock.assert_calls_async(1).await;
        direct_mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn all_candidates_fail_uses_local_times() {
        let relay = MockServer::start_async().await;
        let relay_mock = relay
            .mock_async(|when, then| {
                when.method(GET).path("/api/prayer-times");
                then.status(503);
            })
            .await;
        let aladhan = MockServer::start_async().await;
        aladhan
            .mock_async(|when, then| {
                when.method(GET).path("/v1/timingsByCity");
                then.status(200).json_body(json!({ "code": 400, "data": "bad city" }));
            })
            .await;

        let src = source(Some(relay.base_url()), aladhan.url("/v1"));
        let times = src.get(&Location::default()).await;
        assert_ne!(times.source, PrayerSource::Api);
        // relay tried with methods 8, 2 and 1
        relay_mock.assert_calls_async(3).await;
    }

    #[tokio::test]
    async fn stale_result_is_refetched() {
        let relay = MockServer::start_async().await;
        let relay_mock = relay
            .mock_async(|when, then| {
                when.method(GET).path("/api/prayer-times");
                then.status(200).json_body(aladhan_body());
            })
            .await;

        let config = PrayerConfig {
            aladhan_base_url: "http://127.0.0.1:9/v1".to_string(),
            retry_delay_ms: 0,
            stale_after_minutes: 0,
            ..PrayerConfig::default()
        };
        let src = PrayerTimesSource::new(Client::new(), &config)
            .unwrap()
            .with_relay_base(Some(relay.base_url()));
        src.get(&Location::default()).await;
        src.get(&Location::default()).await;
        relay_mock.assert_calls_async(2).await;
    }

    #[tokio::test]
    async fn cached_times_expire_with_the_day() {
        let relay = MockServer::start_async().await;
        relay
            .mock_async(|when, then| {
                when.method(GET).path("/api/prayer-times");
                then.status(200).json_body(aladhan_body());
            })
            .await;

        let src = source(Some(relay.base_url()), "http://127.0.0.1:9/v1".to_string());
        let location = Location::default();
        src.refresh(&location).await;

        let today = Local::now().date_naive();
        assert!(src.cached(&location, today).is_some());
        assert!(src.cached(&location, today.succ_opt().unwrap()).is_none());
    }

    #[tokio::test]
    async fn fresh_result_is_reused() {
        let relay = MockServer::start_async().await;
        let relay_mock = relay
            .mock_async(|when, then| {
                when.method(GET).path("/api/prayer-times");
                then.status(200).json_body(aladhan_body());
            })
            .await;

        let src = source(Some(relay.base_url()), "http://127.0.0.1:9/v1".to_string());
        let first = src.get(&Location::default()).await;
        let second = src.get(&Location::default()).await;
        assert_eq!(first, second);
        relay_mock.assert_calls_async(1).await;

        // another place is a different cache entry
        let bandung = Location {
            latitude: -6.9175,
            longitude: 107.6191,
            city: Some("Bandung".to_string()),
            country: Some("Indonesia".to_string()),
        };
        let _ = src.get(&bandung).await;
        relay_mock.assert_calls_async(2).await;
    }
}
