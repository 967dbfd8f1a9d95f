use serde::{Deserialize, Serialize};

pub const DEFAULT_LATITUDE: f64 = -6.2088;
pub const DEFAULT_LONGITUDE: f64 = 106.8456;
pub const DEFAULT_CITY: &str = "Jakarta";
pub const DEFAULT_COUNTRY: &str = "Indonesia";
const DEVICE_CITY: &str = "Your Location";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            city: Some(DEFAULT_CITY.to_string()),
            country: Some(DEFAULT_COUNTRY.to_string()),
        }
    }
}

impl Location {
    /// A device-supplied position without a known city.
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            city: Some(DEVICE_CITY.to_string()),
            country: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && self.latitude.is_finite()
            && self.longitude.is_finite()
    }

    /// Fall back to the default city when the position is unusable.
    pub fn or_default(self) -> Self {
        if self.is_valid() {
            self
        } else {
            log::warn!(
                "Unusable location ({}, {}), using {}",
                self.latitude,
                self.longitude,
                DEFAULT_CITY
            );
            Self::default()
        }
    }

    /// True when the position came from the device rather than a named city.
    pub fn is_device(&self) -> bool {
        self.city.as_deref() == Some(DEVICE_CITY)
    }

    /// City used for by-city API lookups.
    pub fn query_city(&self) -> &str {
        self.city
            .as_deref()
            .filter(|c| !c.is_empty() && *c != DEVICE_CITY)
            .unwrap_or(DEFAULT_CITY)
    }

    pub fn query_country(&self) -> &str {
        self.country
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COUNTRY)
    }

    pub fn label(&self) -> String {
        format!(
            "{}, {}",
            self.city.as_deref().filter(|c| !c.is_empty()).unwrap_or(DEFAULT_CITY),
            self.country.as_deref().filter(|c| !c.is_empty()).unwrap_or(DEFAULT_COUNTRY)
        )
    }

    /// Cache key; coordinates rounded to about a kilometre.
    pub fn cache_key(&self) -> (i64, i64) {
        (
            (self.latitude * 100.0).round() as i64,
            (self.longitude * 100.0).round() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_falls_back_to_jakarta() {
        let loc = Location::from_coordinates(123.0, 10.0).or_default();
        assert_eq!(loc, Location::default());
    }

    #[test]
    fn device_location_queries_default_city() {
        let loc = Location::from_coordinates(-6.4, 106.8);
        assert_eq!(loc.query_city(), "Jakarta");
        assert_eq!(loc.query_country(), "Indonesia");
        assert_eq!(loc.label(), "Your Location, Indonesia");
        assert!(loc.is_device());
        assert!(!Location::default().is_device());
    }
}
