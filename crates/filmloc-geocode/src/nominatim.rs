use std::time::Duration;

use async_trait::async_trait;
use filmloc_types::Coordinates;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{GeocodeError, Geocoder, Throttle};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Connection settings for a Nominatim-compatible search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Public Nominatim allows one request per second.
    pub requests_per_sec: u32,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("filmloc-geocode/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
            requests_per_sec: 1,
        }
    }
}

/// [`Geocoder`] backed by the Nominatim `/search` API.
pub struct NominatimClient {
    client: Client,
    search_url: Url,
    host: String,
    throttle: Throttle,
}

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let base = Url::parse(&config.base_url)
            .map_err(|_| GeocodeError::InvalidBaseUrl(config.base_url.clone()))?;
        let host = base
            .host_str()
            .ok_or_else(|| GeocodeError::InvalidBaseUrl(config.base_url.clone()))?
            .to_string();
        let search_url = Url::parse(&format!("{}/search", config.base_url.trim_end_matches('/')))
            .map_err(|_| GeocodeError::InvalidBaseUrl(config.base_url.clone()))?;

        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            search_url,
            host,
            throttle: Throttle::new(config.requests_per_sec, 1),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.throttle.acquire(&self.host).await;
        let places: Vec<Place> = self
            .client
            .get(self.search_url.clone())
            .query(&[("q", place), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        places.first().map(parse_place).transpose()
    }
}

fn parse_place(place: &Place) -> Result<Coordinates, GeocodeError> {
    let latitude = place
        .lat
        .trim()
        .parse()
        .map_err(|_| GeocodeError::InvalidCoordinate {
            field: "lat",
            value: place.lat.clone(),
        })?;
    let longitude = place
        .lon
        .trim()
        .parse()
        .map_err(|_| GeocodeError::InvalidCoordinate {
            field: "lon",
            value: place.lon.clone(),
        })?;
    Ok(Coordinates {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_coordinates() {
        let place = Place {
            lat: "48.8588897".into(),
            lon: " 2.3200410".into(),
        };
        let coords = parse_place(&place).unwrap();
        assert_eq!(coords.latitude, 48.8588897);
        assert_eq!(coords.longitude, 2.320041);

        let bad = Place {
            lat: "north".into(),
            lon: "0".into(),
        };
        assert!(matches!(
            parse_place(&bad),
            Err(GeocodeError::InvalidCoordinate { field: "lat", .. })
        ));
    }

    #[test]
    fn rejects_base_url_without_host() {
        let config = NominatimConfig {
            base_url: "not a url".into(),
            ..NominatimConfig::default()
        };
        assert!(matches!(
            NominatimClient::new(config),
            Err(GeocodeError::InvalidBaseUrl(_))
        ));
    }
}
