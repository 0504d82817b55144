use anyhow::Result;
use async_trait::async_trait;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// A resolved place from the geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
}

/// Forward-geocoding seam. `Ok(None)` means the provider answered but had
/// no match; callers treat both `None` and `Err` as a recoverable miss.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, location: &str) -> Result<Option<GeocodedPlace>>;
}

#[derive(serde::Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// Nominatim client constrained to Ghana.
pub struct Nominatim {
    http: reqwest::Client,
    base_url: String,
}

impl Nominatim {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: NOMINATIM_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Geocoder for Nominatim {
    async fn lookup(&self, location: &str) -> Result<Option<GeocodedPlace>> {
        if location.trim().is_empty() {
            return Ok(None);
        }
        if location.len() > 200 {
            anyhow::bail!("Location input too long (max 200 chars)");
        }

        let resp = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", location),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "gh"),
            ])
            .header("User-Agent", "asta-engine/0.1")
            .send()
            .await?;

        let results: Vec<NominatimResult> = resp.json().await?;
        let Some(first) = results.into_iter().next() else {
            return Ok(None);
        };

        let lat: f64 = first.lat.parse()?;
        let lng: f64 = first.lon.parse()?;
        Ok(Some(GeocodedPlace {
            lat,
            lng,
            display_name: first.display_name,
        }))
    }
}
