use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use ai_client::util::strip_code_fences;
use ai_client::{ModelChain, ModelError};
use asta_core::{
    ExtractionError, GeoAccuracy, ListingExtractor, NewProperty, PropertyStatus, PropertyType,
};

use crate::geo::{self, Geocoder, Region};

/// What the model returns for one listing. Every field is optional; missing
/// or oddly-typed values get coerced with explicit defaults rather than
/// failing the record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<f64>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_coord")]
    pub lat: Option<f64>,
    #[serde(default, rename = "long", deserialize_with = "deserialize_coord")]
    pub lng: Option<f64>,
    #[serde(default, rename = "type")]
    pub listing_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub vibe_features: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Price as a JSON number, or a string like "GHS 1,200.50" — anything that
/// isn't a digit, dot, or minus sign is stripped before parsing.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    })
}

/// Coordinate as a JSON number or a numeric string.
fn deserialize_coord<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Tags as a JSON array of strings or a single comma-delimited string —
/// the model alternates between both shapes.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let tags = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .collect::<Vec<_>>(),
        serde_json::Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    Ok(tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

/// Deterministic extraction prompt: the raw text plus the exact target JSON
/// shape. Field names are fixed; the models are swappable.
pub fn build_prompt(raw_text: &str) -> String {
    format!(
        r#"You are Asta, an expert real-estate listing analyst for Ghana.
Extract the listing below into this EXACT JSON structure:

{{
  "title": "Short catchy title",
  "price": 12345,
  "location_name": "Neighbourhood name",
  "lat": 5.123,
  "long": -0.123,
  "type": "rent" or "sale",
  "vibe_features": "TAG1, TAG2, TAG3",
  "description": "A two-sentence professional marketing summary."
}}

Rules:
- price is a number only, normalised to GHS.
- type is exactly "rent" or "sale".
- Never invent fields that are not in this structure.
- Respond with the JSON object only, no surrounding prose.

RAW TEXT:
{raw_text}"#
    )
}

/// Parse a raw model response into a [`RawListing`].
///
/// Strips code fences, then accepts either a single object or a list — a
/// one-element list is the same listing, an empty list means the model
/// found nothing.
pub fn parse_listing(raw: &str) -> Result<RawListing, ExtractionError> {
    let cleaned = strip_code_fences(raw);

    let value: serde_json::Value = serde_json::from_str(cleaned)
        .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

    let object = match value {
        serde_json::Value::Array(items) => match items.into_iter().next() {
            Some(first) => first,
            None => return Err(ExtractionError::EmptyResponse),
        },
        other => other,
    };

    serde_json::from_value(object).map_err(|e| ExtractionError::MalformedResponse(e.to_string()))
}

// =============================================================================
// Extractor
// =============================================================================

/// The text-to-listing pipeline: prompt → model chain → parse → geocoding
/// enrichment → coordinate validation → jitter.
pub struct Extractor {
    chain: ModelChain,
    geocoder: Arc<dyn Geocoder>,
    region: Region,
}

impl Extractor {
    pub fn new(chain: ModelChain, geocoder: Arc<dyn Geocoder>, region: Region) -> Self {
        Self {
            chain,
            geocoder,
            region,
        }
    }

    async fn extract_impl(&self, raw_text: &str) -> Result<NewProperty, ExtractionError> {
        // Truncate pathological input to keep the prompt inside token limits
        let raw_text = if raw_text.len() > 30_000 {
            let mut end = 30_000;
            while !raw_text.is_char_boundary(end) {
                end -= 1;
            }
            &raw_text[..end]
        } else {
            raw_text
        };

        let prompt = build_prompt(raw_text);

        let response = self.chain.generate(&prompt).await.map_err(|e| match e {
            ModelError::AllModelsExhausted { .. } => ExtractionError::AllModelsExhausted,
        })?;

        let listing = parse_listing(&response)?;

        let title = listing
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled listing".to_string());
        let price = listing.price.unwrap_or(0.0).max(0.0);
        let mut location_name = listing.location_name.unwrap_or_default().trim().to_string();
        let mut lat = listing.lat.unwrap_or(0.0);
        let mut lng = listing.lng.unwrap_or(0.0);
        let property_type =
            PropertyType::from_model_output(listing.listing_type.as_deref().unwrap_or(""));

        // Best-effort enrichment: a geocoder hit beats whatever the model
        // guessed; a miss keeps the model's coordinates at low accuracy.
        let geocoded = self.geocoder.lookup(&location_name).await;
        let geo_accuracy = match geocoded {
            Ok(Some(place)) => {
                lat = place.lat;
                lng = place.lng;
                location_name = place.display_name;
                GeoAccuracy::High
            }
            Ok(None) => GeoAccuracy::Low,
            Err(e) => {
                warn!(location = location_name.as_str(), error = %e, "Geocoding unavailable");
                GeoAccuracy::Low
            }
        };

        let (lat, lng) = self.region.validate(lat, lng);
        let (lat, lng) = geo::jitter(lat, lng);

        Ok(NewProperty {
            title,
            price,
            location_name,
            lat,
            lng,
            property_type,
            vibe_features: listing.vibe_features,
            description: listing.description.unwrap_or_default(),
            geo_accuracy,
            status: PropertyStatus::Active,
        })
    }
}

#[async_trait]
impl ListingExtractor for Extractor {
    async fn extract(&self, raw_text: &str) -> Result<NewProperty, ExtractionError> {
        self.extract_impl(raw_text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_JSON: &str = r#"{
        "title": "2BR Apartment in Osu",
        "price": 2500,
        "location_name": "Osu",
        "lat": 5.55,
        "long": -0.18,
        "type": "rent",
        "vibe_features": "Pool, Gym, Sea View",
        "description": "Bright two-bedroom close to Oxford Street."
    }"#;

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let plain = parse_listing(LISTING_JSON).unwrap();
        let fenced = parse_listing(&format!("```json\n{LISTING_JSON}\n```")).unwrap();

        assert_eq!(plain.title, fenced.title);
        assert_eq!(plain.price, fenced.price);
        assert_eq!(plain.vibe_features, fenced.vibe_features);
    }

    #[test]
    fn one_element_list_is_the_same_listing() {
        let plain = parse_listing(LISTING_JSON).unwrap();
        let listed = parse_listing(&format!("[{LISTING_JSON}]")).unwrap();

        assert_eq!(plain.title, listed.title);
        assert_eq!(plain.lat, listed.lat);
    }

    #[test]
    fn multi_element_list_takes_first() {
        let listing = parse_listing(&format!("[{LISTING_JSON}, {{\"title\": \"other\"}}]")).unwrap();
        assert_eq!(listing.title.as_deref(), Some("2BR Apartment in Osu"));
    }

    #[test]
    fn empty_list_is_an_empty_response() {
        assert!(matches!(
            parse_listing("[]"),
            Err(ExtractionError::EmptyResponse)
        ));
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            parse_listing("Sorry, I could not process that."),
            Err(ExtractionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn price_as_string_with_currency_noise() {
        let listing = parse_listing(r#"{"price": "GHS 1,200.50"}"#).unwrap();
        assert_eq!(listing.price, Some(1200.50));
    }

    #[test]
    fn tags_as_array_or_string() {
        let from_string = parse_listing(r#"{"vibe_features": " Pool , Gym ,, "}"#).unwrap();
        let from_array = parse_listing(r#"{"vibe_features": ["Pool", "Gym"]}"#).unwrap();
        assert_eq!(from_string.vibe_features, vec!["Pool", "Gym"]);
        assert_eq!(from_array.vibe_features, vec!["Pool", "Gym"]);
    }

    #[test]
    fn missing_fields_default_instead_of_failing() {
        let listing = parse_listing("{}").unwrap();
        assert!(listing.title.is_none());
        assert!(listing.price.is_none());
        assert!(listing.vibe_features.is_empty());
    }

    #[test]
    fn coords_as_strings_are_coerced() {
        let listing = parse_listing(r#"{"lat": "5.55", "long": "-0.18"}"#).unwrap();
        assert_eq!(listing.lat, Some(5.55));
        assert_eq!(listing.lng, Some(-0.18));
    }

    #[test]
    fn prompt_embeds_the_raw_text_and_field_names() {
        let prompt = build_prompt("3 bed house at East Legon");
        assert!(prompt.contains("3 bed house at East Legon"));
        for field in [
            "title",
            "price",
            "location_name",
            "lat",
            "long",
            "type",
            "vibe_features",
            "description",
        ] {
            assert!(prompt.contains(field), "prompt missing field {field}");
        }
    }
}
