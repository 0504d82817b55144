pub mod geocode;

pub use geocode::{GeocodedPlace, Geocoder, Nominatim};

use rand::Rng;

/// Maximum positional offset applied by [`jitter`], in degrees per axis.
/// Roughly 200m — enough to decluster map pins, cosmetic only.
pub const JITTER_DEGREES: f64 = 0.002;

/// Geographic sanity bounds for one deployment region, with the anchor
/// point substituted when extracted coordinates fall outside them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    pub anchor_lat: f64,
    pub anchor_lng: f64,
}

/// Ghana bounding box, anchored on central Accra.
pub const GHANA: Region = Region {
    min_lat: 4.5,
    max_lat: 11.5,
    min_lng: -3.5,
    max_lng: 1.5,
    anchor_lat: 5.6037,
    anchor_lng: -0.1870,
};

impl Region {
    /// Clamp hallucinated coordinates to the region's anchor point.
    ///
    /// Total function: (0,0) — the model's favourite placeholder — and any
    /// pair outside the bounding box both map to the anchor; in-bounds
    /// pairs pass through unchanged. Anchoring keeps the record on the map
    /// instead of discarding it.
    pub fn validate(&self, lat: f64, lng: f64) -> (f64, f64) {
        if (lat == 0.0 && lng == 0.0) || !self.contains(lat, lng) {
            return (self.anchor_lat, self.anchor_lng);
        }
        (lat, lng)
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

/// Perturb coordinates by independent uniform noise in ±[`JITTER_DEGREES`]
/// per axis, so records anchored to the same point don't stack into one
/// map marker.
pub fn jitter(lat: f64, lng: f64) -> (f64, f64) {
    let mut rng = rand::rng();
    (
        lat + rng.random_range(-JITTER_DEGREES..=JITTER_DEGREES),
        lng + rng.random_range(-JITTER_DEGREES..=JITTER_DEGREES),
    )
}
