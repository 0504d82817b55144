use serde::{Deserialize, Serialize};

/// Listing kind: offered for rent or for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Rent,
    Sale,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Sale => "sale",
        }
    }

    /// Coerce a free-form model answer. Anything that isn't clearly a sale
    /// defaults to rent rather than dropping the record.
    pub fn from_model_output(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "sale" | "sell" | "for sale" => Self::Sale,
            _ => Self::Rent,
        }
    }
}

/// Lifecycle status. New records are always active; only external
/// moderation flips a record inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Active,
    Inactive,
}

impl PropertyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// How the final coordinates were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoAccuracy {
    /// Geocoder resolved the location name.
    High,
    /// Model-supplied (or anchored) coordinates; geocoding missed or was
    /// unavailable.
    Low,
}

impl GeoAccuracy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

/// A finished extraction, ready for insertion. Tags are held as a list
/// internally; joining to the store's delimited column happens only at the
/// persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub title: String,
    pub price: f64,
    pub location_name: String,
    pub lat: f64,
    pub lng: f64,
    pub property_type: PropertyType,
    pub vibe_features: Vec<String>,
    pub description: String,
    pub geo_accuracy: GeoAccuracy,
    pub status: PropertyStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_coercion() {
        assert_eq!(PropertyType::from_model_output("sale"), PropertyType::Sale);
        assert_eq!(PropertyType::from_model_output(" SALE "), PropertyType::Sale);
        assert_eq!(PropertyType::from_model_output("rent"), PropertyType::Rent);
        assert_eq!(PropertyType::from_model_output("lease"), PropertyType::Rent);
        assert_eq!(PropertyType::from_model_output(""), PropertyType::Rent);
    }
}
