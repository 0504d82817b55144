pub mod config;
pub mod deps;
pub mod error;
pub mod extractor;
pub mod types;

pub use config::AppConfig;
pub use deps::ServerDeps;
pub use error::AstaError;
pub use extractor::{ExtractionError, ListingExtractor};
pub use types::*;
