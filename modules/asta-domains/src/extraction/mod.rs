pub mod extractor;

pub use extractor::{build_prompt, parse_listing, Extractor, RawListing};
