pub mod extraction;
pub mod geo;
pub mod properties;
pub mod trends;
pub mod votes;

pub use extraction::Extractor;
pub use geo::{Geocoder, Nominatim, Region};
pub use properties::{Property, TagCount};
pub use votes::{cast_vote, VoteKind, VoteOutcome};
