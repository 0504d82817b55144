pub mod fallback;
pub mod gemini;
pub mod traits;
pub mod util;

pub use fallback::{ModelChain, ModelError};
pub use gemini::Gemini;
pub use traits::TextModel;
