//! Intent extraction and validation.
//!
//! The extractor's output is untrusted JSON from a probabilistic model; it
//! stays a `RawIntent` until validation turns it into an `ExtractedIntent`
//! with a closed `Intent` enum. Nothing downstream of the validator ever
//! sees a free-form intent string.

mod extract;
mod validate;

pub use extract::{extract_intent, ExtractError, RawIntent};
pub use validate::{validate, ExtractedIntent, Intent, UnknownIntent};
