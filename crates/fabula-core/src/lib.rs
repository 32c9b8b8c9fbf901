//! Shared building blocks for the Fabula crates

mod error;
mod phrases;
mod text;

pub use error::HttpError;
pub use phrases::{PhraseSet, choose};
pub use text::{a_or_an, with_article};
