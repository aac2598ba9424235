//! Keyword classification: per-subcategory scoring and taxonomy-wide
//! selection.

pub mod classifier;
pub mod scorer;

pub use classifier::*;
pub use scorer::{score, TokenCounts};
