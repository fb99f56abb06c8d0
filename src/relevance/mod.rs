//! Relevance scoring and gating for vector-search results.
//!
//! Raw distances become scores through [`distance_to_score`]; the
//! [`RelevanceGate`] then drops chunks below the configured threshold and
//! distinguishes "nothing came back" from "nothing was good enough".

pub mod error;
pub mod gate;

#[cfg(test)]
mod tests;

pub use error::RelevanceError;
pub use gate::{RelevanceGate, distance_to_score, filter_by_relevance};
