//! # rec-casts
//!
//! Cast and filter registries, plus the built-in casts.
//!
//! A cast turns a raw loaded value into its stored, typed value. A filter
//! turns a stored value into a display or derived value on read. Both are
//! unary functions over [`rec_value::Value`] looked up by name.

pub mod builtins;
pub mod registry;

pub use builtins::{constant, list_of, sorted_by};
pub use registry::{CastFn, CastRegistry, FilterFn, FilterRegistry};

use thiserror::Error;

/// Errors raised by casts, filters and registry lookups
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Cast '{cast}' failed: {message}")]
    Cast { cast: String, message: String },

    #[error("Unknown cast: {0}")]
    UnknownCast(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}

impl Error {
    /// Build a cast failure naming the cast that rejected its input.
    pub fn cast(cast: impl Into<String>, message: impl ToString) -> Self {
        Self::Cast {
            cast: cast.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
