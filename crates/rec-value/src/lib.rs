#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # rec-value
//!
//! Dynamic values stored in record fields.
//!
//! Every field of a record, every schema default and the input and output of
//! every cast or filter is a [`Value`]. Records are open-ended bags of fields,
//! so the value type is a closed enum rather than a generic parameter.

/// Value enum, text form and conversions.
pub mod value;

/// Primary dynamic value type.
pub use value::Value;

use thiserror::Error;

/// Errors that can occur when converting values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Conversion error in {context}: {message}")]
    Conversion { context: String, message: String },
}

impl Error {
    /// Build a conversion error with conversion context.
    pub fn conversion(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Crate-local result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;
