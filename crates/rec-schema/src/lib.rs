//! # rec-schema
//!
//! Schema model, composition, and declaration loading for records.
//!
//! A schema is the per-type configuration of casts, defaults and key
//! aliases. Schemas are flattened when a type is defined: each type's
//! schema already holds everything inherited from its bases, so lookups
//! never walk the inheritance chain.

pub mod inheritance;
pub mod loader;
pub mod model;
pub mod registry;

pub use inheritance::{InheritanceGraph, compose};
pub use loader::SchemaLoader;
pub use model::{Schema, TypeDeclaration};
pub use registry::SchemaRegistry;

use thiserror::Error;

/// Errors that can occur when defining or loading schemas
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Type '{type_name}' names unknown base '{base}'")]
    UnknownBase { type_name: String, base: String },

    #[error("Type already defined: {0}")]
    AlreadyDefined(String),

    #[error("Inheritance error: {0}")]
    Inheritance(String),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Unknown cast '{spec}' declared for key '{key}'")]
    UnknownCast { key: String, spec: String },

    #[error("Invalid field name: {0}")]
    InvalidField(String),
}

pub type Result<T> = std::result::Result<T, Error>;
