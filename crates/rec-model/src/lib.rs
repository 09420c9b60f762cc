//! # rec-model
//!
//! Schema-driven semi-structured records.
//!
//! A [`Record`] is an open-ended bag of named, coerced field values tied to
//! a [`RecordType`]. Types are defined once through a [`Catalog`], which
//! flattens their schemas against their bases and keeps one canonical
//! empty instance per type. Reading a field that is not stored goes through
//! the resolver: schema defaults, `a__b` fallback chains and
//! `is_<field>_<value>` predicates.
//!
//! ```text
//! Catalog::define   ← once per type: compose schema, bootstrap EMPTY
//!     │
//! Record::load      ← per build/update: keymap, casts, post-load hook
//!     │
//! Record::get       ← per read: store, defaults, structured names
//! ```

pub mod catalog;
pub mod loader;
pub mod record;
pub mod record_type;
pub mod resolver;

pub use catalog::{Catalog, TypeDefinition};
pub use loader::Sources;
pub use record::Record;
pub use record_type::{LoadHook, RecordType};
pub use resolver::NamePattern;

pub use rec_casts::{CastRegistry, FilterRegistry};
pub use rec_schema::{Schema, SchemaLoader, TypeDeclaration};
pub use rec_value::Value;

use thiserror::Error;

/// Errors that can occur when building or reading records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No resolution strategy produced a value for the requested name
    #[error("No such attribute: {name}")]
    AttributeNotFound { name: String },

    #[error("Unknown record type: {0}")]
    UnknownType(String),

    #[error(transparent)]
    Cast(#[from] rec_casts::Error),

    #[error(transparent)]
    Schema(#[from] rec_schema::Error),

    #[error("Post-load hook for {type_name} failed: {message}")]
    Hook { type_name: String, message: String },
}

impl Error {
    /// Build an attribute-not-found error for the requested name.
    pub fn attribute_not_found(name: impl Into<String>) -> Self {
        Self::AttributeNotFound { name: name.into() }
    }

    /// Build a hook failure for the given record type.
    pub fn hook(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hook {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
