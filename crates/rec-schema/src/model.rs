//! Schema model definitions

use rec_casts::CastFn;
use rec_value::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Casts, defaults and key aliases for one record type.
///
/// The same structure holds a type's own declarations (before composition)
/// and its flattened schema (after composition).
#[derive(Clone)]
pub struct Schema {
    /// Raw key -> cast applied on load
    pub casts: HashMap<String, CastFn>,

    /// Field name -> value returned when the field is absent
    pub defaults: BTreeMap<String, Value>,

    /// Raw key alias -> canonical field name
    pub keymap: HashMap<String, String>,

    /// Whether subtypes receive this schema
    pub inherit: bool,
}

impl Schema {
    /// Create an empty, inheritable schema
    pub fn new() -> Self {
        Self {
            casts: HashMap::new(),
            defaults: BTreeMap::new(),
            keymap: HashMap::new(),
            inherit: true,
        }
    }

    /// Declare a cast for a raw key
    #[must_use]
    pub fn with_cast(mut self, key: impl Into<String>, cast: CastFn) -> Self {
        self.casts.insert(key.into(), cast);
        self
    }

    /// Declare a default for a field
    #[must_use]
    pub fn with_default(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(field.into(), value.into());
        self
    }

    /// Declare an alias mapping a raw key to a canonical field name
    #[must_use]
    pub fn with_alias(mut self, key: impl Into<String>, field: impl Into<String>) -> Self {
        self.keymap.insert(key.into(), field.into());
        self
    }

    /// Stop this schema from propagating to subtypes
    #[must_use]
    pub fn without_inheritance(mut self) -> Self {
        self.inherit = false;
        self
    }

    /// Cast registered for a raw key
    pub fn cast_for(&self, key: &str) -> Option<&CastFn> {
        self.casts.get(key)
    }

    /// Default declared for a field
    pub fn default_for(&self, field: &str) -> Option<&Value> {
        self.defaults.get(field)
    }

    /// Canonical field name for a raw key: its alias if one is declared,
    /// otherwise the key with every `-` replaced by `_`.
    pub fn canonical_key(&self, key: &str) -> String {
        match self.keymap.get(key) {
            Some(field) if !field.is_empty() => field.clone(),
            _ => key.replace('-', "_"),
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut casts: Vec<&String> = self.casts.keys().collect();
        casts.sort();
        f.debug_struct("Schema")
            .field("casts", &casts)
            .field("defaults", &self.defaults)
            .field("keymap", &self.keymap)
            .field("inherit", &self.inherit)
            .finish()
    }
}

/// A record type as declared: its name, its bases in declaration order,
/// and its own (not yet flattened) schema.
#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    pub name: String,
    pub bases: Vec<String>,
    pub schema: Schema,
}

impl TypeDeclaration {
    /// Create a declaration with no bases and an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            schema: Schema::new(),
        }
    }

    /// Add a base type
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    /// Replace the declared schema
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }
}
