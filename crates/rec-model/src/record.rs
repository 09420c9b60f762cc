//! Record instances

use crate::loader::Sources;
use crate::record_type::RecordType;
use crate::{Error, Result};
use rec_casts::FilterRegistry;
use rec_value::Value;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

const EXISTS_FILTER: &str = "exists";
const MISSING_FILTER: &str = "missing";

/// A live record: stored fields plus the type they were loaded against
#[derive(Debug, Clone)]
pub struct Record {
    record_type: Arc<RecordType>,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Build a record with no data. The post-load hook still runs.
    ///
    /// # Errors
    ///
    /// Returns the post-load hook's error, if any.
    pub fn new(record_type: Arc<RecordType>) -> Result<Self> {
        Self::from_sources(record_type, Sources::new())
    }

    /// Build a record and load `sources` into it
    ///
    /// # Errors
    ///
    /// Returns cast failures and post-load hook errors.
    pub fn from_sources(record_type: Arc<RecordType>, sources: Sources) -> Result<Self> {
        let mut record = Self {
            record_type,
            fields: BTreeMap::new(),
        };
        record.load(sources)?;
        Ok(record)
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn type_name(&self) -> &str {
        self.record_type.name()
    }

    /// Resolve a name: stored field, schema default, then structured names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeNotFound`] carrying `name` when nothing
    /// resolves.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.lookup(name)
            .ok_or_else(|| Error::attribute_not_found(name))
    }

    /// Resolve a name, or return `fallback` when it does not resolve
    pub fn get_or(&self, name: &str, fallback: impl Into<Value>) -> Value {
        self.lookup(name).unwrap_or_else(|| fallback.into())
    }

    /// Whether `name` resolves by any strategy
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Stored value for `name`, bypassing defaults and structured names
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Stored fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Store a value directly
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Remove a stored field. Removing an absent field is not an error.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Store `value` under `name` and hand it back, so later reads hit the
    /// store directly
    pub fn cache(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Value {
        let value = value.into();
        self.fields.insert(name.into(), value.clone());
        value
    }

    /// Return the stored value for `name`, computing and caching it first if
    /// it is not stored yet
    ///
    /// # Errors
    ///
    /// Returns whatever `compute` fails with; nothing is stored in that case.
    pub fn cached(
        &mut self,
        name: &str,
        compute: impl FnOnce(&Record) -> Result<Value>,
    ) -> Result<Value> {
        if let Some(value) = self.fields.get(name) {
            return Ok(value.clone());
        }
        let value = compute(self)?;
        Ok(self.cache(name, value))
    }

    /// Apply a filter to a resolved field.
    ///
    /// The filter ids `exists` and `missing` are reserved: they answer
    /// whether `name` resolves, without consulting the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeNotFound`] when `name` does not resolve,
    /// and unknown-filter or filter failures from the registry.
    pub fn filtered(&self, name: &str, filter: &str, filters: &FilterRegistry) -> Result<Value> {
        match filter {
            EXISTS_FILTER => Ok(Value::Bool(self.contains(name))),
            MISSING_FILTER => Ok(Value::Bool(!self.contains(name))),
            _ => {
                let value = self.get(name)?;
                Ok(filters.apply(filter, &value)?)
            }
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name())?;
        write!(f, "{}", Value::Map(self.fields.clone()))?;
        f.write_str(")")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
