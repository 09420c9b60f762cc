//! Defined record types

use crate::record::Record;
use rec_schema::Schema;
use std::fmt;
use std::sync::Arc;

/// Post-load hook: runs once after every load, to derive extra fields.
pub type LoadHook = Arc<dyn Fn(&mut Record) -> crate::Result<()> + Send + Sync>;

/// A record type as defined in a [`crate::Catalog`]: its name, its direct
/// bases, its flattened schema and its post-load hook.
#[derive(Clone)]
pub struct RecordType {
    name: String,
    bases: Vec<String>,
    schema: Arc<Schema>,
    on_load: Option<LoadHook>,
}

impl RecordType {
    pub(crate) fn new(
        name: impl Into<String>,
        bases: Vec<String>,
        schema: Arc<Schema>,
        on_load: Option<LoadHook>,
    ) -> Self {
        Self {
            name: name.into(),
            bases,
            schema,
            on_load,
        }
    }

    /// Build a free-standing type outside any catalog.
    ///
    /// The schema is used as given, so it should already be flattened.
    /// No canonical empty instance is created for such types.
    pub fn standalone(name: impl Into<String>, schema: Schema) -> Arc<Self> {
        Arc::new(Self::new(name, Vec::new(), Arc::new(schema), None))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases in declaration order
    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    /// Flattened schema
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub(crate) fn on_load(&self) -> Option<&LoadHook> {
        self.on_load.as_ref()
    }

    pub fn has_load_hook(&self) -> bool {
        self.on_load.is_some()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("bases", &self.bases)
            .field("schema", &self.schema)
            .field("has_load_hook", &self.on_load.is_some())
            .finish()
    }
}
