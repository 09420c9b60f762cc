//! Record type catalog
//!
//! Defining a type composes its schema once, registers it, and tries to
//! build the type's canonical empty instance. The empty instance is a
//! convenience sentinel: when building it fails (typically because the
//! post-load hook needs data), the failure is logged and the type simply
//! has none.

use crate::loader::Sources;
use crate::record::Record;
use crate::record_type::{LoadHook, RecordType};
use crate::{Error, Result};
use dashmap::DashMap;
use rec_schema::{Schema, SchemaLoader, SchemaRegistry, TypeDeclaration};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

static GLOBAL: LazyLock<Catalog> = LazyLock::new(Catalog::new);

/// A type to define: its declaration plus an optional post-load hook.
///
/// A type without its own hook uses the hook of its first base that has
/// one.
#[derive(Clone)]
pub struct TypeDefinition {
    declaration: TypeDeclaration,
    on_load: Option<LoadHook>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from(TypeDeclaration::new(name))
    }

    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.declaration.bases.push(base.into());
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.declaration.schema = schema;
        self
    }

    /// Set the post-load hook
    #[must_use]
    pub fn on_load(
        mut self,
        hook: impl Fn(&mut Record) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_load = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.declaration.name
    }
}

impl From<TypeDeclaration> for TypeDefinition {
    fn from(declaration: TypeDeclaration) -> Self {
        Self {
            declaration,
            on_load: None,
        }
    }
}

/// Registry of defined record types and their canonical empty instances
#[derive(Debug, Default)]
pub struct Catalog {
    schemas: SchemaRegistry,
    types: DashMap<String, Arc<RecordType>>,
    empties: DashMap<String, Arc<Record>>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide catalog
    pub fn global() -> &'static Catalog {
        &GLOBAL
    }

    /// Define a record type.
    ///
    /// # Errors
    ///
    /// Returns schema errors: duplicate names, unknown bases,
    /// self-inheritance. Failing to build the empty instance is not an
    /// error.
    pub fn define(&self, definition: impl Into<TypeDefinition>) -> Result<Arc<RecordType>> {
        let TypeDefinition {
            declaration,
            on_load,
        } = definition.into();

        let schema = self.schemas.define(&declaration)?;
        let on_load = on_load.or_else(|| self.inherited_hook(&declaration.bases));

        let record_type = Arc::new(RecordType::new(
            declaration.name.clone(),
            declaration.bases,
            schema,
            on_load,
        ));
        self.types.insert(declaration.name.clone(), Arc::clone(&record_type));

        match Record::new(Arc::clone(&record_type)) {
            Ok(empty) => {
                self.empties.insert(declaration.name.clone(), Arc::new(empty));
            }
            Err(error) => {
                debug!("No empty instance for {}: {}", declaration.name, error);
            }
        }

        info!("Defined record type: {}", declaration.name);
        Ok(record_type)
    }

    /// Define every declaration in order
    ///
    /// # Errors
    ///
    /// Stops at the first declaration that cannot be defined.
    pub fn define_all(
        &self,
        declarations: impl IntoIterator<Item = TypeDeclaration>,
    ) -> Result<Vec<Arc<RecordType>>> {
        declarations
            .into_iter()
            .map(|declaration| self.define(declaration))
            .collect()
    }

    /// Load declarations from YAML and define them in order
    ///
    /// # Errors
    ///
    /// Returns loader errors and definition errors.
    pub fn define_from_yaml(
        &self,
        loader: &SchemaLoader,
        yaml: &str,
    ) -> Result<Vec<Arc<RecordType>>> {
        self.define_all(loader.load_from_yaml(yaml)?)
    }

    /// Get a defined type by name
    pub fn get(&self, name: &str) -> Option<Arc<RecordType>> {
        self.types.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Canonical empty instance of a type; absent when the type is unknown
    /// or its no-data construction failed
    pub fn empty(&self, name: &str) -> Option<Arc<Record>> {
        self.empties.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Build a record of the named type
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for undefined types, plus load errors.
    pub fn create(&self, name: &str, sources: Sources) -> Result<Record> {
        let record_type = self
            .get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))?;
        Record::from_sources(record_type, sources)
    }

    /// Whether `name` is `ancestor` or derives from it
    ///
    /// # Errors
    ///
    /// Returns an error if the inheritance graph lock is poisoned.
    pub fn is_subtype(&self, name: &str, ancestor: &str) -> Result<bool> {
        Ok(self.schemas.is_subtype(name, ancestor)?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Sorted list of defined type names
    pub fn names(&self) -> Vec<String> {
        self.schemas.names()
    }

    fn inherited_hook(&self, bases: &[String]) -> Option<LoadHook> {
        bases
            .iter()
            .filter_map(|base| self.get(base))
            .find_map(|base| base.on_load().cloned())
    }
}
