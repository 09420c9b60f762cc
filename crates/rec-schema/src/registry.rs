//! Schema registry with inheritance support

use crate::inheritance::{InheritanceGraph, compose};
use crate::model::{Schema, TypeDeclaration};
use crate::{Error, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Registry of flattened schemas, keyed by type name.
///
/// Schemas are read-only once defined and handed out behind `Arc`.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: DashMap<String, Arc<Schema>>,
    graph: RwLock<InheritanceGraph>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a type: flatten its schema against its (already defined) bases
    /// and register the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already defined, a base is unknown,
    /// or the type names itself as a base.
    pub fn define(&self, declaration: &TypeDeclaration) -> Result<Arc<Schema>> {
        let name = declaration.name.as_str();

        if self.schemas.contains_key(name) {
            return Err(Error::AlreadyDefined(name.to_string()));
        }

        // Bases must already be defined, so naming itself is the only way a
        // type can close a loop.
        if declaration.bases.iter().any(|base| base == name) {
            return Err(Error::Inheritance(format!("{name} cannot be its own base")));
        }

        let bases = declaration
            .bases
            .iter()
            .map(|base| {
                self.get(base).ok_or_else(|| Error::UnknownBase {
                    type_name: name.to_string(),
                    base: base.clone(),
                })
            })
            .collect::<Result<Vec<Arc<Schema>>>>()?;
        let base_refs: Vec<&Schema> = bases.iter().map(|schema| &**schema).collect();

        let schema = Arc::new(compose(&base_refs, &declaration.schema));

        match self.schemas.entry(name.to_string()) {
            Entry::Occupied(_) => return Err(Error::AlreadyDefined(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&schema));
            }
        }

        let mut graph = self.write_graph()?;
        for base in &declaration.bases {
            graph.add_edge(name, base.clone());
        }

        debug!(
            "Flattened schema for {}: {} casts, {} defaults, {} aliases",
            name,
            schema.casts.len(),
            schema.defaults.len(),
            schema.keymap.len()
        );
        info!("Defined record schema: {}", name);

        Ok(schema)
    }

    /// Define every declaration in order
    ///
    /// # Errors
    ///
    /// Stops at the first declaration that cannot be defined.
    pub fn define_all(&self, declarations: &[TypeDeclaration]) -> Result<Vec<Arc<Schema>>> {
        declarations.iter().map(|d| self.define(d)).collect()
    }

    /// Get a flattened schema by type name
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if a type is defined
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Direct bases of a type, in declaration order
    ///
    /// # Errors
    ///
    /// Returns an error if the inheritance graph lock is poisoned.
    pub fn bases_of(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.read_graph()?.bases_of(name))
    }

    /// Whether `name` is `ancestor` or derives from it
    ///
    /// # Errors
    ///
    /// Returns an error if the inheritance graph lock is poisoned.
    pub fn is_subtype(&self, name: &str, ancestor: &str) -> Result<bool> {
        Ok(self.read_graph()?.is_subtype(name, ancestor))
    }

    /// Sorted list of defined type names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn read_graph(&self) -> Result<std::sync::RwLockReadGuard<'_, InheritanceGraph>> {
        self.graph
            .read()
            .map_err(|_| Error::Inheritance("Failed to lock inheritance graph".to_string()))
    }

    fn write_graph(&self) -> Result<std::sync::RwLockWriteGuard<'_, InheritanceGraph>> {
        self.graph
            .write()
            .map_err(|_| Error::Inheritance("Failed to lock inheritance graph".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rec_value::Value;

    #[test]
    fn test_define_and_get() {
        let registry = SchemaRegistry::new();
        let declaration = TypeDeclaration::new("Service")
            .with_schema(Schema::new().with_default("status", "unknown"));

        registry.define(&declaration).unwrap();

        assert!(registry.contains("Service"));
        assert_eq!(registry.len(), 1);
        let schema = registry.get("Service").unwrap();
        assert_eq!(schema.default_for("status"), Some(&Value::from("unknown")));
    }

    #[test]
    fn test_define_flattens_bases() {
        let registry = SchemaRegistry::new();
        registry
            .define_all(&[
                TypeDeclaration::new("A").with_schema(Schema::new().with_default("x", 1)),
                TypeDeclaration::new("B")
                    .with_base("A")
                    .with_schema(Schema::new().with_default("y", 2)),
                TypeDeclaration::new("C").with_base("B"),
            ])
            .unwrap();

        let c = registry.get("C").unwrap();
        assert_eq!(c.default_for("x"), Some(&Value::Integer(1)));
        assert_eq!(c.default_for("y"), Some(&Value::Integer(2)));
        assert_eq!(registry.bases_of("C").unwrap(), vec!["B".to_string()]);
        assert!(registry.is_subtype("C", "A").unwrap());
    }

    #[test]
    fn test_unknown_base() {
        let registry = SchemaRegistry::new();
        let error = registry
            .define(&TypeDeclaration::new("B").with_base("A"))
            .unwrap_err();
        assert_eq!(
            error,
            Error::UnknownBase {
                type_name: "B".to_string(),
                base: "A".to_string(),
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_definition() {
        let registry = SchemaRegistry::new();
        registry.define(&TypeDeclaration::new("A")).unwrap();
        let error = registry.define(&TypeDeclaration::new("A")).unwrap_err();
        assert_eq!(error, Error::AlreadyDefined("A".to_string()));
    }

    #[test]
    fn test_self_inheritance_rejected() {
        let registry = SchemaRegistry::new();
        let error = registry
            .define(&TypeDeclaration::new("A").with_base("A"))
            .unwrap_err();
        assert_eq!(
            error,
            Error::Inheritance("A cannot be its own base".to_string())
        );
        assert!(!registry.contains("A"));
    }

    #[test]
    fn test_names_sorted() {
        let registry = SchemaRegistry::new();
        registry.define(&TypeDeclaration::new("Zone")).unwrap();
        registry.define(&TypeDeclaration::new("Alias")).unwrap();
        assert_eq!(registry.names(), vec!["Alias".to_string(), "Zone".to_string()]);
    }
}
