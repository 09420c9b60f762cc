//! Loader for record type declarations written in YAML or JSON

use crate::model::{Schema, TypeDeclaration};
use crate::{Error, Result};
use rec_casts::{CastFn, CastRegistry, list_of};
use rec_value::Value;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

const FIELD_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// Serializable declaration file: an ordered list of types
#[derive(Debug, Deserialize)]
struct DeclarationFile {
    #[serde(default)]
    types: Vec<TypeFile>,
}

#[derive(Debug, Deserialize)]
struct TypeFile {
    name: String,
    #[serde(default)]
    bases: Vec<String>,
    #[serde(default = "default_inherit")]
    inherit: bool,
    #[serde(default)]
    casts: BTreeMap<String, String>,
    #[serde(default)]
    defaults: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    keymap: BTreeMap<String, String>,
}

fn default_inherit() -> bool {
    true
}

/// Turns declaration documents into [`TypeDeclaration`]s, resolving cast
/// names against a [`CastRegistry`].
///
/// A cast spec is either a registered cast name or `list_of(<spec>)`.
pub struct SchemaLoader {
    casts: CastRegistry,
    field_name: Regex,
}

impl SchemaLoader {
    /// Create a loader resolving casts against `casts`
    ///
    /// # Errors
    ///
    /// Returns an error if the field name pattern fails to compile.
    pub fn new(casts: CastRegistry) -> Result<Self> {
        let field_name = Regex::new(FIELD_NAME_PATTERN)
            .map_err(|e| Error::InvalidFormat(format!("Invalid field name pattern: {e}")))?;
        Ok(Self { casts, field_name })
    }

    /// Create a loader using the built-in casts
    ///
    /// # Errors
    ///
    /// Returns an error if the field name pattern fails to compile.
    pub fn with_builtin_casts() -> Result<Self> {
        Self::new(CastRegistry::with_builtins())
    }

    /// Load declarations from a YAML string
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or a declaration is
    /// invalid.
    pub fn load_from_yaml(&self, yaml: &str) -> Result<Vec<TypeDeclaration>> {
        let file: DeclarationFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))?;

        self.convert_file(file)
    }

    /// Load declarations from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or a declaration is
    /// invalid.
    pub fn load_from_json(&self, json: &str) -> Result<Vec<TypeDeclaration>> {
        let file: DeclarationFile = serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))?;

        self.convert_file(file)
    }

    /// Resolve a cast spec to a cast function
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCast`] when the spec names no registered cast.
    pub fn resolve_cast(&self, key: &str, spec: &str) -> Result<CastFn> {
        let spec = spec.trim();
        if let Some(inner) = spec
            .strip_prefix("list_of(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Ok(list_of(self.resolve_cast(key, inner)?));
        }

        self.casts.get(spec).ok_or_else(|| Error::UnknownCast {
            key: key.to_string(),
            spec: spec.to_string(),
        })
    }

    fn convert_file(&self, file: DeclarationFile) -> Result<Vec<TypeDeclaration>> {
        let declarations = file
            .types
            .into_iter()
            .map(|t| self.convert_type(t))
            .collect::<Result<Vec<_>>>()?;

        debug!("Loaded {} record type declarations", declarations.len());
        Ok(declarations)
    }

    fn convert_type(&self, file: TypeFile) -> Result<TypeDeclaration> {
        trace!("Converting declaration for type: {}", file.name);

        let mut schema = Schema::new();
        schema.inherit = file.inherit;

        for (key, spec) in &file.casts {
            schema.casts.insert(key.clone(), self.resolve_cast(key, spec)?);
        }

        for (field, value) in file.defaults {
            self.check_field_name(&field)?;
            schema.defaults.insert(field, Value::from(value));
        }

        for (key, field) in file.keymap {
            self.check_field_name(&field)?;
            schema.keymap.insert(key, field);
        }

        Ok(TypeDeclaration {
            name: file.name,
            bases: file.bases,
            schema,
        })
    }

    fn check_field_name(&self, field: &str) -> Result<()> {
        if self.field_name.is_match(field) {
            Ok(())
        } else {
            Err(Error::InvalidField(field.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_loader() -> SchemaLoader {
        SchemaLoader::with_builtin_casts().unwrap()
    }

    #[test]
    fn test_load_simple_yaml() {
        let loader = create_test_loader();
        let declarations = loader
            .load_from_yaml(
                r"
types:
  - name: Service
    casts:
      running: intbool
    defaults:
      status: unknown
      restarts: 0
    keymap:
      Service-Name: name
",
            )
            .unwrap();

        assert_eq!(declarations.len(), 1);
        let service = &declarations[0];
        assert_eq!(service.name, "Service");
        assert!(service.bases.is_empty());
        assert!(service.schema.inherit);
        assert!(service.schema.cast_for("running").is_some());
        assert_eq!(
            service.schema.default_for("status"),
            Some(&Value::from("unknown"))
        );
        assert_eq!(
            service.schema.default_for("restarts"),
            Some(&Value::Integer(0))
        );
        assert_eq!(service.schema.canonical_key("Service-Name"), "name");
    }

    #[test]
    fn test_load_json() {
        let loader = create_test_loader();
        let declarations = loader
            .load_from_json(
                r#"{"types": [
                    {"name": "Base"},
                    {"name": "Disk", "bases": ["Base"], "inherit": false}
                ]}"#,
            )
            .unwrap();

        assert_eq!(declarations[1].bases, vec!["Base".to_string()]);
        assert!(!declarations[1].schema.inherit);
    }

    #[test]
    fn test_list_of_cast_spec() {
        let loader = create_test_loader();
        let cast = loader.resolve_cast("ports", "list_of(int)").unwrap();
        assert_eq!(
            cast(&Value::List(vec![Value::from("80"), Value::from("443")])).unwrap(),
            Value::List(vec![Value::Integer(80), Value::Integer(443)])
        );
    }

    #[test]
    fn test_unknown_cast() {
        let loader = create_test_loader();
        let error = loader
            .load_from_yaml("types:\n  - name: X\n    casts: {size: bytes}\n")
            .unwrap_err();
        assert_eq!(
            error,
            Error::UnknownCast {
                key: "size".to_string(),
                spec: "bytes".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_keymap_target() {
        let loader = create_test_loader();
        let error = loader
            .load_from_yaml("types:\n  - name: X\n    keymap: {Last-Seen: last-seen}\n")
            .unwrap_err();
        assert_eq!(error, Error::InvalidField("last-seen".to_string()));
    }

    #[test]
    fn test_invalid_yaml() {
        let loader = create_test_loader();
        let error = loader.load_from_yaml("types: [").unwrap_err();
        assert!(matches!(error, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_empty_document() {
        let loader = create_test_loader();
        assert!(loader.load_from_yaml("{}").unwrap().is_empty());
    }
}
