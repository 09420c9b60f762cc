//! Schema inheritance and composition

use crate::model::Schema;
use std::collections::HashSet;

/// Type -> base edges of the defined types, for ancestry queries
#[derive(Debug, Clone, Default)]
pub struct InheritanceGraph {
    edges: Vec<(String, String)>, // (child, base), in base declaration order
}

impl InheritanceGraph {
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    pub fn add_edge(&mut self, child: impl Into<String>, base: impl Into<String>) {
        self.edges.push((child.into(), base.into()));
    }

    /// Direct bases of a type, in declaration order
    pub fn bases_of(&self, child: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|(c, _)| c == child)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// All ancestors of a type, depth-first and left-to-right, each listed once
    pub fn ancestors(&self, child: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        self.collect_ancestors(child, &mut seen, &mut result);
        result
    }

    fn collect_ancestors(&self, child: &str, seen: &mut HashSet<String>, out: &mut Vec<String>) {
        for base in self.bases_of(child) {
            if seen.insert(base.clone()) {
                out.push(base.clone());
                self.collect_ancestors(&base, seen, out);
            }
        }
    }

    /// Whether `child` is `ancestor` or derives from it
    pub fn is_subtype(&self, child: &str, ancestor: &str) -> bool {
        child == ancestor || self.ancestors(child).iter().any(|a| a == ancestor)
    }
}

/// Flatten a type's schema from its bases' flattened schemas and its own
/// declarations.
///
/// Bases are folded from last to first so that earlier bases overwrite
/// later ones key by key; bases with `inherit == false` contribute
/// nothing. Own declarations are merged last and always win. The result
/// keeps the declaring type's own `inherit` flag.
pub fn compose(bases: &[&Schema], own: &Schema) -> Schema {
    let mut result = Schema::new();

    for base in bases.iter().rev().filter(|base| base.inherit) {
        merge_into(&mut result, base);
    }
    merge_into(&mut result, own);

    result.inherit = own.inherit;
    result
}

fn merge_into(target: &mut Schema, source: &Schema) {
    target.casts.extend(
        source
            .casts
            .iter()
            .map(|(key, cast)| (key.clone(), cast.clone())),
    );
    target.defaults.extend(
        source
            .defaults
            .iter()
            .map(|(field, value)| (field.clone(), value.clone())),
    );
    target.keymap.extend(
        source
            .keymap
            .iter()
            .map(|(key, field)| (key.clone(), field.clone())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rec_value::Value;
    use std::sync::Arc;

    #[test]
    fn test_compose_inherits_defaults() {
        let a = Schema::new().with_default("x", 1);
        let b = compose(&[&a], &Schema::new().with_default("y", 2));

        assert_eq!(b.default_for("x"), Some(&Value::Integer(1)));
        assert_eq!(b.default_for("y"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_own_declarations_win() {
        let base = Schema::new()
            .with_default("status", "unknown")
            .with_alias("Name", "title");
        let own = Schema::new()
            .with_default("status", "stopped")
            .with_alias("Name", "name");

        let merged = compose(&[&base], &own);
        assert_eq!(merged.default_for("status"), Some(&Value::from("stopped")));
        assert_eq!(merged.canonical_key("Name"), "name");
    }

    #[test]
    fn test_first_base_wins() {
        let first = Schema::new().with_default("kind", "first");
        let second = Schema::new()
            .with_default("kind", "second")
            .with_default("only_second", true);

        let merged = compose(&[&first, &second], &Schema::new());
        assert_eq!(merged.default_for("kind"), Some(&Value::from("first")));
        assert_eq!(merged.default_for("only_second"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_non_inheritable_base_is_skipped() {
        let a = Schema::new().with_default("x", 1).without_inheritance();
        let b = compose(&[&a], &Schema::new().with_default("y", 2));
        let c = compose(&[&b], &Schema::new());

        assert!(b.default_for("x").is_none());
        assert!(c.default_for("x").is_none());
        assert_eq!(c.default_for("y"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_redeclared_default_propagates_past_non_inheritable_base() {
        let a = Schema::new().with_default("x", 1).without_inheritance();
        let b = compose(&[&a], &Schema::new().with_default("x", 10));
        let c = compose(&[&b], &Schema::new());

        assert_eq!(c.default_for("x"), Some(&Value::Integer(10)));
    }

    #[test]
    fn test_inherit_flag_is_not_inherited() {
        let a = Schema::new().without_inheritance();
        let b = compose(&[&a], &Schema::new());
        assert!(b.inherit);
    }

    #[test]
    fn test_casts_are_merged() {
        let base = Schema::new().with_cast("pid", Arc::new(rec_casts::builtins::cast_int));
        let merged = compose(&[&base], &Schema::new());

        let cast = merged.cast_for("pid").unwrap();
        assert_eq!(cast(&Value::from("12")).unwrap(), Value::Integer(12));
    }

    #[test]
    fn test_ancestors_depth_first() {
        let mut graph = InheritanceGraph::new();
        graph.add_edge("D", "B");
        graph.add_edge("D", "C");
        graph.add_edge("B", "A");
        graph.add_edge("C", "A");

        assert_eq!(graph.bases_of("D"), vec!["B".to_string(), "C".to_string()]);
        assert_eq!(
            graph.ancestors("D"),
            vec!["B".to_string(), "A".to_string(), "C".to_string()]
        );
        assert!(graph.is_subtype("D", "A"));
        assert!(graph.is_subtype("A", "A"));
        assert!(!graph.is_subtype("A", "D"));
    }
}
