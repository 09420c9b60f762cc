//! Loading raw key/value data into records

use crate::record::Record;
use rec_value::Value;
use std::sync::Arc;
use tracing::trace;

/// Input for [`Record::load`]: positional sources plus named values.
///
/// Positional sources are merged in the order they were added; named values
/// form one extra source merged last, so they win over every positional
/// source.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    positional: Vec<Vec<(String, Value)>>,
    named: Vec<(String, Value)>,
}

impl Sources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional source: a map or any iterable of key/value pairs
    #[must_use]
    pub fn source<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.positional.push(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Add a positional source from a JSON object
    #[must_use]
    pub fn json(self, object: serde_json::Map<String, serde_json::Value>) -> Self {
        self.source(object)
    }

    /// Add a named value
    #[must_use]
    pub fn named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((key.into(), value.into()));
        self
    }

    /// Whether no source and no named value was supplied
    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.iter().all(Vec::is_empty)
    }

    fn into_pairs(self) -> impl Iterator<Item = (String, Value)> {
        self.positional.into_iter().flatten().chain(self.named)
    }
}

impl Record {
    /// Merge sources into the field store, then run the post-load hook.
    ///
    /// Each raw key is stored under its canonical name (its alias, or the
    /// key with `-` replaced by `_`). If the raw key has a cast and the value
    /// is not `Null`, the cast's result is stored; `Null` is stored as is.
    /// The last writer of a canonical name wins. The hook runs exactly once,
    /// after merging, even when there was nothing to merge.
    ///
    /// # Errors
    ///
    /// Returns the first cast failure (fields merged before it stay
    /// merged and the hook does not run), or the hook's own error.
    pub fn load(&mut self, sources: Sources) -> crate::Result<()> {
        let schema = Arc::clone(self.record_type().schema());

        for (key, value) in sources.into_pairs() {
            let field = schema.canonical_key(&key);
            let stored = match schema.cast_for(&key) {
                Some(cast) if !value.is_null() => cast(&value)?,
                _ => value,
            };
            trace!("Loaded {} -> {} on {}", key, field, self.type_name());
            self.set(field, stored);
        }

        self.run_load_hook()
    }

    /// Merge already canonical fields straight into the store.
    ///
    /// No aliases, casts or hook are applied.
    pub fn update<I, K, V>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in items {
            self.set(key, value);
        }
    }

    fn run_load_hook(&mut self) -> crate::Result<()> {
        match self.record_type().on_load().cloned() {
            Some(hook) => hook(self),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_type::RecordType;
    use rec_casts::builtins::{cast_int, cast_intbool};
    use rec_schema::Schema;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn process_type() -> Arc<RecordType> {
        RecordType::standalone(
            "Process",
            Schema::new()
                .with_cast("pid", Arc::new(cast_int))
                .with_cast("Is-Running", Arc::new(cast_intbool))
                .with_alias("Is-Running", "running")
                .with_alias("Command", "cmd"),
        )
    }

    #[test]
    fn test_keymap_and_dash_normalization() {
        let record = Record::from_sources(
            process_type(),
            Sources::new().source([("Command", "nginx"), ("start-time", "09:00")]),
        )
        .unwrap();

        assert_eq!(record.field("cmd"), Some(&Value::from("nginx")));
        assert_eq!(record.field("start_time"), Some(&Value::from("09:00")));
        assert!(record.field("Command").is_none());
        assert!(record.field("start-time").is_none());
    }

    #[test]
    fn test_cast_uses_raw_key() {
        let record = Record::from_sources(
            process_type(),
            Sources::new().source([("Is-Running", "1"), ("pid", "42")]),
        )
        .unwrap();

        assert_eq!(record.field("running"), Some(&Value::Bool(true)));
        assert_eq!(record.field("pid"), Some(&Value::Integer(42)));
    }

    #[test]
    fn test_null_skips_cast() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let record_type = RecordType::standalone(
            "Counted",
            Schema::new().with_cast(
                "pid",
                Arc::new(move |value: &Value| -> rec_casts::Result<Value> {
                    counter.fetch_add(1, Ordering::SeqCst);
                    cast_int(value)
                }),
            ),
        );

        let record =
            Record::from_sources(record_type, Sources::new().named("pid", Value::Null)).unwrap();

        assert_eq!(record.field("pid"), Some(&Value::Null));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_last_source_wins() {
        let record = Record::from_sources(
            process_type(),
            Sources::new().source([("a", 1)]).source([("a", 2)]),
        )
        .unwrap();
        assert_eq!(record.field("a"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_named_values_win_over_positional() {
        let sources = Sources::new()
            .named("a", 3)
            .source([("a", 1)])
            .source([("a", 2)]);
        let record = Record::from_sources(process_type(), sources).unwrap();
        assert_eq!(record.field("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_alias_and_plain_key_last_writer_wins() {
        let record = Record::from_sources(
            process_type(),
            Sources::new().source([("cmd", "old"), ("Command", "new")]),
        )
        .unwrap();
        assert_eq!(record.field("cmd"), Some(&Value::from("new")));
    }

    #[test]
    fn test_map_and_json_sources() {
        let mut map = BTreeMap::new();
        map.insert("user".to_string(), Value::from("www-data"));

        let serde_json::Value::Object(object) = serde_json::json!({"pid": "7", "user": "root"})
        else {
            panic!("expected an object");
        };

        let record =
            Record::from_sources(process_type(), Sources::new().source(map).json(object)).unwrap();

        assert_eq!(record.field("user"), Some(&Value::from("root")));
        assert_eq!(record.field("pid"), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_cast_failure_propagates() {
        let error = Record::from_sources(process_type(), Sources::new().named("pid", "abc"))
            .unwrap_err();
        assert!(matches!(
            error,
            crate::Error::Cast(rec_casts::Error::Cast { ref cast, .. }) if cast == "int"
        ));
    }

    #[test]
    fn test_update_skips_keymap_and_casts() {
        let mut record = Record::new(process_type()).unwrap();
        record.update([("Command", "raw"), ("pid", "not-a-number")]);

        assert_eq!(record.field("Command"), Some(&Value::from("raw")));
        assert_eq!(record.field("pid"), Some(&Value::from("not-a-number")));
        assert!(record.field("cmd").is_none());
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut once = Record::new(process_type()).unwrap();
        once.update([("a", 1), ("b", 2)]);

        let mut twice = Record::new(process_type()).unwrap();
        twice.update([("a", 1), ("b", 2)]);
        twice.update([("a", 1), ("b", 2)]);

        let once_fields: Vec<_> = once.fields().collect();
        let twice_fields: Vec<_> = twice.fields().collect();
        assert_eq!(once_fields, twice_fields);
    }

    #[test]
    fn test_sources_is_empty() {
        assert!(Sources::new().is_empty());
        assert!(Sources::new().source(Vec::<(String, Value)>::new()).is_empty());
        assert!(!Sources::new().named("a", 1).is_empty());
    }
}
