//! Cast and filter registries
//!
//! Provides name -> function tables for casts (applied on load) and
//! filters (applied on read).

use rec_value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type alias for a cast function
pub type CastFn = Arc<dyn Fn(&Value) -> crate::Result<Value> + Send + Sync>;

/// Type alias for a filter function
pub type FilterFn = Arc<dyn Fn(&Value) -> crate::Result<Value> + Send + Sync>;

/// Named table of unary value functions
#[derive(Clone, Default)]
struct FunctionTable {
    functions: HashMap<String, CastFn>,
}

impl FunctionTable {
    fn insert(&mut self, name: String, func: CastFn) {
        self.functions.insert(name, func);
    }

    fn get(&self, name: &str) -> Option<CastFn> {
        self.functions.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Registry of casts available to schema declarations
#[derive(Clone, Default)]
pub struct CastRegistry {
    table: FunctionTable,
}

impl CastRegistry {
    /// Create an empty cast registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in casts
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_casts(&mut registry);
        registry
    }

    /// Register a cast
    pub fn register(
        &mut self,
        name: impl Into<String>,
        func: impl Fn(&Value) -> crate::Result<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.table.insert(name.into(), Arc::new(func));
        self
    }

    /// Register an already shared cast
    pub fn register_shared(&mut self, name: impl Into<String>, func: CastFn) -> &mut Self {
        self.table.insert(name.into(), func);
        self
    }

    /// Get a cast by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CastFn> {
        self.table.get(name)
    }

    /// Get a cast by name, failing when it is not registered
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownCast`] when no cast has that name.
    pub fn require(&self, name: &str) -> crate::Result<CastFn> {
        self.get(name)
            .ok_or_else(|| crate::Error::UnknownCast(name.to_string()))
    }

    /// Check if a cast exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.functions.contains_key(name)
    }

    /// Sorted list of registered cast names
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.table.names()
    }
}

impl fmt::Debug for CastRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastRegistry")
            .field("casts", &self.names())
            .finish()
    }
}

/// Registry of filters the application exposes on read
#[derive(Clone, Default)]
pub struct FilterRegistry {
    table: FunctionTable,
}

impl FilterRegistry {
    /// Create an empty filter registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in filters
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_filters(&mut registry);
        registry
    }

    /// Register a filter
    pub fn register(
        &mut self,
        name: impl Into<String>,
        func: impl Fn(&Value) -> crate::Result<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.table.insert(name.into(), Arc::new(func));
        self
    }

    /// Get a filter by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FilterFn> {
        self.table.get(name)
    }

    /// Apply the named filter to a value
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownFilter`] when no filter has that name, or
    /// whatever error the filter itself raises.
    pub fn apply(&self, name: &str, value: &Value) -> crate::Result<Value> {
        let filter = self
            .get(name)
            .ok_or_else(|| crate::Error::UnknownFilter(name.to_string()))?;
        filter(value)
    }

    /// Check if a filter exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.functions.contains_key(name)
    }

    /// Sorted list of registered filter names
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.table.names()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}
