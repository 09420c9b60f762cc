//! Attribute resolution
//!
//! A read that misses the field store falls through, in order, to:
//!
//! 1. the schema default for the name;
//! 2. a fallback chain: `a__b__c` resolves to the first of `a`, `b`, `c`
//!    that resolves;
//! 3. a predicate: `is_<field>_<value>` is true when the text form of
//!    `field` equals `value` (the last `_`-separated token); `isnt_` negates.
//!
//! Anything else fails with the requested name. Resolution never mutates
//! the record and never runs casts or filters.

use crate::record::Record;
use rec_value::Value;
use tracing::trace;

const ALTERNATIVE_SEPARATOR: &str = "__";
const IS_PREFIX: &str = "is_";
const ISNT_PREFIX: &str = "isnt_";

/// Parsed shape of a requested attribute name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern<'a> {
    /// Plain name, resolvable only from the store or the defaults
    Field(&'a str),

    /// `a__b__c`: alternatives tried in order
    Alternatives(Vec<&'a str>),

    /// `is_<field>_<value>` or, when negated, `isnt_<field>_<value>`
    Predicate {
        field: &'a str,
        expected: &'a str,
        negated: bool,
    },
}

impl<'a> NamePattern<'a> {
    /// Parse a requested name.
    ///
    /// The separator takes precedence: `is_a_b__c` is a fallback chain whose
    /// first alternative happens to be a predicate.
    pub fn parse(name: &'a str) -> Self {
        if name.contains(ALTERNATIVE_SEPARATOR) {
            return NamePattern::Alternatives(name.split(ALTERNATIVE_SEPARATOR).collect());
        }

        if let Some(rest) = name.strip_prefix(ISNT_PREFIX) {
            if let Some(predicate) = Self::predicate(rest, true) {
                return predicate;
            }
        } else if let Some(rest) = name.strip_prefix(IS_PREFIX) {
            if let Some(predicate) = Self::predicate(rest, false) {
                return predicate;
            }
        }

        NamePattern::Field(name)
    }

    fn predicate(rest: &'a str, negated: bool) -> Option<Self> {
        match rest.rsplit_once('_') {
            Some((field, expected)) if !field.is_empty() => Some(NamePattern::Predicate {
                field,
                expected,
                negated,
            }),
            _ => None,
        }
    }
}

impl Record {
    /// Resolve a name without failing: `None` when nothing matches.
    pub(crate) fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.field(name) {
            return Some(value.clone());
        }

        if let Some(value) = self.record_type().schema().default_for(name) {
            return Some(value.clone());
        }

        match NamePattern::parse(name) {
            NamePattern::Field(_) => None,
            NamePattern::Alternatives(names) => names.into_iter().find_map(|alternative| {
                trace!("Trying alternative {} for {}", alternative, name);
                self.lookup(alternative)
            }),
            NamePattern::Predicate {
                field,
                expected,
                negated,
            } => {
                let value = self.lookup(field)?;
                let matches = value.as_text().as_deref() == Some(expected);
                Some(Value::Bool(matches != negated))
            }
        }
    }
}
