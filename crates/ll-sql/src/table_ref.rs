//! Strongly-typed normalized table reference.

use crate::normalize::normalize_table_name;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Schema assumed when a reference carries no schema qualifier.
pub const DEFAULT_SCHEMA: &str = "public";

/// A normalized table reference keyed by its canonical text
/// (`sales.orders` or bare `users`).
///
/// Identity is the normalized key: `users` and `public.users` are distinct
/// references even though both resolve to the `public` schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableRef(String);

impl TableRef {
    /// Create a `TableRef` from an already-normalized key, panicking in debug
    /// builds if the key is empty.
    ///
    /// Prefer [`from_raw`](Self::from_raw) for text pulled out of SQL.
    pub fn new(key: impl Into<String>) -> Self {
        let s = key.into();
        debug_assert!(!s.is_empty(), "TableRef must not be empty");
        Self(s)
    }

    /// Normalize raw SQL text into a reference, returning `None` when nothing
    /// usable remains.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let key = normalize_table_name(raw);
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// The normalized key.
    pub fn key(&self) -> &str {
        &self.0
    }

    /// Schema part, defaulting to [`DEFAULT_SCHEMA`].
    pub fn schema(&self) -> &str {
        match self.0.split_once('.') {
            Some((schema, _)) => schema,
            None => DEFAULT_SCHEMA,
        }
    }

    /// Table name without schema (the display name).
    pub fn name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// `schema.name`, with the default schema filled in.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema(), self.name())
    }

    /// Whether the source text named a schema explicitly.
    pub fn is_qualified(&self) -> bool {
        self.0.contains('.')
    }

    /// Consume the wrapper and return the inner key.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TableRef {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TableRef {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TableRef {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TableRef {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_normalizes() {
        let t = TableRef::from_raw("\"Users\" u").unwrap();
        assert_eq!(t.key(), "users");
    }

    #[test]
    fn test_from_raw_rejects_empty() {
        assert!(TableRef::from_raw("").is_none());
        assert!(TableRef::from_raw("''").is_none());
    }

    #[test]
    fn test_default_schema() {
        let t = TableRef::new("users");
        assert_eq!(t.schema(), "public");
        assert_eq!(t.name(), "users");
        assert_eq!(t.qualified(), "public.users");
        assert!(!t.is_qualified());
    }

    #[test]
    fn test_explicit_schema() {
        let t = TableRef::new("sales.orders");
        assert_eq!(t.schema(), "sales");
        assert_eq!(t.name(), "orders");
        assert_eq!(t.qualified(), "sales.orders");
        assert!(t.is_qualified());
    }

    #[test]
    fn test_identity_is_key() {
        assert_ne!(TableRef::new("users"), TableRef::new("public.users"));
        assert_eq!(TableRef::new("users"), "users");
    }

    #[test]
    fn test_borrow_lookup() {
        use std::collections::HashMap;
        let mut map: HashMap<TableRef, i32> = HashMap::new();
        map.insert(TableRef::new("orders"), 7);
        assert_eq!(map.get("orders"), Some(&7));
    }

    #[test]
    fn test_serde_transparent() {
        let t = TableRef::new("sales.orders");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#""sales.orders""#);
        let back: TableRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
