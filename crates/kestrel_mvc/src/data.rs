//! # Model Data Bag
//!
//! String-keyed values held by a model. Values are TOML values, so a bag can
//! be seeded straight from a config table and read back as typed data.

use crate::error::DataError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use toml::{Table, Value};

/// Interior-mutable key/value store embedded in a model.
///
/// Hooks only get `&self`, so writes go through a `RefCell`. No borrow is
/// held across calls, so reading and writing from nested hooks is fine.
///
/// # Example
///
/// ```rust
/// use kestrel_mvc::DataBag;
///
/// let bag = DataBag::new();
/// bag.set("count", 3_i64).unwrap();
/// assert_eq!(bag.get::<i64>("count"), Some(3));
/// assert_eq!(bag.get::<String>("count"), None);
/// ```
#[derive(Debug, Default)]
pub struct DataBag {
    values: RefCell<Table>,
}

impl DataBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies every top-level key of `table` into the bag, overwriting
    /// existing keys. Nested tables are moved in whole, not merged.
    pub fn merge(&self, table: Table) {
        self.values.borrow_mut().extend(table);
    }

    /// Reads `key` as a `T`. Missing keys and type mismatches yield `None`.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_value(key)?.try_into().ok()
    }

    /// Returns a copy of the raw value under `key`.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    /// Stores `value` under `key`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Unrepresentable`] if `value` has no TOML
    /// representation (for example a bare `None`).
    pub fn set<T: Serialize>(&self, key: &str, value: T) -> Result<Option<Value>, DataError> {
        let value = Value::try_from(value).map_err(|source| DataError::Unrepresentable {
            key: key.to_string(),
            source,
        })?;
        Ok(self.values.borrow_mut().insert(key.to_string(), value))
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.borrow_mut().remove(key)
    }

    /// Checks if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Checks if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// Returns a copy of every key and value.
    #[must_use]
    pub fn snapshot(&self) -> Table {
        self.values.borrow().clone()
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_shallow() {
        let bag = DataBag::new();
        bag.merge(toml::from_str("count = 1\nnested = { a = 1, b = 2 }").unwrap());
        bag.merge(toml::from_str("nested = { c = 3 }").unwrap());

        assert_eq!(bag.get::<i64>("count"), Some(1));
        let nested = bag.get_value("nested").unwrap();
        let nested = nested.as_table().unwrap();
        assert_eq!(nested.len(), 1);
        assert!(nested.contains_key("c"));
    }

    #[test]
    fn test_set_returns_previous() {
        let bag = DataBag::new();
        assert_eq!(bag.set("name", "kestrel").unwrap(), None);
        let previous = bag.set("name", "falcon").unwrap();
        assert_eq!(previous.and_then(|v| v.as_str().map(str::to_owned)).as_deref(), Some("kestrel"));
        assert_eq!(bag.get::<String>("name").as_deref(), Some("falcon"));
    }

    #[test]
    fn test_typed_structs() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Size {
            width: u32,
            height: u32,
        }

        let bag = DataBag::new();
        bag.set("size", Size { width: 800, height: 600 }).unwrap();
        assert_eq!(bag.get::<Size>("size"), Some(Size { width: 800, height: 600 }));
    }

    #[test]
    fn test_unrepresentable_value() {
        let bag = DataBag::new();
        let err = bag.set("nothing", Option::<i64>::None).unwrap_err();
        assert!(matches!(err, DataError::Unrepresentable { ref key, .. } if key == "nothing"));
        assert!(bag.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let bag = DataBag::new();
        bag.set("a", 1_i64).unwrap();
        bag.set("b", 2_i64).unwrap();
        assert!(bag.remove("a").is_some());
        assert!(!bag.contains("a"));
        assert_eq!(bag.len(), 1);
        bag.clear();
        assert!(bag.is_empty());
    }
}
