// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Dynamic record values with shared object identity.
//!
//! JSON objects become [`SharedObject`]s (`Rc<RefCell<Object>>`), so a record or a nested
//! object can be held by several owners (graph snapshot, layout engine) and mutated in place.
//! Two handles refer to the same object iff `Rc::ptr_eq` holds. Scalars and arrays are plain
//! values and are always replaced wholesale.
//!
//! Values built from JSON are acyclic; the reconcilers rely on that.

use std::cell::RefCell;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Number;

pub type SharedObject = Rc<RefCell<Object>>;

pub fn shared(object: Object) -> SharedObject {
    Rc::new(RefCell::new(object))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(SharedObject),
}

impl Value {
    /// Non-finite numbers have no JSON representation and become `Null`.
    pub fn from_f64(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }

    /// Builds a fresh value tree; every JSON object gets a new identity.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(*value),
            serde_json::Value::Number(value) => Self::Number(value.clone()),
            serde_json::Value::String(value) => Self::String(value.clone()),
            serde_json::Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            serde_json::Value::Object(map) => Self::Object(shared(Object::from_json(map))),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(value) => serde_json::Value::Bool(*value),
            Self::Number(value) => serde_json::Value::Number(value.clone()),
            Self::String(value) => serde_json::Value::String(value.clone()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(object) => serde_json::Value::Object(object.borrow().to_json()),
        }
    }

    /// Copies the whole tree, allocating new identities for every nested object.
    pub fn deep_copy(&self) -> Self {
        match self {
            Self::Array(items) => Self::Array(items.iter().map(Self::deep_copy).collect()),
            Self::Object(object) => Self::Object(deep_copy(object)),
            other => other.clone(),
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_object(&self) -> Option<&SharedObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => number.as_f64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(number) => number.as_u64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        Self::from_json(value)
    }
}

/// The field map of a record or nested object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: map.iter().map(|(key, value)| (key.clone(), Value::from_json(value))).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.fields.iter().map(|(key, value)| (key.clone(), value.to_json())).collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(key, value)| (key.into(), value)).collect(),
        }
    }
}

pub fn deep_copy(object: &SharedObject) -> SharedObject {
    let source = object.borrow();
    shared(Object {
        fields: source.fields.iter().map(|(key, value)| (key.clone(), value.deep_copy())).collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;

    use super::{deep_copy, Value};

    #[test]
    fn json_round_trip_keeps_nested_structure() {
        let source = json!({"id": 1, "style": {"color": "red"}, "tags": [1, {"a": true}]});
        let value = Value::from_json(&source);
        assert_eq!(value.to_json(), source);
    }

    #[test]
    fn deep_copy_allocates_new_nested_identities() {
        let value = Value::from_json(&json!({"style": {"color": "red"}}));
        let original = value.as_object().expect("object").clone();
        let copy = deep_copy(&original);

        assert!(!Rc::ptr_eq(&original, &copy));
        let original_style = original.borrow().get("style").and_then(Value::as_object).cloned();
        let copied_style = copy.borrow().get("style").and_then(Value::as_object).cloned();
        let (original_style, copied_style) =
            (original_style.expect("style"), copied_style.expect("style"));
        assert!(!Rc::ptr_eq(&original_style, &copied_style));
        assert_eq!(*original_style.borrow(), *copied_style.borrow());
    }

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(Value::from_f64(f64::NAN), Value::Null);
        assert_eq!(Value::from_f64(2.5).as_f64(), Some(2.5));
    }
}
