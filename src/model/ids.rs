// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::value::Value;

/// The merge key of an identifiable record (a node or a link).
///
/// Ids arrive as JSON scalars. Integers and strings never compare equal to each other, so `1`
/// and `"1"` are distinct ids. Non-integer numbers, booleans and `null` are not valid ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(Self::Int),
            Value::String(text) => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(value) => Value::Number((*value).into()),
            Self::Text(value) => Value::String(value.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::RecordId;
    use crate::model::Value;

    #[test]
    fn integer_and_string_ids_are_distinct() {
        let int = RecordId::from_value(&Value::Number(1.into())).expect("int id");
        let text = RecordId::from_value(&Value::String("1".to_owned())).expect("text id");
        assert_ne!(int, text);
    }

    #[test]
    fn rejects_non_scalar_ids() {
        assert_eq!(RecordId::from_value(&Value::Null), None);
        assert_eq!(RecordId::from_value(&Value::Bool(true)), None);
        assert_eq!(RecordId::from_value(&Value::from_f64(1.5)), None);
    }
}
