// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The closed set of view operations reachable over the channel.

use thiserror::Error;

use crate::scene::StyleSpec;

pub const SET_ATOM_STYLE: &str = "setAtomStyle";
pub const SET_BOND_STYLE: &str = "setBondStyle";
pub const SET_ATOM_LABEL: &str = "setAtomLabel";
pub const SET_BOND_LABEL: &str = "setBondLabel";
pub const UPDATE_HIGHLIGHT_ATOMS: &str = "updateHighlightAtoms";

/// Unordered atom pair addressing a bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond(pub usize, pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    SetAtomStyle { atoms: Vec<usize>, spec: StyleSpec },
    SetBondStyle { bonds: Vec<Bond>, spec: StyleSpec },
    SetAtomLabel { atom: usize, text: Option<String>, spec: StyleSpec },
    SetBondLabel { bond: Bond, text: Option<String>, spec: StyleSpec },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("function call without `function_name`")]
    MissingFunctionName,
    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },
    #[error("`{function}` expects an argument at position {position}")]
    MissingArgument { function: &'static str, position: usize },
    #[error("`{function}` argument {position}: {reason}")]
    InvalidArgument { function: &'static str, position: usize, reason: &'static str },
    #[error("`{function}` expects its arguments as a list")]
    ArgumentsNotAList { function: &'static str },
}

impl ViewCall {
    /// Resolves `name` and decodes its `arguments` field, which must be a list when present.
    ///
    /// Atoms are indices (numbers or numeric strings). Bonds are `[a, b]` pairs or `"a,b"`
    /// strings. Style specs are objects; label text and label spec may be omitted or `null`.
    pub fn decode(name: &str, arguments: Option<&serde_json::Value>) -> Result<Self, CallError> {
        match arguments {
            None | Some(serde_json::Value::Null) => Self::decode_positional(name, &[]),
            Some(serde_json::Value::Array(values)) => Self::decode_positional(name, values),
            Some(_) => Err(CallError::ArgumentsNotAList { function: known_function(name)? }),
        }
    }

    fn decode_positional(name: &str, arguments: &[serde_json::Value]) -> Result<Self, CallError> {
        let args = Arguments::new(known_function(name)?, arguments);
        match args.function {
            SET_ATOM_STYLE => Ok(Self::SetAtomStyle { atoms: args.list(0, atom)?, spec: args.spec(1)? }),
            SET_BOND_STYLE => Ok(Self::SetBondStyle { bonds: args.list(0, bond)?, spec: args.spec(1)? }),
            SET_ATOM_LABEL => Ok(Self::SetAtomLabel {
                atom: args.required(0, atom)?,
                text: args.text(1)?,
                spec: args.optional_spec(2)?,
            }),
            SET_BOND_LABEL => Ok(Self::SetBondLabel {
                bond: args.required(0, bond)?,
                text: args.text(1)?,
                spec: args.optional_spec(2)?,
            }),
            _ => Err(CallError::UnknownFunction { name: name.to_owned() }),
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::SetAtomStyle { .. } => SET_ATOM_STYLE,
            Self::SetBondStyle { .. } => SET_BOND_STYLE,
            Self::SetAtomLabel { .. } => SET_ATOM_LABEL,
            Self::SetBondLabel { .. } => SET_BOND_LABEL,
        }
    }
}

fn known_function(name: &str) -> Result<&'static str, CallError> {
    [SET_ATOM_STYLE, SET_BOND_STYLE, SET_ATOM_LABEL, SET_BOND_LABEL]
        .into_iter()
        .find(|known| *known == name)
        .ok_or_else(|| CallError::UnknownFunction { name: name.to_owned() })
}

struct Arguments<'a> {
    function: &'static str,
    values: &'a [serde_json::Value],
}

type Decoder<T> = fn(&serde_json::Value) -> Result<T, &'static str>;

impl<'a> Arguments<'a> {
    fn new(function: &'static str, values: &'a [serde_json::Value]) -> Self {
        Self { function, values }
    }

    fn present(&self, position: usize) -> Option<&'a serde_json::Value> {
        self.values.get(position).filter(|value| !value.is_null())
    }

    fn invalid(&self, position: usize, reason: &'static str) -> CallError {
        CallError::InvalidArgument { function: self.function, position, reason }
    }

    fn required<T>(&self, position: usize, decode: Decoder<T>) -> Result<T, CallError> {
        let value = self
            .present(position)
            .ok_or(CallError::MissingArgument { function: self.function, position })?;
        decode(value).map_err(|reason| self.invalid(position, reason))
    }

    /// A list argument; a single bare item is accepted as a one-element list.
    fn list<T>(&self, position: usize, decode: Decoder<T>) -> Result<Vec<T>, CallError> {
        let value = self
            .present(position)
            .ok_or(CallError::MissingArgument { function: self.function, position })?;
        let decoded = match value {
            serde_json::Value::Array(items) if items.iter().all(|item| decode(item).is_ok()) => {
                items.iter().map(decode).collect()
            }
            single => decode(single).map(|item| vec![item]),
        };
        decoded.map_err(|reason| self.invalid(position, reason))
    }

    fn spec(&self, position: usize) -> Result<StyleSpec, CallError> {
        let value = self
            .present(position)
            .ok_or(CallError::MissingArgument { function: self.function, position })?;
        StyleSpec::from_json(value).ok_or_else(|| self.invalid(position, "expected a style object"))
    }

    fn optional_spec(&self, position: usize) -> Result<StyleSpec, CallError> {
        match self.present(position) {
            Some(_) => self.spec(position),
            None => Ok(StyleSpec::new()),
        }
    }

    fn text(&self, position: usize) -> Result<Option<String>, CallError> {
        match self.present(position) {
            None => Ok(None),
            Some(serde_json::Value::String(text)) => Ok(Some(text.clone())),
            Some(serde_json::Value::Number(number)) => Ok(Some(number.to_string())),
            Some(_) => Err(self.invalid(position, "expected label text")),
        }
    }
}

fn atom(value: &serde_json::Value) -> Result<usize, &'static str> {
    let index = match value {
        serde_json::Value::Number(number) => number.as_u64(),
        serde_json::Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    index.and_then(|index| usize::try_from(index).ok()).ok_or("expected an atom index")
}

fn bond(value: &serde_json::Value) -> Result<Bond, &'static str> {
    const REASON: &str = "expected an atom pair";
    match value {
        serde_json::Value::Array(pair) if pair.len() == 2 => {
            Ok(Bond(atom(&pair[0]).map_err(|_| REASON)?, atom(&pair[1]).map_err(|_| REASON)?))
        }
        serde_json::Value::String(text) => {
            let (first, second) = text.split_once(',').ok_or(REASON)?;
            let first = first.trim().parse::<usize>().map_err(|_| REASON)?;
            let second = second.trim().parse::<usize>().map_err(|_| REASON)?;
            Ok(Bond(first, second))
        }
        _ => Err(REASON),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{Bond, CallError, ViewCall};
    use crate::scene::StyleSpec;

    fn spec(pairs: &[(&str, &str)]) -> StyleSpec {
        let mut spec = StyleSpec::new();
        for (property, value) in pairs {
            spec.insert(property, *value);
        }
        spec
    }

    #[test]
    fn decodes_atom_style_with_mixed_index_forms() {
        let call = ViewCall::decode_positional("setAtomStyle", &[json!([0, "2"]), json!({"fill": "red"})])
            .expect("decode");
        assert_eq!(call, ViewCall::SetAtomStyle { atoms: vec![0, 2], spec: spec(&[("fill", "red")]) });
    }

    #[rstest]
    #[case::pair_list(json!([[0, 1], [2, 1]]), vec![Bond(0, 1), Bond(2, 1)])]
    #[case::single_pair(json!([0, 1]), vec![Bond(0, 1)])]
    #[case::string_keys(json!(["0,1", "1, 2"]), vec![Bond(0, 1), Bond(1, 2)])]
    fn decodes_bond_lists(#[case] bonds: serde_json::Value, #[case] expected: Vec<Bond>) {
        let call = ViewCall::decode_positional("setBondStyle", &[bonds, json!({"stroke": "blue"})])
            .expect("decode");
        assert_eq!(call, ViewCall::SetBondStyle { bonds: expected, spec: spec(&[("stroke", "blue")]) });
    }

    #[test]
    fn label_text_and_spec_are_optional() {
        let call = ViewCall::decode_positional("setAtomLabel", &[json!(3)]).expect("decode");
        assert_eq!(call, ViewCall::SetAtomLabel { atom: 3, text: None, spec: StyleSpec::new() });

        let call = ViewCall::decode_positional("setBondLabel", &[json!("0,1"), json!("C=O"), json!(null)])
            .expect("decode");
        assert_eq!(
            call,
            ViewCall::SetBondLabel { bond: Bond(0, 1), text: Some("C=O".to_owned()), spec: StyleSpec::new() }
        );
    }

    #[test]
    fn style_calls_require_a_spec() {
        let err = ViewCall::decode_positional("setAtomStyle", &[json!([0])]).unwrap_err();
        assert_eq!(err, CallError::MissingArgument { function: "setAtomStyle", position: 1 });

        let err = ViewCall::decode_positional("setAtomStyle", &[json!([0]), json!("red")]).unwrap_err();
        assert!(matches!(err, CallError::InvalidArgument { position: 1, .. }));
    }

    #[rstest]
    #[case::object(json!({"atoms": [0]}))]
    #[case::bare_string(json!("0"))]
    fn arguments_must_be_a_list(#[case] arguments: serde_json::Value) {
        assert_eq!(
            ViewCall::decode("setAtomStyle", Some(&arguments)).unwrap_err(),
            CallError::ArgumentsNotAList { function: "setAtomStyle" }
        );
        assert_eq!(
            ViewCall::decode("explode", Some(&arguments)).unwrap_err(),
            CallError::UnknownFunction { name: "explode".to_owned() }
        );
    }

    #[test]
    fn missing_arguments_decode_as_an_empty_list() {
        assert_eq!(
            ViewCall::decode("setAtomLabel", None).unwrap_err(),
            CallError::MissingArgument { function: "setAtomLabel", position: 0 }
        );
        let call = ViewCall::decode("setAtomLabel", Some(&json!([1, "H"]))).expect("decode");
        assert_eq!(call, ViewCall::SetAtomLabel { atom: 1, text: Some("H".to_owned()), spec: StyleSpec::new() });
    }

    #[test]
    fn unknown_and_malformed_calls_are_rejected() {
        assert_eq!(
            ViewCall::decode("explode", None).unwrap_err(),
            CallError::UnknownFunction { name: "explode".to_owned() }
        );
        assert!(matches!(
            ViewCall::decode_positional("setAtomLabel", &[json!(-1)]).unwrap_err(),
            CallError::InvalidArgument { function: "setAtomLabel", position: 0, .. }
        ));
    }
}
