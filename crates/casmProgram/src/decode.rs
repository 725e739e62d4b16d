//! Helpers shared by the component decoders: typed access into a
//! `serde_json::Value` tree with key-path tracking for errors.

use serde_json::{Map, Value};
use stark_felt::{Felt, FeltError};

use crate::{ProgramError, ProgramResult};

/// Appends an object key to a key path.
pub(crate) fn field_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

/// Appends a list position to a key path.
pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Short human readable description of a value, used in error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(items) => format!("list of length {}", items.len()),
        Value::Object(_) => "object".to_owned(),
    }
}

pub(crate) fn expect_array<'a>(value: &'a Value, path: &str) -> ProgramResult<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ProgramError::UnexpectedType {
            path: path.to_owned(),
            expected: "list",
            found: describe(value),
        })
}

pub(crate) fn expect_object<'a>(
    value: &'a Value,
    path: &str,
) -> ProgramResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| ProgramError::UnexpectedType {
        path: path.to_owned(),
        expected: "object",
        found: describe(value),
    })
}

/// Looks up `key` in `object`, treating an explicit `null` the same as absence.
pub(crate) fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

/// A list under `key`, or an empty slice when the key is absent or null.
pub(crate) fn optional_array<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> ProgramResult<&'a [Value]> {
    match present(object, key) {
        Some(value) => expect_array(value, path),
        None => Ok(&[]),
    }
}

/// Decodes a field element token. Strings go through [`Felt::parse`]; plain
/// integers are accepted as well, negative ones wrapping around the prime.
/// Floats are not.
pub(crate) fn decode_felt(value: &Value, path: &str) -> ProgramResult<Felt> {
    let invalid = |source: FeltError| ProgramError::InvalidFieldElement {
        path: path.to_owned(),
        source,
    };
    match value {
        Value::String(token) => Felt::parse(token).map_err(invalid),
        Value::Number(n) => n
            .as_u64()
            .map(Felt::from)
            .or_else(|| n.as_i64().map(Felt::from_i64))
            .ok_or_else(|| {
                invalid(FeltError::InvalidDigit {
                    token: n.to_string(),
                })
            }),
        other => Err(invalid(FeltError::InvalidDigit {
            token: other.to_string(),
        })),
    }
}

pub(crate) fn decode_felts(value: &Value, path: &str) -> ProgramResult<Vec<Felt>> {
    expect_array(value, path)?
        .iter()
        .enumerate()
        .map(|(i, item)| decode_felt(item, &index_path(path, i)))
        .collect()
}
