#[cfg(test)]
use proptest::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value};

use crate::{
    ProgramError, ProgramResult,
    constants::HINT_TUPLE_ARITY,
    decode::{describe, index_path},
};

/// An out-of-band instruction for the VM.
///
/// The payload is opaque here: it must be an object on the wire and is kept
/// verbatim, key order included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hint(Map<String, Value>);

impl Hint {
    pub const fn new(payload: Map<String, Value>) -> Self {
        Self(payload)
    }

    pub const fn payload(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_payload(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Hint {
    fn from(payload: Map<String, Value>) -> Self {
        Self(payload)
    }
}

/// The hints attached to one bytecode offset.
///
/// Serialized as the positional pair `[index, [hint, ...]]`, not as an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hints {
    /// Offset into the bytecode.
    pub index: u64,
    pub hints: Vec<Hint>,
}

impl Hints {
    pub const fn new(index: u64, hints: Vec<Hint>) -> Self {
        Self { index, hints }
    }

    /// Decodes one `[index, [hint, ...]]` record.
    pub fn from_value(value: &Value, path: &str) -> ProgramResult<Self> {
        let malformed = || ProgramError::MalformedHintTuple {
            path: path.to_owned(),
            found: describe(value),
        };
        let tuple = value.as_array().ok_or_else(malformed)?;
        if tuple.len() != HINT_TUPLE_ARITY {
            return Err(malformed());
        }

        let index = decode_index(&tuple[0]).ok_or_else(|| ProgramError::InvalidHintIndex {
            path: index_path(path, 0),
            token: tuple[0].to_string(),
        })?;

        // The payload goes through the ordinary derived decoder.
        let hints = serde_json::from_value::<Vec<Hint>>(tuple[1].clone()).map_err(|e| {
            ProgramError::InvalidHintPayload {
                path: index_path(path, 1),
                reason: e.to_string(),
            }
        })?;

        Ok(Self { index, hints })
    }

    /// Encodes the record as `[index, [hint, ...]]`.
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::from(self.index),
            Value::Array(
                self.hints
                    .iter()
                    .map(|hint| Value::Object(hint.0.clone()))
                    .collect(),
            ),
        ])
    }
}

/// Reads a hint index. Integral floats such as `5.0` are accepted only below
/// `2^53`; past that a float token may already have been rounded to a
/// neighbouring integer, so it is rejected rather than silently moved.
fn decode_index(value: &Value) -> Option<u64> {
    const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

    let Value::Number(number) = value else {
        return None;
    };
    if let Some(index) = number.as_u64() {
        return Some(index);
    }
    let float = number.as_f64()?;
    (float.fract() == 0.0 && (0.0..MAX_EXACT_FLOAT).contains(&float)).then_some(float as u64)
}

impl Serialize for Hints {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Hints {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value, "hints").map_err(de::Error::custom)
    }
}

#[cfg(test)]
impl Arbitrary for Hints {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        let hint = prop::collection::vec(("[a-zA-Z]{1,12}", any::<i64>()), 0..4).prop_map(
            |fields| {
                Hint::new(
                    fields
                        .into_iter()
                        .map(|(key, value)| (key, Value::from(value)))
                        .collect(),
                )
            },
        );
        (any::<u64>(), prop::collection::vec(hint, 0..4))
            .prop_map(|(index, hints)| Self { index, hints })
            .boxed()
    }
}
