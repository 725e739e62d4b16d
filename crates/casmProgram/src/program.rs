//! The compiled program document and its load/store entry points.

use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value};
use stark_felt::Felt;
use tracing::{debug, instrument};

use crate::{
    EntryPointByType, Hint, Hints, ProgramError, ProgramResult,
    constants::{BYTECODE_KEY, COMPILER_VERSION_KEY, ENTRY_POINTS_KEY, HINTS_KEY},
    decode::{decode_felts, describe, expect_array, expect_object, index_path, present},
};

const DOCUMENT_PATH: &str = "<document>";

/// A compiled program: bytecode, entry points and hints.
///
/// Every decode produces a fresh tree owned by the returned value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Executable words.
    pub bytecode: Vec<Felt>,
    /// Opaque compiler tag, copied through verbatim.
    pub compiler_version: String,
    /// Stored under `entry_points_by_type`.
    pub entry_points: EntryPointByType,
    pub hints: Vec<Hints>,
}

impl Program {
    /// Decodes a program from raw document bytes.
    ///
    /// Decoding is all-or-nothing: the first invalid value fails the whole load.
    #[instrument(skip_all, fields(len = content.len()))]
    pub fn from_bytes(content: &[u8]) -> ProgramResult<Self> {
        let document: Value = serde_json::from_slice(content)?;
        let program = Self::from_value(&document)?;
        debug!(
            bytecode = program.bytecode.len(),
            entry_points = program.entry_points.len(),
            hints = program.hints.len(),
            compiler_version = %program.compiler_version,
            "decoded program"
        );
        Ok(program)
    }

    /// Reads the whole file, then decodes it with [`Program::from_bytes`].
    ///
    /// A read failure is reported as [`ProgramError::ResourceUnavailable`], never as a
    /// format error.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ProgramResult<Self> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|source| ProgramError::ResourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&content)
    }

    /// Decodes a program from an already parsed document.
    pub fn from_value(document: &Value) -> ProgramResult<Self> {
        let object = expect_object(document, DOCUMENT_PATH)?;

        let bytecode = match present(object, BYTECODE_KEY) {
            Some(value) => decode_felts(value, BYTECODE_KEY)?,
            None => Vec::new(),
        };

        let compiler_version = match present(object, COMPILER_VERSION_KEY) {
            Some(Value::String(version)) => version.clone(),
            Some(other) => {
                return Err(ProgramError::UnexpectedType {
                    path: COMPILER_VERSION_KEY.to_owned(),
                    expected: "string",
                    found: describe(other),
                });
            }
            None => String::new(),
        };

        let entry_points = match present(object, ENTRY_POINTS_KEY) {
            Some(value) => EntryPointByType::from_value(value, ENTRY_POINTS_KEY)?,
            None => EntryPointByType::default(),
        };

        let hints = present(object, HINTS_KEY)
            .ok_or(ProgramError::MissingRequiredField(HINTS_KEY))?;
        let hints = expect_array(hints, HINTS_KEY)?
            .iter()
            .enumerate()
            .map(|(i, record)| Hints::from_value(record, &index_path(HINTS_KEY, i)))
            .collect::<ProgramResult<_>>()?;

        Ok(Self {
            bytecode,
            compiler_version,
            entry_points,
            hints,
        })
    }

    /// Encodes the program as a document with keys in wire order.
    pub fn to_value(&self) -> Value {
        let mut document = Map::new();
        document.insert(
            BYTECODE_KEY.to_owned(),
            self.bytecode
                .iter()
                .map(|word| Value::String(word.format()))
                .collect(),
        );
        document.insert(
            COMPILER_VERSION_KEY.to_owned(),
            Value::String(self.compiler_version.clone()),
        );
        document.insert(ENTRY_POINTS_KEY.to_owned(), self.entry_points.to_value());
        document.insert(
            HINTS_KEY.to_owned(),
            self.hints.iter().map(Hints::to_value).collect(),
        );
        Value::Object(document)
    }

    /// Compact document bytes, produced from [`Program::to_value`].
    pub fn to_bytes(&self) -> ProgramResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_value())?)
    }

    pub fn to_bytes_pretty(&self) -> ProgramResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.to_value())?)
    }

    /// Writes the encoded program to `path`, replacing any existing file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn to_file(&self, path: impl AsRef<Path>) -> ProgramResult<()> {
        let path = path.as_ref();
        let content = self.to_bytes()?;
        fs::write(path, content).map_err(|source| ProgramError::ResourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(bytecode = self.bytecode.len(), "wrote program");
        Ok(())
    }

    /// Hints attached to a bytecode offset (empty if there are none).
    pub fn hints_at(&self, index: u64) -> &[Hint] {
        match self.hints.iter().find(|record| record.index == index) {
            Some(record) => &record.hints,
            None => &[],
        }
    }
}

impl FromStr for Program {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl Serialize for Program {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Program {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = Value::deserialize(deserializer)?;
        Self::from_value(&document).map_err(de::Error::custom)
    }
}
