use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value};
use stark_felt::Felt;

use crate::{
    Builtin, ProgramError, ProgramResult,
    constants::{BUILTINS_KEY, ENTRY_POINTS_KEY, OFFSET_KEY, SELECTOR_KEY},
    decode::{decode_felt, expect_object, field_path, index_path, optional_array, present},
};

/// Invocation kind of an entry point, i.e. which bucket of the table it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryPointType {
    External,
    L1Handler,
    Constructor,
}

impl EntryPointType {
    /// Wire order of the buckets.
    pub const ALL: [Self; 3] = [Self::External, Self::L1Handler, Self::Constructor];

    pub const fn key(self) -> &'static str {
        match self {
            Self::External => "EXTERNAL",
            Self::L1Handler => "L1_HANDLER",
            Self::Constructor => "CONSTRUCTOR",
        }
    }
}

impl Display for EntryPointType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A callable location in the bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointInfo {
    pub selector: Felt,
    /// Kept as a field element, like every other numeric token in the format.
    pub offset: Felt,
    /// Builtins the VM loads, in this order, before entering.
    pub builtins: Vec<Builtin>,
}

impl EntryPointInfo {
    pub(crate) fn from_value(value: &Value, path: &str) -> ProgramResult<Self> {
        let object = expect_object(value, path)?;
        let felt = |key: &str| {
            let path = field_path(path, key);
            present(object, key).map_or_else(
                || {
                    Err(ProgramError::UnexpectedType {
                        path: path.clone(),
                        expected: "field element",
                        found: "nothing".to_owned(),
                    })
                },
                |value| decode_felt(value, &path),
            )
        };

        let selector = felt(SELECTOR_KEY)?;
        let offset = felt(OFFSET_KEY)?;
        let builtins = match present(object, BUILTINS_KEY) {
            Some(value) => Builtin::list_from_value(value, &field_path(path, BUILTINS_KEY))?,
            None => Vec::new(),
        };

        Ok(Self {
            selector,
            offset,
            builtins,
        })
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert(SELECTOR_KEY.to_owned(), Value::String(self.selector.format()));
        object.insert(OFFSET_KEY.to_owned(), Value::String(self.offset.format()));
        object.insert(
            BUILTINS_KEY.to_owned(),
            self.builtins
                .iter()
                .map(|builtin| Value::from(builtin.as_str()))
                .collect(),
        );
        Value::Object(object)
    }
}

impl Serialize for EntryPointInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EntryPointInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value, "entry_point").map_err(de::Error::custom)
    }
}

/// Entry points grouped by invocation kind.
///
/// No uniqueness is enforced within or across buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPointByType {
    pub external: Vec<EntryPointInfo>,
    pub l1_handler: Vec<EntryPointInfo>,
    pub constructor: Vec<EntryPointInfo>,
}

impl EntryPointByType {
    pub fn get(&self, kind: EntryPointType) -> &[EntryPointInfo] {
        match kind {
            EntryPointType::External => &self.external,
            EntryPointType::L1Handler => &self.l1_handler,
            EntryPointType::Constructor => &self.constructor,
        }
    }

    pub fn get_mut(&mut self, kind: EntryPointType) -> &mut Vec<EntryPointInfo> {
        match kind {
            EntryPointType::External => &mut self.external,
            EntryPointType::L1Handler => &mut self.l1_handler,
            EntryPointType::Constructor => &mut self.constructor,
        }
    }

    /// Buckets in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryPointType, &[EntryPointInfo])> {
        EntryPointType::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// Total number of entry points across all buckets.
    pub fn len(&self) -> usize {
        self.iter().map(|(_, bucket)| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the table. Absent or null buckets are empty.
    pub fn from_value(value: &Value, path: &str) -> ProgramResult<Self> {
        let object = expect_object(value, path)?;
        let mut table = Self::default();
        for kind in EntryPointType::ALL {
            let bucket_path = field_path(path, kind.key());
            *table.get_mut(kind) = optional_array(object, kind.key(), &bucket_path)?
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    EntryPointInfo::from_value(item, &index_path(&bucket_path, i))
                })
                .collect::<ProgramResult<_>>()?;
        }
        Ok(table)
    }

    /// Encodes the table, always emitting all three buckets.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(kind, bucket)| {
                    (
                        kind.key().to_owned(),
                        bucket.iter().map(EntryPointInfo::to_value).collect(),
                    )
                })
                .collect(),
        )
    }
}

impl Serialize for EntryPointByType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EntryPointByType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value, ENTRY_POINTS_KEY).map_err(de::Error::custom)
    }
}
