use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

#[cfg(test)]
use proptest::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;

use crate::{
    ProgramError, ProgramResult,
    decode::{describe, expect_array, index_path},
};

/// A VM capability that must be provisioned before an entry point runs.
///
/// The set is closed: every variant has exactly one discriminant in `1..=9`
/// and exactly one string identifier, and nothing else decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Builtin {
    Output = 1,
    RangeCheck = 2,
    Pedersen = 3,
    Ecdsa = 4,
    Keccak = 5,
    Bitwise = 6,
    EcOp = 7,
    Poseidon = 8,
    SegmentArena = 9,
}

impl Builtin {
    /// All builtins in discriminant order.
    pub const ALL: [Self; 9] = [
        Self::Output,
        Self::RangeCheck,
        Self::Pedersen,
        Self::Ecdsa,
        Self::Keccak,
        Self::Bitwise,
        Self::EcOp,
        Self::Poseidon,
        Self::SegmentArena,
    ];

    pub const fn discriminant(self) -> u8 {
        self as u8
    }

    /// The wire identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::RangeCheck => "range_check",
            Self::Pedersen => "pedersen",
            Self::Ecdsa => "ecdsa",
            Self::Keccak => "keccak",
            Self::Bitwise => "bitwise",
            Self::EcOp => "ec_op",
            Self::Poseidon => "poseidon",
            Self::SegmentArena => "segment_arena",
        }
    }

    /// Decodes a wire identifier. Matching is exact and case-sensitive.
    pub fn decode(name: &str) -> ProgramResult<Self> {
        match name {
            "output" => Ok(Self::Output),
            "range_check" => Ok(Self::RangeCheck),
            "pedersen" => Ok(Self::Pedersen),
            "ecdsa" => Ok(Self::Ecdsa),
            "keccak" => Ok(Self::Keccak),
            "bitwise" => Ok(Self::Bitwise),
            "ec_op" => Ok(Self::EcOp),
            "poseidon" => Ok(Self::Poseidon),
            "segment_arena" => Ok(Self::SegmentArena),
            _ => Err(ProgramError::UnknownBuiltin {
                path: String::new(),
                name: name.to_owned(),
            }),
        }
    }

    pub(crate) fn from_value(value: &Value, path: &str) -> ProgramResult<Self> {
        let name = value.as_str().ok_or_else(|| ProgramError::UnexpectedType {
            path: path.to_owned(),
            expected: "builtin name",
            found: describe(value),
        })?;
        Self::decode(name).map_err(|err| match err {
            ProgramError::UnknownBuiltin { name, .. } => ProgramError::UnknownBuiltin {
                path: path.to_owned(),
                name,
            },
            other => other,
        })
    }

    /// Decodes an ordered builtin list, keeping declaration order.
    pub(crate) fn list_from_value(value: &Value, path: &str) -> ProgramResult<Vec<Self>> {
        expect_array(value, path)?
            .iter()
            .enumerate()
            .map(|(i, item)| Self::from_value(item, &index_path(path, i)))
            .collect()
    }
}

impl TryFrom<u8> for Builtin {
    type Error = ProgramError;

    fn try_from(discriminant: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|builtin| builtin.discriminant() == discriminant)
            .ok_or_else(|| ProgramError::UnknownBuiltin {
                path: String::new(),
                name: discriminant.to_string(),
            })
    }
}

impl FromStr for Builtin {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Builtin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Builtin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::decode(&name).map_err(de::Error::custom)
    }
}

#[cfg(test)]
impl Arbitrary for Builtin {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        proptest::sample::select(Self::ALL.to_vec()).boxed()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_every_builtin_round_trips_through_its_name() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::decode(builtin.as_str()).unwrap(), builtin);
            assert_eq!(builtin.to_string().parse::<Builtin>().unwrap(), builtin);
        }
    }

    #[test]
    fn test_names_and_discriminants_are_fixed() {
        let expected = [
            (1, "output"),
            (2, "range_check"),
            (3, "pedersen"),
            (4, "ecdsa"),
            (5, "keccak"),
            (6, "bitwise"),
            (7, "ec_op"),
            (8, "poseidon"),
            (9, "segment_arena"),
        ];
        for (builtin, (discriminant, name)) in Builtin::ALL.into_iter().zip(expected) {
            assert_eq!(builtin.discriminant(), discriminant);
            assert_eq!(builtin.as_str(), name);
            assert_eq!(Builtin::try_from(discriminant).unwrap(), builtin);
        }
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(matches!(
            Builtin::decode("unknown_builtin"),
            Err(ProgramError::UnknownBuiltin { path, name })
                if path.is_empty() && name == "unknown_builtin"
        ));
    }

    #[test]
    fn test_unknown_builtin_in_list_reports_position() {
        let err =
            Builtin::list_from_value(&json!(["output", "sha256"]), "ep.builtins").unwrap_err();
        assert!(matches!(
            err,
            ProgramError::UnknownBuiltin { ref path, ref name }
                if path == "ep.builtins[1]" && name == "sha256"
        ));
    }

    #[test]
    fn test_near_misses_are_rejected() {
        for name in ["Output", "range_check ", " pedersen", "EC_OP", "ec-op", ""] {
            assert!(
                matches!(Builtin::decode(name), Err(ProgramError::UnknownBuiltin { .. })),
                "{name:?} should not decode"
            );
        }
    }

    #[test]
    fn test_out_of_range_discriminants() {
        assert!(matches!(
            Builtin::try_from(0u8),
            Err(ProgramError::UnknownBuiltin { name, .. }) if name == "0"
        ));
        assert!(Builtin::try_from(10u8).is_err());
        assert!(Builtin::try_from(u8::MAX).is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_value(Builtin::SegmentArena).unwrap(),
            json!("segment_arena")
        );
        let builtins: Vec<Builtin> = serde_json::from_value(json!(["ec_op", "poseidon"])).unwrap();
        assert_eq!(builtins, vec![Builtin::EcOp, Builtin::Poseidon]);
        assert!(serde_json::from_value::<Builtin>(json!("sha256")).is_err());
    }

    #[test]
    fn test_list_from_value_keeps_order_and_reports_position() {
        let list = Builtin::list_from_value(&json!(["pedersen", "range_check"]), "b").unwrap();
        assert_eq!(list, vec![Builtin::Pedersen, Builtin::RangeCheck]);

        let err = Builtin::list_from_value(&json!(["pedersen", 7]), "b").unwrap_err();
        assert!(matches!(err, ProgramError::UnexpectedType { ref path, .. } if path == "b[1]"));
    }

    proptest! {
        #[test]
        fn test_serde_round_trip(builtin in any::<Builtin>()) {
            let encoded = serde_json::to_string(&builtin).unwrap();
            prop_assert_eq!(serde_json::from_str::<Builtin>(&encoded).unwrap(), builtin);
        }
    }
}
