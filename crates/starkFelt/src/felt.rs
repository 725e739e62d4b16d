use std::{
    fmt::{self, Debug, Display, Formatter, LowerHex},
    ops::Neg,
    str::FromStr,
    sync::LazyLock,
};

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{FeltError, FeltResult};

/// The Stark prime `P = 2^251 + 17 * 2^192 + 1`, as a hex string.
pub const PRIME_HEX: &str = "0x800000000000011000000000000000000000000000000000000000000000001";

static PRIME: LazyLock<BigUint> =
    LazyLock::new(|| (BigUint::from(1u8) << 251) + (BigUint::from(17u8) << 192) + 1u8);

/// A field element, always held as its canonical residue in `[0, P)`.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Felt(BigUint);

impl Felt {
    pub const ZERO: Self = Self(BigUint::ZERO);

    /// The field modulus.
    pub fn prime() -> &'static BigUint {
        &PRIME
    }

    pub fn one() -> Self {
        Self(BigUint::from(1u8))
    }

    /// Parses a decimal or `0x`-prefixed hexadecimal token, with at most one
    /// leading `+` or `-`.
    ///
    /// Values at or above the modulus are reduced and negative values map to
    /// `P - (|v| mod P)`, so the result is always canonical. Whitespace and digit
    /// separators are rejected.
    pub fn parse(token: &str) -> FeltResult<Self> {
        if token.is_empty() {
            return Err(FeltError::Empty);
        }
        let invalid = || FeltError::InvalidDigit {
            token: token.to_owned(),
        };

        let (negative, unsigned) = match token.as_bytes()[0] {
            b'-' => (true, &token[1..]),
            b'+' => (false, &token[1..]),
            _ => (false, token),
        };
        let (digits, radix) = match unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16),
            None => (unsigned, 10),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(invalid());
        }

        let magnitude = BigUint::parse_bytes(digits.as_bytes(), radix).ok_or_else(invalid)?;
        let value = Self::reduce(magnitude);
        Ok(if negative { -value } else { value })
    }

    /// Signed integer, negative values wrapping around the modulus.
    pub fn from_i64(value: i64) -> Self {
        let magnitude = Self::from(value.unsigned_abs());
        if value < 0 { -magnitude } else { magnitude }
    }

    /// Canonical token: lowercase hex with a `0x` prefix.
    pub fn format(&self) -> String {
        format!("{:#x}", self.0)
    }

    /// Interprets big-endian bytes as an integer and reduces it.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self::reduce(BigUint::from_bytes_be(bytes))
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn reduce(value: BigUint) -> Self {
        if value < *PRIME {
            Self(value)
        } else {
            Self(value % &*PRIME)
        }
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

/// Additive inverse: `-0 == 0`, otherwise `P - x`.
impl Neg for Felt {
    type Output = Self;

    fn neg(self) -> Self {
        if self.is_zero() {
            self
        } else {
            Self(&*PRIME - self.0)
        }
    }
}

impl FromStr for Felt {
    type Err = FeltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Felt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Debug for Felt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({:#x})", self.0)
    }
}

impl LowerHex for Felt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        LowerHex::fmt(&self.0, f)
    }
}

impl Serialize for Felt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FeltVisitor;

        impl de::Visitor<'_> for FeltVisitor {
            type Value = Felt;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("a signed decimal or 0x-prefixed hex field element")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Felt, E> {
                Felt::parse(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Felt, E> {
                Ok(Felt::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Felt, E> {
                Ok(Felt::from_i64(v))
            }
        }

        deserializer.deserialize_any(FeltVisitor)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_prime_matches_hex_constant() {
        assert_eq!(
            Felt::prime(),
            &BigUint::parse_bytes(&PRIME_HEX.as_bytes()[2..], 16).unwrap()
        );
    }

    #[test]
    fn test_parse_decimal_and_hex() {
        assert_eq!(Felt::parse("123").unwrap(), Felt::from(123));
        assert_eq!(Felt::parse("0x7b").unwrap(), Felt::from(123));
        assert_eq!(Felt::parse("0X7B").unwrap(), Felt::from(123));
        assert_eq!(Felt::parse("0").unwrap(), Felt::ZERO);
    }

    #[test]
    fn test_parse_reduces_modulo_prime() {
        assert_eq!(Felt::parse(PRIME_HEX).unwrap(), Felt::ZERO);
        let p_plus_one = "0x800000000000011000000000000000000000000000000000000000000000002";
        assert_eq!(Felt::parse(p_plus_one).unwrap(), Felt::one());
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        assert_eq!(Felt::parse(""), Err(FeltError::Empty));
        let malformed = [
            "0x", "-", "+", "--1", "+-1", "-+1", "- 1", "-0x", " 1", "1 ", "1_000", "12a", "0xg1",
            "1.0",
        ];
        for token in malformed {
            assert_eq!(
                Felt::parse(token),
                Err(FeltError::InvalidDigit {
                    token: token.to_owned()
                }),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_signed_tokens_wrap_around_the_prime() {
        let p_minus_one = "0x800000000000011000000000000000000000000000000000000000000000000";
        assert_eq!(Felt::parse("-1").unwrap(), Felt::parse(p_minus_one).unwrap());
        assert_eq!(Felt::parse("-0x1").unwrap(), Felt::parse(p_minus_one).unwrap());
        assert_eq!(Felt::parse("+1").unwrap(), Felt::one());
        assert_eq!(Felt::parse("-0").unwrap(), Felt::ZERO);
        assert_eq!(Felt::parse(&format!("-{PRIME_HEX}")).unwrap(), Felt::ZERO);
        assert_eq!(Felt::from_i64(-6), Felt::parse("-6").unwrap());
        assert_eq!(Felt::from_i64(i64::MIN), Felt::parse(&i64::MIN.to_string()).unwrap());
    }

    #[test]
    fn test_negation() {
        assert_eq!(-Felt::ZERO, Felt::ZERO);
        assert_eq!(-(-Felt::from(42)), Felt::from(42));
        assert_eq!((-Felt::one()).as_biguint() + 1u8, *Felt::prime());
    }

    #[test]
    fn test_format_is_lowercase_hex() {
        assert_eq!(Felt::ZERO.format(), "0x0");
        assert_eq!(Felt::from(255).format(), "0xff");
        assert_eq!(Felt::from(255).to_string(), "0xff");
    }

    #[test]
    fn test_serde_string_token() {
        let felt: Felt = serde_json::from_str("\"0x10\"").unwrap();
        assert_eq!(felt, Felt::from(16));
        let felt: Felt = serde_json::from_str("16").unwrap();
        assert_eq!(felt, Felt::from(16));
        assert_eq!(serde_json::to_string(&felt).unwrap(), "\"0x10\"");
        assert!(serde_json::from_str::<Felt>("\"nope\"").is_err());
        assert_eq!(serde_json::from_str::<Felt>("-1").unwrap(), -Felt::one());
    }

    proptest! {
        #[test]
        fn test_format_then_parse_is_identity(bytes in any::<[u8; 32]>()) {
            let felt = Felt::from_bytes_be(&bytes);
            prop_assert!(felt.as_biguint() < Felt::prime());
            prop_assert_eq!(Felt::parse(&felt.format()).unwrap(), felt);
        }

        #[test]
        fn test_decimal_matches_u64(n in any::<u64>()) {
            prop_assert_eq!(Felt::parse(&n.to_string()).unwrap().to_u64(), Some(n));
        }
    }
}
