//! # Prime-Field Elements
//!
//! Defines `FieldElement`, an integer reduced modulo the BN254 scalar-field
//! prime `p`. Every hash input, hash output, Merkle node and circuit signal in
//! the wallet is a `FieldElement`.
//!
//! ## Invariant
//!
//! The wrapped integer is always `< p`. Constructors come in two flavours:
//!
//! - **reducing** (`from_biguint_reduced`, `from_bytes_be_reduced`,
//!   `from_text`): take any non-negative integer and reduce it mod `p`. The
//!   string encoding relies on this, so two strings whose byte encodings are
//!   congruent mod `p` hash identically.
//! - **strict** (`try_from_biguint`, `FromStr`, `Deserialize`): reject values
//!   `>= p` with [`CoreError::NonCanonicalField`].
//!
//! ## Serde
//!
//! Serializes as a decimal string. Deserializes from a decimal string or a
//! JSON integer.
//!
//! ## Representation
//!
//! Backed by `ark_bn254::Fr`. [`to_fr`](FieldElement::to_fr) and
//! [`from_fr`](FieldElement::from_fr) hand the value to arkworks code such as
//! the BabyJubJub curve, whose base field is this field.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, One, PrimeField, Zero};
use num_bigint::BigUint;
use rand_core::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::CoreError;

/// Decimal representation of the field modulus `p`.
pub const MODULUS_DECIMAL: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// The field modulus `p`.
pub fn modulus() -> &'static BigUint {
    static MODULUS: OnceLock<BigUint> = OnceLock::new();
    MODULUS.get_or_init(|| BigUint::from(Fr::MODULUS))
}

/// An element of the prime field `F_p`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldElement(Fr);

impl FieldElement {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(Fr::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self(Fr::one())
    }

    /// Create from a machine integer. Always canonical since `u64 < p`.
    pub fn from_u64(value: u64) -> Self {
        Self(Fr::from(value))
    }

    /// Wrap an arkworks scalar.
    pub const fn from_fr(value: Fr) -> Self {
        Self(value)
    }

    /// The arkworks scalar.
    pub fn to_fr(&self) -> Fr {
        self.0
    }

    /// Reduce an arbitrary non-negative integer into the field.
    pub fn from_biguint_reduced(value: BigUint) -> Self {
        Self(Fr::from(value))
    }

    /// Accept an integer only if it is already canonical (`< p`).
    pub fn try_from_biguint(value: BigUint) -> Result<Self, CoreError> {
        if &value < modulus() {
            Ok(Self(Fr::from(value)))
        } else {
            Err(CoreError::NonCanonicalField(value.to_string()))
        }
    }

    /// Interpret bytes as a big-endian unsigned integer and reduce mod `p`.
    pub fn from_bytes_be_reduced(bytes: &[u8]) -> Self {
        Self(Fr::from_be_bytes_mod_order(bytes))
    }

    /// Map a string into the field by reinterpreting its UTF-8 bytes.
    ///
    /// The bytes are read as one big-endian unsigned integer; the text is
    /// never parsed as a number. Encodings of 32 bytes or more can exceed
    /// `p` and are reduced, so distinct long strings may collide.
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes_be_reduced(text.as_bytes())
    }

    /// Map a UUID into the field: its 16 bytes read big-endian.
    pub fn from_uuid(id: &Uuid) -> Self {
        Self::from_bytes_be_reduced(id.as_bytes())
    }

    /// Sample a uniformly random 248-bit element (31 random bytes).
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 31];
        rng.fill_bytes(&mut bytes);
        Self::from_bytes_be_reduced(&bytes)
    }

    /// The canonical integer representative.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from(self.0)
    }

    /// Fixed-width 32-byte big-endian encoding.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let raw = self.0.into_bigint().to_bytes_be();
        let mut out = [0u8; 32];
        let start = 32usize.saturating_sub(raw.len());
        out[start..].copy_from_slice(&raw[raw.len().saturating_sub(32)..]);
        out
    }

    /// Fixed-width 32-byte little-endian encoding.
    pub fn to_bytes_le(&self) -> [u8; 32] {
        let mut out = self.to_bytes_be();
        out.reverse();
        out
    }

    /// Returns the value as `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        let limbs = self.0.into_bigint().0;
        limbs[1..].iter().all(|limb| *limb == 0).then_some(limbs[0])
    }

    /// Returns `true` for the additive identity.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self²`.
    pub fn square(&self) -> Self {
        Self(self.0.square())
    }

    /// `self⁵`, the Poseidon S-box.
    pub fn pow5(&self) -> Self {
        let sq = self.square();
        &sq.square() * self
    }

    /// `self^exponent`.
    pub fn pow(&self, exponent: &BigUint) -> Self {
        Self(self.0.pow(exponent.to_u64_digits()))
    }

    /// Multiplicative inverse. `None` for zero.
    pub fn inverse(&self) -> Option<Self> {
        self.0.inverse().map(Self)
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

impl std::ops::Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: &FieldElement) -> FieldElement {
        FieldElement(self.0 + rhs.0)
    }
}

impl std::ops::Sub<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: &FieldElement) -> FieldElement {
        FieldElement(self.0 - rhs.0)
    }
}

impl std::ops::Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: &FieldElement) -> FieldElement {
        FieldElement(self.0 * rhs.0)
    }
}

impl std::ops::Neg for &FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        FieldElement(-self.0)
    }
}

impl std::ops::Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        -&self
    }
}

macro_rules! forward_owned_binop {
    ($imp:ident, $method:ident) => {
        impl std::ops::$imp for FieldElement {
            type Output = FieldElement;

            fn $method(self, rhs: FieldElement) -> FieldElement {
                std::ops::$imp::$method(&self, &rhs)
            }
        }

        impl std::ops::$imp<&FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $method(self, rhs: &FieldElement) -> FieldElement {
                std::ops::$imp::$method(&self, rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

// ---------------------------------------------------------------------------
// Conversions and formatting
// ---------------------------------------------------------------------------

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u32> for FieldElement {
    fn from(value: u32) -> Self {
        Self::from_u64(u64::from(value))
    }
}

impl From<Fr> for FieldElement {
    fn from(value: Fr) -> Self {
        Self(value)
    }
}

impl From<&Uuid> for FieldElement {
    fn from(id: &Uuid) -> Self {
        Self::from_uuid(id)
    }
}

impl TryFrom<BigUint> for FieldElement {
    type Error = CoreError;

    fn try_from(value: BigUint) -> Result<Self, Self::Error> {
        Self::try_from_biguint(value)
    }
}

impl FromStr for FieldElement {
    type Err = CoreError;

    /// Parse a decimal integer. Non-digit input is an unknown conversion;
    /// values `>= p` are rejected as non-canonical.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::UnknownConversion(format!(
                "expected a decimal integer, got {s:?}"
            )));
        }
        let value = BigUint::parse_bytes(trimmed.as_bytes(), 10).ok_or_else(|| {
            CoreError::UnknownConversion(format!("expected a decimal integer, got {s:?}"))
        })?;
        Self::try_from_biguint(value)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_biguint())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_biguint())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRepr {
    Text(String),
    Number(u64),
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match FieldRepr::deserialize(deserializer)? {
            FieldRepr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            FieldRepr::Number(n) => Ok(Self::from_u64(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p_minus_one() -> FieldElement {
        FieldElement::try_from_biguint(modulus() - BigUint::from(1u32)).unwrap()
    }

    #[test]
    fn test_modulus_matches_decimal() {
        let parsed = BigUint::parse_bytes(MODULUS_DECIMAL.as_bytes(), 10).unwrap();
        assert_eq!(modulus(), &parsed);
        assert_eq!(modulus().bits(), 254);
    }

    #[test]
    fn test_reduction_wraps_modulus() {
        let p = modulus().clone();
        assert_eq!(FieldElement::from_biguint_reduced(p.clone()), FieldElement::zero());
        assert_eq!(
            FieldElement::from_biguint_reduced(p + BigUint::from(5u32)),
            FieldElement::from_u64(5)
        );
    }

    #[test]
    fn test_strict_rejects_modulus() {
        assert!(FieldElement::try_from_biguint(modulus().clone()).is_err());
        assert!(FieldElement::from_str(MODULUS_DECIMAL).is_err());
        assert!(FieldElement::try_from_biguint(modulus() - BigUint::from(1u32)).is_ok());
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = FieldElement::from_str("12a").unwrap_err();
        assert!(matches!(err, CoreError::UnknownConversion(_)));
        assert!(FieldElement::from_str("").is_err());
        assert!(FieldElement::from_str("-1").is_err());
    }

    #[test]
    fn test_text_is_byte_reinterpretation() {
        // "AB" = 0x4142 = 16706, not a numeric parse.
        assert_eq!(FieldElement::from_text("AB"), FieldElement::from_u64(0x4142));
        assert_eq!(FieldElement::from_text("1"), FieldElement::from_u64(0x31));
        assert_eq!(FieldElement::from_text(""), FieldElement::zero());
    }

    #[test]
    fn test_long_text_is_reduced() {
        let long = "x".repeat(64);
        let raw = BigUint::from_bytes_be(long.as_bytes());
        assert!(&raw > modulus());
        assert_eq!(
            FieldElement::from_text(&long).to_biguint(),
            raw % modulus()
        );
    }

    #[test]
    fn test_uuid_big_endian() {
        let id = Uuid::from_bytes([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(FieldElement::from_uuid(&id), FieldElement::from_u64(0x0102));
    }

    #[test]
    fn test_sub_wraps() {
        let a = FieldElement::from_u64(3);
        let b = FieldElement::from_u64(5);
        assert_eq!(&(&a - &b) + &b, a);
        assert_eq!(&FieldElement::zero() - &FieldElement::one(), p_minus_one());
    }

    #[test]
    fn test_neg_and_add() {
        let a = FieldElement::from_u64(42);
        assert!((&a + &(-&a)).is_zero());
        assert_eq!(-FieldElement::zero(), FieldElement::zero());
    }

    #[test]
    fn test_inverse() {
        let a = FieldElement::from_u64(7);
        let inv = a.inverse().unwrap();
        assert_eq!(&a * &inv, FieldElement::one());
        assert!(FieldElement::zero().inverse().is_none());
    }

    #[test]
    fn test_pow5() {
        let a = FieldElement::from_u64(3);
        assert_eq!(a.pow5(), FieldElement::from_u64(243));
        assert_eq!(p_minus_one().pow5(), p_minus_one());
    }

    #[test]
    fn test_bytes_fixed_width() {
        let one = FieldElement::one();
        let be = one.to_bytes_be();
        assert_eq!(be[31], 1);
        assert!(be[..31].iter().all(|b| *b == 0));
        assert_eq!(one.to_bytes_le()[0], 1);
        let max = p_minus_one();
        assert_eq!(FieldElement::from_bytes_be_reduced(&max.to_bytes_be()), max);
    }

    #[test]
    fn test_serde_decimal_string() {
        let a = FieldElement::from_u64(1234);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"1234\"");
        let back: FieldElement = serde_json::from_str("\"1234\"").unwrap();
        assert_eq!(back, a);
        let from_number: FieldElement = serde_json::from_str("1234").unwrap();
        assert_eq!(from_number, a);
    }

    #[test]
    fn test_serde_rejects_non_canonical() {
        let json = format!("\"{MODULUS_DECIMAL}\"");
        assert!(serde_json::from_str::<FieldElement>(&json).is_err());
        assert!(serde_json::from_str::<FieldElement>("\"abc\"").is_err());
    }

    #[test]
    fn test_display_and_debug() {
        let a = FieldElement::from_u64(99);
        assert_eq!(a.to_string(), "99");
        assert_eq!(format!("{a:?}"), "FieldElement(99)");
    }

    proptest! {
        #[test]
        fn prop_reduced_is_canonical(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let fe = FieldElement::from_bytes_be_reduced(&bytes);
            prop_assert!(&fe.to_biguint() < modulus());
        }

        #[test]
        fn prop_add_sub_roundtrip(a in any::<u64>(), b in any::<u64>()) {
            let fa = FieldElement::from_u64(a);
            let fb = FieldElement::from_u64(b);
            prop_assert_eq!(&(&fa + &fb) - &fb, fa);
        }

        #[test]
        fn prop_decimal_roundtrip(a in any::<u64>()) {
            let fe = FieldElement::from_u64(a);
            prop_assert_eq!(fe.to_string().parse::<FieldElement>().unwrap(), fe);
        }
    }
}
