//! # EdDSA-Poseidon over BabyJubJub
//!
//! Key material and signatures for binding an issuer to a credential root.
//! The scheme follows circomlib's `EdDSAPoseidonVerifier`, so every signature
//! produced here verifies inside the circuits:
//!
//! - `h = BLAKE-512(private_key)`; `s` = first 32 bytes, pruned
//!   (`h[0] &= 0xF8`, `h[31] &= 0x7F`, `h[31] |= 0x40`), little-endian.
//! - `A = Base8 · (s >> 3)`.
//! - `r = BLAKE-512(h[32..64] || msg_le32) mod l`, `R8 = Base8 · r`.
//! - `hm = Poseidon(R8.x, R8.y, A.x, A.y, msg)`, `S = (r + hm·s) mod l`.
//!
//! Verification checks `Base8 · S == R8 + A · (8·hm)`.
//!
//! This is circomlibjs' `prv2pub`/`signPoseidon`: the same seed yields the
//! same public key and signature in both.
//!
//! ## Security Invariant
//!
//! - `PrivateKey` is zeroized on drop and never serialized or printed.
//! - Malformed signatures (points off the curve, `S >= l`) verify `false`
//!   instead of erroring.
//!
//! ## Serde
//!
//! - `PublicKey` serializes as `["x", "y"]` (decimal strings).
//! - `Signature` serializes as `["R8x", "R8y", "S"]`.

use ark_ed_on_bn254::Fr as SubgroupScalar;
use ark_ff::PrimeField;
use blake_hash::{Blake512, Digest};
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use fim_core::FieldElement;

use crate::babyjubjub::Point;
use crate::error::CryptoError;
use crate::hashable::PoseidonHashable;
use crate::poseidon::hash_fixed;

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A 32-byte EdDSA seed.
///
/// Does not implement `Serialize` or `Display`; `Debug` is redacted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Wrap raw seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a seed from a byte slice of exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let seed: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!("private key must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(seed))
    }

    /// Sample a fresh seed.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        Self(seed)
    }

    /// The raw seed.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Expand the seed into the pruned signing scalar and the nonce prefix.
    fn expand(&self) -> (BigUint, [u8; 32]) {
        let mut h = Blake512::digest(&self.0);
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&h[..32]);
        scalar[0] &= 0xF8;
        scalar[31] &= 0x7F;
        scalar[31] |= 0x40;
        let mut prefix = [0u8; 32];
        prefix.copy_from_slice(&h[32..]);
        let s = BigUint::from_bytes_le(&scalar);
        scalar.zeroize();
        h.as_mut_slice().zeroize();
        (s, prefix)
    }

    /// Derive the public key `A = Base8 · (s >> 3)`.
    pub fn public_key(&self) -> PublicKey {
        let (s, mut prefix) = self.expand();
        prefix.zeroize();
        PublicKey {
            point: Point::base8().mul_scalar(&(s >> 3u32)),
        }
    }

    /// Sign a field element.
    pub fn sign(&self, message: &FieldElement) -> Signature {
        let (s, mut prefix) = self.expand();
        let public = PublicKey {
            point: Point::base8().mul_scalar(&(&s >> 3u32)),
        };

        let mut hasher = Blake512::new();
        hasher.update(prefix);
        hasher.update(message.to_bytes_le());
        let nonce_hash = hasher.finalize();
        prefix.zeroize();
        let r = SubgroupScalar::from_le_bytes_mod_order(&nonce_hash);

        let r8 = Point::base8().mul_limbs(r.into_bigint());
        let hm = challenge(&r8, &public.point, message);
        let big_s = r + SubgroupScalar::from(hm.to_biguint()) * SubgroupScalar::from(s);

        Signature {
            r8,
            s: FieldElement::from_biguint_reduced(BigUint::from(big_s)),
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

fn challenge(r8: &Point, a: &Point, message: &FieldElement) -> FieldElement {
    hash_fixed([&r8.x, &r8.y, &a.x, &a.y, message])
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// An EdDSA public key: a BabyJubJub point with two coordinates.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    point: Point,
}

impl PublicKey {
    /// Build from coordinates, rejecting points off the curve.
    pub fn new(x: FieldElement, y: FieldElement) -> Result<Self, CryptoError> {
        let point = Point::new(x, y);
        if !point.is_on_curve() {
            return Err(CryptoError::InvalidKey(format!(
                "public key ({}, {}) is not on the curve",
                point.x, point.y
            )));
        }
        Ok(Self { point })
    }

    /// Parse from two 32-byte big-endian coordinates.
    pub fn from_bytes(x: &[u8; 32], y: &[u8; 32]) -> Result<Self, CryptoError> {
        let x = FieldElement::try_from_biguint(BigUint::from_bytes_be(x))?;
        let y = FieldElement::try_from_biguint(BigUint::from_bytes_be(y))?;
        Self::new(x, y)
    }

    /// The two coordinates as 32-byte big-endian arrays.
    pub fn to_bytes(&self) -> [[u8; 32]; 2] {
        [self.point.x.to_bytes_be(), self.point.y.to_bytes_be()]
    }

    /// The `x` coordinate.
    pub fn x(&self) -> &FieldElement {
        &self.point.x
    }

    /// The `y` coordinate.
    pub fn y(&self) -> &FieldElement {
        &self.point.y
    }

    /// The underlying curve point.
    pub fn point(&self) -> &Point {
        &self.point
    }

    /// Verify `signature` over `message`. Never errors: any malformed input
    /// yields `false`.
    pub fn verify(&self, message: &FieldElement, signature: &Signature) -> bool {
        if !self.point.is_on_curve() || !signature.r8.is_on_curve() {
            return false;
        }
        let Some(s) = SubgroupScalar::from_bigint(signature.s.to_fr().into_bigint()) else {
            return false;
        };
        let hm = challenge(&signature.r8, &self.point, message);
        let lhs = Point::base8().mul_limbs(s.into_bigint());
        let rhs = signature
            .r8
            .add_point(&self.point.mul_scalar(&(hm.to_biguint() * 8u32)));
        lhs == rhs
    }
}

impl PoseidonHashable for PublicKey {
    fn poseidon_hash(&self) -> FieldElement {
        hash_fixed([&self.point.x, &self.point.y])
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({}, {})", self.point.x, self.point.y)
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [x, _] = self.to_bytes();
        let prefix: String = x[..8].iter().map(|b| format!("{b:02x}")).collect();
        write!(f, "bjj:{prefix}")
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [&self.point.x, &self.point.y].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [x, y] = <[FieldElement; 2]>::deserialize(deserializer)?;
        Self::new(x, y).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// An EdDSA signature `(R8, S)`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    r8: Point,
    s: FieldElement,
}

impl Signature {
    /// Assemble from its three scalars. No validation happens here;
    /// [`PublicKey::verify`] rejects malformed values.
    pub fn new(r8x: FieldElement, r8y: FieldElement, s: FieldElement) -> Self {
        Self {
            r8: Point::new(r8x, r8y),
            s,
        }
    }

    /// The nonce commitment `R8`.
    pub fn r8(&self) -> &Point {
        &self.r8
    }

    /// The response scalar `S`.
    pub fn s(&self) -> &FieldElement {
        &self.s
    }

    /// `[R8.x, R8.y, S]`.
    pub fn scalars(&self) -> [&FieldElement; 3] {
        [&self.r8.x, &self.r8.y, &self.s]
    }
}

impl PoseidonHashable for Signature {
    fn poseidon_hash(&self) -> FieldElement {
        hash_fixed(self.scalars())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}, {}, {})", self.r8.x, self.r8.y, self.s)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.scalars().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [r8x, r8y, s] = <[FieldElement; 3]>::deserialize(deserializer)?;
        Ok(Self::new(r8x, r8y, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    fn key(byte: u8) -> PrivateKey {
        PrivateKey::from_bytes([byte; 32])
    }

    #[test]
    fn test_public_key_on_curve_and_deterministic() {
        let sk = key(7);
        let pk = sk.public_key();
        assert!(pk.point().is_on_curve());
        assert_eq!(pk, key(7).public_key());
        assert_ne!(pk, key(8).public_key());
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let sk = key(1);
        let pk = sk.public_key();
        let msg = FieldElement::from_u64(1234);
        let sig = sk.sign(&msg);
        assert!(pk.verify(&msg, &sig));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let msg = FieldElement::from_u64(42);
        assert_eq!(key(3).sign(&msg), key(3).sign(&msg));
    }

    #[test]
    fn test_wrong_message_fails() {
        let sk = key(2);
        let sig = sk.sign(&FieldElement::from_u64(1));
        assert!(!sk.public_key().verify(&FieldElement::from_u64(2), &sig));
    }

    #[test]
    fn test_wrong_key_fails() {
        let msg = FieldElement::from_u64(9);
        let sig = key(4).sign(&msg);
        assert!(!key(5).public_key().verify(&msg, &sig));
    }

    #[test]
    fn test_malformed_signature_is_false() {
        let sk = key(6);
        let msg = FieldElement::from_u64(9);
        let sig = sk.sign(&msg);
        let off_curve = Signature::new(FieldElement::one(), FieldElement::one(), sig.s().clone());
        assert!(!sk.public_key().verify(&msg, &off_curve));

        let big_s = Signature::new(
            sig.r8().x.clone(),
            sig.r8().y.clone(),
            FieldElement::from_biguint_reduced(crate::babyjubjub::suborder().clone()),
        );
        assert!(!sk.public_key().verify(&msg, &big_s));
    }

    #[test]
    fn test_random_key() {
        let sk = PrivateKey::generate(&mut OsRng);
        let msg = FieldElement::from_u64(77);
        assert!(sk.public_key().verify(&msg, &sk.sign(&msg)));
    }

    #[test]
    fn test_private_key_debug_redacted() {
        assert_eq!(format!("{:?}", key(1)), "PrivateKey([REDACTED])");
        assert!(PrivateKey::from_slice(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_public_key_serde() {
        let pk = key(1).public_key();
        let json = serde_json::to_value(&pk).unwrap();
        assert_eq!(json[0], serde_json::Value::String(pk.x().to_string()));
        let back: PublicKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, pk);
        assert!(serde_json::from_str::<PublicKey>("[\"1\",\"1\"]").is_err());
    }

    #[test]
    fn test_signature_serde_and_hash() {
        let sig = key(1).sign(&FieldElement::from_u64(5));
        let json = serde_json::to_string(&sig).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
        assert_eq!(back.poseidon_hash(), sig.poseidon_hash());
    }

    fn hex32(hex: &str) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).unwrap();
        }
        out
    }

    #[test]
    fn test_matches_circomlibjs_vector() {
        let sk = PrivateKey::from_bytes(hex32(
            "0001020304050607080900010203040506070809000102030405060708090001",
        ));
        let pk = sk.public_key();
        assert_eq!(
            pk.x().to_string(),
            "13277427435165878497778222415993513565335242147425444199013288855685581939618"
        );
        assert_eq!(
            pk.y().to_string(),
            "13622229784656158136036771217484571176836296686641868549125388198837476602820"
        );

        // Little-endian bytes 00..09.
        let msg: FieldElement = "42649378395939397566720".parse().unwrap();
        let sig = sk.sign(&msg);
        assert_eq!(
            sig.r8().x.to_string(),
            "11384336176656855268977457483345535180380036354188103142384839473266348197733"
        );
        assert_eq!(
            sig.r8().y.to_string(),
            "15383486972088797283337779941324724402501462225528836549661220478783371668959"
        );
        assert_eq!(
            sig.s().to_string(),
            "1672775540645840396591609181675628451599263765380031905495115170613215233181"
        );
        assert!(pk.verify(&msg, &sig));
    }

    #[test]
    fn test_public_key_in_prime_subgroup() {
        assert!(key(11).public_key().point().is_in_prime_subgroup());
    }

    #[test]
    fn test_public_key_bytes_roundtrip() {
        let pk = key(9).public_key();
        let [x, y] = pk.to_bytes();
        assert_eq!(PublicKey::from_bytes(&x, &y).unwrap(), pk);
    }
}
