//! # BabyJubJub Curve Arithmetic
//!
//! The twisted Edwards curve `a·x² + y² = 1 + d·x²·y²` with `a = 168700`,
//! `d = 168696` over the BN254 scalar field. Points in the prime-order
//! subgroup are generated by [`Point::base8`].
//!
//! [`Point`] carries the coordinates circom uses. Group operations run on
//! `ark_ed_on_bn254`, which models the same curve as
//! `x'² + y² = 1 + (d/a)·x'²·y²`. The two are related by `x' = √a · x`, so a
//! point crosses between them by scaling `x` with [`SQRT_A`] or its inverse.

use std::sync::OnceLock;

use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::{EdwardsAffine, Fq, Fr as SubgroupScalar};
use ark_ff::{MontFp, PrimeField};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use fim_core::FieldElement;

/// Curve coefficient `a`.
pub const A: u64 = 168_700;

/// Curve coefficient `d`.
pub const D: u64 = 168_696;

/// `√a` in the base field.
const SQRT_A: Fq =
    MontFp!("7214280148105020021932206872019688659210616427216992810330019057549499971851");

/// `1 / √a`.
const SQRT_A_INV: Fq =
    MontFp!("2957874849018779266517920829765869116077630550401372566248359756137677864698");

const BASE8_X: Fq =
    MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553");
const BASE8_Y: Fq =
    MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203");

/// Order `l` of the subgroup generated by `Base8`.
pub fn suborder() -> &'static BigUint {
    static L: OnceLock<BigUint> = OnceLock::new();
    L.get_or_init(|| BigUint::from(SubgroupScalar::MODULUS))
}

/// An affine curve point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Affine `x`.
    pub x: FieldElement,
    /// Affine `y`.
    pub y: FieldElement,
}

impl Point {
    /// Create a point without checking curve membership.
    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y }
    }

    /// The neutral element `(0, 1)`.
    pub fn identity() -> Self {
        Self::new(FieldElement::zero(), FieldElement::one())
    }

    /// Generator of the prime-order subgroup.
    pub fn base8() -> &'static Point {
        static BASE8: OnceLock<Point> = OnceLock::new();
        BASE8.get_or_init(|| Point::new(FieldElement::from_fr(BASE8_X), FieldElement::from_fr(BASE8_Y)))
    }

    fn to_ark(&self) -> EdwardsAffine {
        EdwardsAffine::new_unchecked(self.x.to_fr() * SQRT_A, self.y.to_fr())
    }

    fn from_ark(point: EdwardsAffine) -> Self {
        Self::new(FieldElement::from_fr(point.x * SQRT_A_INV), FieldElement::from_fr(point.y))
    }

    /// Whether the point satisfies the curve equation.
    pub fn is_on_curve(&self) -> bool {
        self.to_ark().is_on_curve()
    }

    /// Whether the point lies on the curve and in the subgroup of order `l`.
    pub fn is_in_prime_subgroup(&self) -> bool {
        let point = self.to_ark();
        point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()
    }

    /// Group addition.
    pub fn add_point(&self, other: &Point) -> Point {
        Self::from_ark((self.to_ark().into_group() + other.to_ark()).into_affine())
    }

    /// Scalar multiplication by an arbitrary non-negative integer given as
    /// little-endian 64-bit limbs.
    pub fn mul_limbs(&self, limbs: impl AsRef<[u64]>) -> Point {
        Self::from_ark(self.to_ark().mul_bigint(limbs).into_affine())
    }

    /// Scalar multiplication by an arbitrary non-negative integer.
    pub fn mul_scalar(&self, scalar: &BigUint) -> Point {
        self.mul_limbs(scalar.to_u64_digits())
    }
}
