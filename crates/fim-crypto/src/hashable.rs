//! # Poseidon-Hashable Values
//!
//! Every value that can appear as a Merkle leaf or a credential property
//! knows how to hash itself to a single field element. Scalars go through
//! the single-input Poseidon (`digest([v])`), strings through their byte
//! encoding, and composite curve values hash their coordinates in one
//! permutation.

use fim_core::{FieldElement, Timestamp};
use uuid::Uuid;

use crate::poseidon::{digest_str, hash_fixed};

/// A value with a canonical Poseidon hash.
pub trait PoseidonHashable {
    /// The value's hash. Pure and deterministic.
    fn poseidon_hash(&self) -> FieldElement;
}

impl PoseidonHashable for FieldElement {
    fn poseidon_hash(&self) -> FieldElement {
        hash_fixed([self])
    }
}

impl PoseidonHashable for u64 {
    fn poseidon_hash(&self) -> FieldElement {
        FieldElement::from_u64(*self).poseidon_hash()
    }
}

impl PoseidonHashable for u32 {
    fn poseidon_hash(&self) -> FieldElement {
        FieldElement::from(*self).poseidon_hash()
    }
}

impl PoseidonHashable for str {
    fn poseidon_hash(&self) -> FieldElement {
        digest_str(self)
    }
}

impl PoseidonHashable for String {
    fn poseidon_hash(&self) -> FieldElement {
        digest_str(self)
    }
}

impl PoseidonHashable for Uuid {
    fn poseidon_hash(&self) -> FieldElement {
        FieldElement::from_uuid(self).poseidon_hash()
    }
}

impl PoseidonHashable for Timestamp {
    fn poseidon_hash(&self) -> FieldElement {
        self.to_field().poseidon_hash()
    }
}

impl<T: PoseidonHashable + ?Sized> PoseidonHashable for &T {
    fn poseidon_hash(&self) -> FieldElement {
        (**self).poseidon_hash()
    }
}
