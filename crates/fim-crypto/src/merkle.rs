//! # Binary Merkle Tree
//!
//! A complete binary tree over Poseidon-hashable leaves. Credentials commit
//! to their properties through the root of such a tree, and the same tree
//! shape is recomputed inside circuits, so node layout and padding are part
//! of the external contract.
//!
//! ## Algorithm
//!
//! - `n` leaves are padded to `2^ceil(log2 n)` with placeholder leaves whose
//!   hash is `digest([0])`.
//! - Nodes are stored level by level in one flat array: the leaf hashes
//!   first, then for every adjacent pair `(data[i], data[i + 1])` (with `i`
//!   stepping by two) the 2-ary Poseidon hash is appended. The final entry
//!   is the root.
//! - A proof for leaf `index` records the `depth` low bits of `index`
//!   (least significant first) and, per level, the sibling node. The root
//!   is appended as the last lemma entry.

use serde::{Deserialize, Serialize};

use fim_core::FieldElement;

use crate::error::CryptoError;
use crate::hashable::PoseidonHashable;
use crate::poseidon::hash_fixed;

fn node_hash(left: &FieldElement, right: &FieldElement) -> FieldElement {
    hash_fixed([left, right])
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// A binary Merkle tree with Poseidon node hashing.
#[derive(Debug, Clone)]
pub struct BinaryMerkleTree {
    depth: usize,
    original_leaf_count: usize,
    nodes: Vec<FieldElement>,
}

impl BinaryMerkleTree {
    /// Build a tree over `leaves`, hashing each with its own Poseidon hash.
    pub fn new<T: PoseidonHashable>(leaves: &[T]) -> Result<Self, CryptoError> {
        Self::from_leaf_hashes(leaves.iter().map(PoseidonHashable::poseidon_hash).collect())
    }

    /// Build a tree whose leaf hashes are already computed.
    pub fn from_leaf_hashes(mut leaf_hashes: Vec<FieldElement>) -> Result<Self, CryptoError> {
        if leaf_hashes.is_empty() {
            return Err(CryptoError::EmptyInput("a Merkle tree needs at least one leaf"));
        }
        let original_leaf_count = leaf_hashes.len();
        let leaf_count = original_leaf_count.next_power_of_two();
        let depth = leaf_count.trailing_zeros() as usize;

        leaf_hashes.resize(leaf_count, FieldElement::zero().poseidon_hash());

        let size = 2 * leaf_count - 1;
        let mut nodes = leaf_hashes;
        nodes.reserve(size - leaf_count);
        let mut i = 0;
        while i + 1 < size {
            let parent = node_hash(&nodes[i], &nodes[i + 1]);
            nodes.push(parent);
            i += 2;
        }

        Ok(Self {
            depth,
            original_leaf_count,
            nodes,
        })
    }

    /// The root hash (last node).
    pub fn root(&self) -> &FieldElement {
        // Construction guarantees at least one node.
        &self.nodes[self.nodes.len() - 1]
    }

    /// `ceil(log2 n)` for the original leaf count `n`.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Leaf count after padding, always `2^depth`.
    pub fn leaf_count(&self) -> usize {
        1 << self.depth
    }

    /// Leaves supplied at construction, before padding.
    pub fn original_leaf_count(&self) -> usize {
        self.original_leaf_count
    }

    /// Hashes of the padded leaves.
    pub fn leaf_hashes(&self) -> &[FieldElement] {
        &self.nodes[..self.leaf_count()]
    }

    /// Every node, leaves first, root last.
    pub fn nodes(&self) -> &[FieldElement] {
        &self.nodes
    }

    /// Build the inclusion proof for the leaf at `index`.
    ///
    /// Padding leaves are addressable; `index` must be below
    /// [`leaf_count`](Self::leaf_count).
    pub fn create_merkle_proof(&self, index: usize) -> Result<MerkleProof, CryptoError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(CryptoError::IndexOutOfBounds { index, leaf_count });
        }

        let path: Vec<bool> = (0..self.depth).map(|i| (index >> i) & 1 == 1).collect();

        let mut lemma = Vec::with_capacity(self.depth + 1);
        let mut offset = 0;
        let mut pos = index;
        let mut width = leaf_count;
        for is_right in &path {
            let sibling = if *is_right {
                offset + pos - 1
            } else {
                offset + pos + 1
            };
            lemma.push(self.nodes[sibling].clone());
            pos >>= 1;
            offset += width;
            width >>= 1;
        }
        lemma.push(self.root().clone());

        Ok(MerkleProof {
            subject: self.nodes[index].clone(),
            lemma,
            path,
        })
    }

    /// Check that `proof` is valid and belongs to this tree: its subject must
    /// be the leaf its path addresses and its root must be this tree's root.
    pub fn verify_merkle_proof(&self, proof: &MerkleProof) -> bool {
        let Some(expected_leaf) = proof.index().and_then(|i| self.leaf_hashes().get(i)) else {
            return false;
        };
        if expected_leaf != &proof.subject || proof.root() != Some(self.root()) {
            return false;
        }
        proof.verify()
    }
}

impl PartialEq for BinaryMerkleTree {
    fn eq(&self, other: &Self) -> bool {
        self.root() == other.root()
    }
}

impl Eq for BinaryMerkleTree {}

// ---------------------------------------------------------------------------
// Proof
// ---------------------------------------------------------------------------

/// An inclusion proof: the leaf hash, the sibling hashes bottom-up followed
/// by the root, and the left/right path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Hash of the proven leaf.
    pub subject: FieldElement,
    /// Sibling hashes from leaf level upward, then the root.
    pub lemma: Vec<FieldElement>,
    /// `path[i]` is set when the node at level `i` is a right child.
    pub path: Vec<bool>,
}

impl MerkleProof {
    /// The committed root (last lemma entry).
    pub fn root(&self) -> Option<&FieldElement> {
        self.lemma.last()
    }

    /// Leaf index encoded by the path, or `None` when a set bit lies
    /// beyond the width of `usize`.
    pub fn index(&self) -> Option<usize> {
        self.path
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit)
            .try_fold(0usize, |acc, (i, _)| {
                let bit = u32::try_from(i).ok().and_then(|i| 1usize.checked_shl(i))?;
                Some(acc | bit)
            })
    }

    /// Recompute the root from the subject and siblings.
    pub fn verify(&self) -> bool {
        if self.lemma.len() != self.path.len() + 1 {
            return false;
        }
        let computed = self
            .path
            .iter()
            .zip(&self.lemma)
            .fold(self.subject.clone(), |acc, (is_right, sibling)| {
                if *is_right {
                    node_hash(sibling, &acc)
                } else {
                    node_hash(&acc, sibling)
                }
            });
        Some(&computed) == self.root()
    }
}
