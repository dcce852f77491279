//! # Poseidon — SNARK-Friendly Field Hash
//!
//! Poseidon over the BN254 scalar field with the x^5 S-box, compatible
//! with circomlib's `Poseidon(n)` template for `n` in `1..=16`.
//!
//! A [`PoseidonHash`] with block size `b` runs a permutation of width
//! `t = b + 1`: the state starts as `[0, in_0, .., in_{b-1}]`, passes through
//! 4 full rounds, `R_P[t]` partial rounds and 4 more full rounds, and
//! element 0 of the final state is the output.
//!
//! ## Parameters
//!
//! Round constants and MDS matrices are derived by the Grain LFSR the
//! first time a width is used and cached for the lifetime of
//! the process. The permutation applies them round by round; this produces
//! the same outputs as the sparse-matrix form compiled into circuits.
//!
//! ## Digest
//!
//! [`PoseidonHash::digest`] compresses an arbitrary number of inputs by
//! hashing windows of `b` values level by level, like a `b`-ary Merkle
//! tree. See its documentation for the padding rule.

mod grain;

use std::sync::OnceLock;

use fim_core::FieldElement;

use crate::error::CryptoError;
use grain::PoseidonParameters;

/// Largest supported block size (state width 17).
pub const MAX_BLOCK_SIZE: usize = 16;

/// Full rounds for every width.
const FULL_ROUNDS: usize = 8;

/// Partial rounds indexed by `t - 2`.
const PARTIAL_ROUNDS: [usize; MAX_BLOCK_SIZE] =
    [56, 57, 56, 60, 60, 63, 64, 63, 60, 66, 60, 65, 70, 60, 64, 68];

#[allow(clippy::declare_interior_mutable_const)]
const UNINIT: OnceLock<PoseidonParameters> = OnceLock::new();

/// Lazily generated parameters indexed by `block_size - 1`.
static PARAMETERS: [OnceLock<PoseidonParameters>; MAX_BLOCK_SIZE] = [UNINIT; MAX_BLOCK_SIZE];

fn parameters(block_size: usize) -> &'static PoseidonParameters {
    let width = block_size + 1;
    PARAMETERS[block_size - 1]
        .get_or_init(|| grain::generate(width, FULL_ROUNDS, PARTIAL_ROUNDS[width - 2]))
}

fn permute(params: &PoseidonParameters, inputs: &[FieldElement]) -> FieldElement {
    let width = params.width;
    let half_full = params.full_rounds / 2;
    let total_rounds = params.full_rounds + params.partial_rounds;

    let mut state = Vec::with_capacity(width);
    state.push(FieldElement::zero());
    state.extend(inputs.iter().cloned());

    for round in 0..total_rounds {
        let constants = &params.round_constants[round * width..(round + 1) * width];
        for (element, constant) in state.iter_mut().zip(constants) {
            *element = &*element + constant;
        }

        if round < half_full || round >= half_full + params.partial_rounds {
            for element in state.iter_mut() {
                *element = element.pow5();
            }
        } else {
            state[0] = state[0].pow5();
        }

        state = params
            .mds
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&state)
                    .fold(FieldElement::zero(), |acc, (m, s)| &acc + &(m * s))
            })
            .collect();
    }

    state.swap_remove(0)
}

/// Fixed-width permutation for internal callers whose arity is static.
pub(crate) fn hash_fixed<const N: usize>(inputs: [&FieldElement; N]) -> FieldElement {
    let owned: Vec<FieldElement> = inputs.into_iter().cloned().collect();
    permute(parameters(N), &owned)
}

/// A Poseidon hasher for a fixed block size.
#[derive(Clone, Copy)]
pub struct PoseidonHash {
    block_size: usize,
    params: &'static PoseidonParameters,
}

impl PoseidonHash {
    /// Create a hasher for `block_size` inputs per permutation.
    pub fn new(block_size: usize) -> Result<Self, CryptoError> {
        if !(1..=MAX_BLOCK_SIZE).contains(&block_size) {
            return Err(CryptoError::InvalidBlockSize(block_size));
        }
        Ok(Self {
            block_size,
            params: parameters(block_size),
        })
    }

    /// Inputs consumed by a single [`hash`](Self::hash) call.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Hash exactly `block_size` inputs.
    pub fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
        if inputs.len() != self.block_size {
            return Err(CryptoError::InputArity {
                expected: self.block_size,
                actual: inputs.len(),
            });
        }
        Ok(permute(self.params, inputs))
    }

    /// Compress any non-empty sequence of inputs.
    ///
    /// With block size 1 exactly one input is accepted. Otherwise the
    /// inputs are padded with zeros to the smallest power `b^k` (`k >= 1`)
    /// that holds them; when padding was added, the last padding slot
    /// carries the original input count. Windows of `b` values are then
    /// hashed level by level until one value remains.
    pub fn digest(&self, inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
        if inputs.is_empty() {
            return Err(CryptoError::EmptyInput("digest requires at least one input"));
        }
        if self.block_size == 1 {
            return self.hash(inputs);
        }

        let count = inputs.len();
        let mut padded_len = self.block_size;
        while padded_len < count {
            padded_len = padded_len.saturating_mul(self.block_size);
        }

        let mut level = inputs.to_vec();
        if padded_len > count {
            level.resize(padded_len, FieldElement::zero());
            level[padded_len - 1] = FieldElement::from_u64(count as u64);
        }

        while level.len() > 1 {
            level = level
                .chunks(self.block_size)
                .map(|window| permute(self.params, window))
                .collect();
        }
        Ok(level.swap_remove(0))
    }
}

impl std::fmt::Debug for PoseidonHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseidonHash")
            .field("block_size", &self.block_size)
            .finish()
    }
}

/// Hash all `inputs` in a single permutation (block size = input count).
pub fn digest(inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
    if inputs.is_empty() {
        return Err(CryptoError::EmptyInput("digest requires at least one input"));
    }
    PoseidonHash::new(inputs.len())?.digest(inputs)
}

/// Hash a string through its byte-reinterpreted field encoding.
pub fn digest_str(text: &str) -> FieldElement {
    hash_fixed([&FieldElement::from_text(text)])
}
