//! Grain LFSR parameter generation for Poseidon over BN254.
//!
//! Round constants and the Cauchy MDS matrix are derived from an 80-bit
//! self-shrinking Grain LFSR seeded with the instance description
//! (field type, S-box, field size, width, round counts). The derivation is
//! the one the circom toolchain uses, so the resulting constants are
//! identical to those baked into the circuits.

use num_bigint::BigUint;

use fim_core::FieldElement;

/// Number of bits in a field element of the BN254 scalar field.
const FIELD_BITS: u32 = 254;

/// Steps discarded after seeding.
const WARMUP_STEPS: usize = 160;

const STATE_BITS: usize = 80;

/// Generated constants for one state width.
#[derive(Debug, Clone)]
pub(crate) struct PoseidonParameters {
    pub(crate) width: usize,
    pub(crate) full_rounds: usize,
    pub(crate) partial_rounds: usize,
    /// `(full_rounds + partial_rounds) * width` additive round constants.
    pub(crate) round_constants: Vec<FieldElement>,
    /// `width x width` mixing matrix, row-major.
    pub(crate) mds: Vec<Vec<FieldElement>>,
}

struct Grain {
    state: [bool; STATE_BITS],
    head: usize,
}

impl Grain {
    fn new(width: usize, full_rounds: usize, partial_rounds: usize) -> Self {
        let mut seed = Vec::with_capacity(STATE_BITS);
        let mut push = |value: u64, bits: u32| {
            for i in (0..bits).rev() {
                seed.push((value >> i) & 1 == 1);
            }
        };
        // Prime field, x^alpha S-box, 254-bit field.
        push(1, 2);
        push(0, 4);
        push(u64::from(FIELD_BITS), 12);
        push(width as u64, 12);
        push(full_rounds as u64, 10);
        push(partial_rounds as u64, 10);
        push((1 << 30) - 1, 30);

        let mut state = [false; STATE_BITS];
        state.copy_from_slice(&seed);
        let mut grain = Self { state, head: 0 };
        for _ in 0..WARMUP_STEPS {
            grain.step();
        }
        grain
    }

    fn tap(&self, offset: usize) -> bool {
        self.state[(self.head + offset) % STATE_BITS]
    }

    /// Shift in `b0 ^ b13 ^ b23 ^ b38 ^ b51 ^ b62` and return it.
    fn step(&mut self) -> bool {
        let bit = self.tap(62) ^ self.tap(51) ^ self.tap(38) ^ self.tap(23) ^ self.tap(13)
            ^ self.tap(0);
        self.state[self.head] = bit;
        self.head = (self.head + 1) % STATE_BITS;
        bit
    }

    /// Self-shrinking output: pairs whose first bit is zero are discarded.
    fn next_bit(&mut self) -> bool {
        let mut selector = self.step();
        while !selector {
            self.step();
            selector = self.step();
        }
        self.step()
    }

    fn next_biguint(&mut self) -> BigUint {
        let mut value = BigUint::default();
        for _ in 0..FIELD_BITS {
            value <<= 1u32;
            if self.next_bit() {
                value += 1u32;
            }
        }
        value
    }

    /// Rejection-sample a canonical field element.
    fn next_field_rejecting(&mut self) -> FieldElement {
        loop {
            if let Ok(fe) = FieldElement::try_from_biguint(self.next_biguint()) {
                return fe;
            }
        }
    }

    fn next_field_reduced(&mut self) -> FieldElement {
        FieldElement::from_biguint_reduced(self.next_biguint())
    }
}

fn has_duplicates(values: &[FieldElement]) -> bool {
    let mut sorted: Vec<&FieldElement> = values.iter().collect();
    sorted.sort();
    sorted.windows(2).any(|w| w[0] == w[1])
}

/// Derive the constants for a state of `width` elements.
pub(crate) fn generate(width: usize, full_rounds: usize, partial_rounds: usize) -> PoseidonParameters {
    let mut grain = Grain::new(width, full_rounds, partial_rounds);

    let total = (full_rounds + partial_rounds) * width;
    let round_constants: Vec<FieldElement> =
        (0..total).map(|_| grain.next_field_rejecting()).collect();

    let mds = loop {
        let mut samples: Vec<FieldElement> =
            (0..2 * width).map(|_| grain.next_field_reduced()).collect();
        while has_duplicates(&samples) {
            samples = (0..2 * width).map(|_| grain.next_field_reduced()).collect();
        }
        let (xs, ys) = samples.split_at(width);

        // (x_i + y_j)^-1 exists for every pair or the candidate is dropped.
        let matrix: Option<Vec<Vec<FieldElement>>> = xs
            .iter()
            .map(|x| ys.iter().map(|y| (x + y).inverse()).collect())
            .collect();
        if let Some(matrix) = matrix {
            break matrix;
        }
    };

    PoseidonParameters {
        width,
        full_rounds,
        partial_rounds,
        round_constants,
        mds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_counts() {
        let params = generate(3, 8, 57);
        assert_eq!(params.round_constants.len(), (8 + 57) * 3);
        assert_eq!(params.mds.len(), 3);
        assert!(params.mds.iter().all(|row| row.len() == 3));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate(2, 8, 56);
        let b = generate(2, 8, 56);
        assert_eq!(a.round_constants, b.round_constants);
        assert_eq!(a.mds, b.mds);
    }

    #[test]
    fn test_first_round_constant_width_two() {
        // First ARK constant of the circom t = 2 instance.
        let params = generate(2, 8, 56);
        assert_eq!(
            params.round_constants[0].to_string(),
            "4417881134626180770308697923359573201005643519861877412381846989312604493735"
        );
    }

    #[test]
    fn test_mds_has_no_zero_entries() {
        let params = generate(4, 8, 56);
        assert!(params.mds.iter().flatten().all(|m| !m.is_zero()));
    }
}
