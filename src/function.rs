//! Node update functions.
//!
//! An update function `f: {0,1}^k → {0,1}` is represented by its truth table,
//! a vector of `2^k` bits indexed by the input assignments.

use std::fmt;

use num_bigint::BigUint;
use rand::Rng;

/// A truth table for a Boolean function of `k` inputs.
///
/// Bit `i` of the table is `f(b_{k-1}, ..., b_0)` where `i = b_{k-1} * 2^{k-1} + ... + b_0`
/// and `b_j` is the value read through input slot `j`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TruthTable {
    /// Number of inputs
    k: usize,
    /// The truth table as a big integer (2^k bits)
    bits: BigUint,
}

impl TruthTable {
    /// Create a new truth table from a big integer.
    ///
    /// Bits above `2^k` are discarded.
    pub fn new(k: usize, bits: BigUint) -> Self {
        let mask = (BigUint::from(1u8) << (1usize << k)) - 1u8;
        Self { k, bits: bits & mask }
    }

    /// Create a table from explicit outputs, `outputs[i]` being the value at input `i`.
    ///
    /// # Panics
    ///
    /// Panics if `outputs.len()` is not a power of two.
    pub fn from_outputs(outputs: &[bool]) -> Self {
        assert!(outputs.len().is_power_of_two(), "Truth table size must be a power of two");
        let k = outputs.len().trailing_zeros() as usize;
        let mut bits = BigUint::default();
        for (i, &b) in outputs.iter().enumerate() {
            if b {
                bits.set_bit(i as u64, true);
            }
        }
        Self { k, bits }
    }

    /// Create the constant function of `k` inputs.
    pub fn constant(k: usize, value: bool) -> Self {
        if value {
            let bits = (BigUint::from(1u8) << (1usize << k)) - 1u8;
            Self { k, bits }
        } else {
            Self { k, bits: BigUint::default() }
        }
    }

    /// Generate a uniformly random function of `k` inputs.
    pub fn random<R: Rng>(rng: &mut R, k: usize) -> Self {
        let num_bits = 1usize << k;
        let num_bytes = num_bits.div_ceil(8);
        let mut bytes = vec![0u8; num_bytes];
        rng.fill(&mut bytes[..]);

        // Mask off extra bits if num_bits is not a multiple of 8
        if num_bits % 8 != 0 {
            let mask = (1u8 << (num_bits % 8)) - 1;
            bytes[num_bytes - 1] &= mask;
        }

        Self {
            k,
            bits: BigUint::from_bytes_le(&bytes),
        }
    }

    /// Number of inputs.
    pub fn arity(&self) -> usize {
        self.k
    }

    /// Get the value of the function at input `i`.
    pub fn eval(&self, i: usize) -> bool {
        assert!(i < (1 << self.k), "Input index out of range");
        self.bits.bit(i as u64)
    }

    /// Evaluate the function on input values given slot by slot.
    pub fn apply(&self, inputs: impl IntoIterator<Item = bool>) -> bool {
        let index = inputs
            .into_iter()
            .enumerate()
            .fold(0usize, |acc, (j, b)| acc | ((b as usize) << j));
        self.eval(index)
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..(1usize << self.k) {
            f.write_str(if self.bits.bit(i as u64) { "1" } else { "0" })?;
        }
        Ok(())
    }
}
