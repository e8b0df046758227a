//! Boolean state vectors of a network.

use std::fmt;

use num_bigint::BigUint;

/// The values of all nodes of a network at one time step.
///
/// States are ordered lexicographically with `false < true`, which coincides
/// with the numeric order of [`State::value`].
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct State(Vec<bool>);

impl State {
    pub fn new(values: Vec<bool>) -> Self {
        Self(values)
    }

    /// Creates a state of `n` nodes all set to `value`.
    pub fn filled(n: usize, value: bool) -> Self {
        Self(vec![value; n])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value of node `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Number of nodes set to `true`.
    pub fn count_ones(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    /// Interprets the state as a binary number, node 0 being the most significant bit.
    pub fn value(&self) -> BigUint {
        let mut value = BigUint::default();
        for (i, b) in self.0.iter().rev().enumerate() {
            if *b {
                value.set_bit(i as u64, true);
            }
        }
        value
    }

    /// Concatenates several states into one.
    pub fn concat<'a>(states: impl IntoIterator<Item = &'a State>) -> Self {
        Self(states.into_iter().flat_map(|s| s.0.iter().copied()).collect())
    }
}

impl From<Vec<bool>> for State {
    fn from(values: Vec<bool>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<bool> for State {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}
