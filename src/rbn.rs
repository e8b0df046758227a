//! Random Boolean Networks.
//!
//! An [`Rbn`] is a set of `n` boolean nodes updated synchronously. Node `i` reads
//! the current values of the nodes listed in `inputs[i]` and feeds them, slot by
//! slot, into its update function `funcs[i]`. Starting from the initial state the
//! trajectory is eventually periodic; [`Rbn::cycle`] returns the periodic part.
//!
//! The same type serves both as a single atom of a molecule and as the composite
//! network obtained by wiring several atoms together.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use rand::Rng;

use crate::error::{Error, Result};
use crate::function::TruthTable;
use crate::state::State;

/// A boolean network with explicit wiring.
///
/// # Invariants
///
/// - `states`, `inputs` and `funcs` all have length `n`
/// - every input index is in `0..n`
/// - `funcs[i].arity() == inputs[i].len()`
///
/// The derived order compares initial states first, then wiring, then functions.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rbn {
    states: State,
    inputs: Vec<Vec<usize>>,
    funcs: Vec<TruthTable>,
}

impl Rbn {
    /// Creates a network from explicit data, validating the invariants.
    pub fn new(states: State, inputs: Vec<Vec<usize>>, funcs: Vec<TruthTable>) -> Result<Self> {
        let n = states.len();
        if inputs.len() != n || funcs.len() != n {
            return Err(Error::InvalidNetwork(format!(
                "{} states, {} input lists, {} functions",
                n,
                inputs.len(),
                funcs.len()
            )));
        }
        for (i, (ins, func)) in inputs.iter().zip(&funcs).enumerate() {
            if let Some(&bad) = ins.iter().find(|&&j| j >= n) {
                return Err(Error::InvalidNetwork(format!(
                    "node {} reads from node {} but there are only {} nodes",
                    i, bad, n
                )));
            }
            if func.arity() != ins.len() {
                return Err(Error::InvalidNetwork(format!(
                    "node {} has {} inputs but a function of arity {}",
                    i,
                    ins.len(),
                    func.arity()
                )));
            }
        }
        Ok(Self { states, inputs, funcs })
    }

    /// Creates a network from parts already known to satisfy the invariants.
    pub(crate) fn from_parts(states: State, inputs: Vec<Vec<usize>>, funcs: Vec<TruthTable>) -> Self {
        debug_assert_eq!(inputs.len(), states.len());
        debug_assert_eq!(funcs.len(), states.len());
        debug_assert!(inputs.iter().flatten().all(|&j| j < states.len()));
        Self { states, inputs, funcs }
    }

    /// Generates a random network of `n` nodes with `k` inputs each.
    ///
    /// Inputs are drawn uniformly from `0..n`, so a node may read from itself.
    pub fn random<R: Rng>(rng: &mut R, n: usize, k: usize) -> Self {
        let states: State = (0..n).map(|_| rng.random::<bool>()).collect();
        let inputs: Vec<Vec<usize>> = (0..n)
            .map(|_| (0..k).map(|_| rng.random_range(0..n)).collect())
            .collect();
        let funcs = (0..n).map(|_| TruthTable::random(rng, k)).collect();
        Self { states, inputs, funcs }
    }

    /// Number of nodes.
    pub fn n(&self) -> usize {
        self.states.len()
    }

    /// Number of inputs per node (taken from node 0, zero for an empty network).
    pub fn k(&self) -> usize {
        self.inputs.first().map_or(0, Vec::len)
    }

    /// The current state.
    pub fn states(&self) -> &State {
        &self.states
    }

    pub fn inputs(&self) -> &[Vec<usize>] {
        &self.inputs
    }

    pub fn funcs(&self) -> &[TruthTable] {
        &self.funcs
    }

    /// Returns the same network positioned at another state.
    ///
    /// # Panics
    ///
    /// Panics if `state` does not have `n` nodes.
    pub fn with_state(&self, state: State) -> Self {
        assert_eq!(state.len(), self.n(), "State size must match the network size");
        Self {
            states: state,
            inputs: self.inputs.clone(),
            funcs: self.funcs.clone(),
        }
    }

    /// Computes the successor of `state` under synchronous update.
    pub fn step(&self, state: &State) -> State {
        self.inputs
            .iter()
            .zip(&self.funcs)
            .map(|(ins, func)| func.apply(ins.iter().map(|&j| state.as_slice()[j])))
            .collect()
    }

    /// Iterates from the current state until a state repeats and returns the
    /// attractor: the states from the first occurrence of the repeated state onward.
    ///
    /// There is no iteration limit; the cost is bounded only by the state space.
    pub fn cycle(&self) -> Vec<State> {
        let mut seen: HashMap<State, usize> = HashMap::new();
        let mut trajectory: Vec<State> = Vec::new();
        let mut current = self.states.clone();
        let start = loop {
            if let Some(&index) = seen.get(&current) {
                break index;
            }
            seen.insert(current.clone(), trajectory.len());
            let next = self.step(&current);
            trajectory.push(current);
            current = next;
        };
        debug!(
            "cycle: n = {}, transient = {}, period = {}",
            self.n(),
            start,
            trajectory.len() - start
        );
        trajectory.split_off(start)
    }
}

impl fmt::Display for Rbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rbn({}, {:?}, [", self.states, self.inputs)?;
        for (i, func) in self.funcs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", func)?;
        }
        write!(f, "])")
    }
}
