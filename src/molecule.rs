//! Molecules: several [`Rbn`] atoms wired together into one composite network.
//!
//! # Composition
//!
//! The composite network is the concatenation of all atoms, in canonical order:
//! node `i` of atom `a` becomes global node `offset(a) + i`, where `offset(a)` is
//! the total node count of the atoms before `a`. Every atom's input indices are
//! shifted by the same offset, so before bonding the atoms are disconnected.
//!
//! A bond `(a, b) -> ((i_a, j_a), (i_b, j_b))` then rewires two input slots:
//! slot `j_a` of node `i_a` of atom `a` reads global node `offset(b) + i_b`, and
//! slot `j_b` of node `i_b` of atom `b` reads global node `offset(a) + i_a`.
//!
//! # Canonical form
//!
//! Atoms are sorted by the [`Rbn`] order and bond keys are remapped accordingly,
//! with the lower atom position first. Equal atoms can trade places without
//! changing the molecule, so among those relabellings the one with the smallest
//! bond map is kept. Two bonds between identical atoms with their bond-sites
//! exchanged therefore give equal molecules.
//!
//! After the attractor cycle is computed, the network is moved to the smallest
//! state of that cycle, so structurally identical molecules share a phase.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use log::{debug, trace};
use rand::Rng;

use crate::error::{Error, Result};
use crate::rbn::Rbn;
use crate::state::State;
use crate::types::{BondSite, Bonds};

/// One or more atoms joined by bonds.
///
/// Equality and hashing consider only `atoms` and `bonds`; the composite network
/// and the cycle are derived from them.
#[derive(Debug, Clone)]
pub struct Molecule {
    atoms: Vec<Rbn>,
    bonds: Bonds,
    offsets: Vec<usize>,
    network: Rbn,
    cycle: Vec<State>,
}

impl Molecule {
    /// Builds a canonical molecule from atoms and bonds.
    ///
    /// Bond keys may name their atoms in either order. Fails if `atoms` is empty,
    /// if a bond references a missing atom, pairs an atom with itself, names a
    /// bond-site outside its atom, or if two keys collapse onto the same pair.
    pub fn new(atoms: Vec<Rbn>, bonds: Bonds) -> Result<Self> {
        if atoms.is_empty() {
            return Err(Error::NoAtoms);
        }
        let count = atoms.len();
        let mut seen = BTreeSet::new();
        for (&(a, b), &(site_a, site_b)) in &bonds {
            for atom in [a, b] {
                if atom >= count {
                    return Err(Error::BondOutOfRange { atom, count });
                }
            }
            if a == b {
                return Err(Error::SelfBond { atom: a });
            }
            if !seen.insert((a.min(b), a.max(b))) {
                return Err(Error::DuplicateBond {
                    first: a.min(b),
                    second: a.max(b),
                });
            }
            for (atom, site) in [(a, site_a), (b, site_b)] {
                let rbn = &atoms[atom];
                let valid = rbn.inputs().get(site.node).is_some_and(|ins| site.slot < ins.len());
                if !valid {
                    return Err(Error::InvalidBondSite { atom, site });
                }
            }
        }
        Ok(Self::assemble(atoms, bonds))
    }

    /// Builds a molecule holding a single randomly generated atom of `n` nodes with `k` inputs each.
    pub fn from_random<R: Rng>(rng: &mut R, n: usize, k: usize) -> Self {
        Self::assemble(vec![Rbn::random(rng, n, k)], Bonds::new())
    }

    /// Builds a molecule from an atom with no bonds.
    pub fn from_atom(atom: Rbn) -> Self {
        Self::assemble(vec![atom], Bonds::new())
    }

    /// Canonicalizes and composes already-validated atoms and bonds.
    pub(crate) fn assemble(atoms: Vec<Rbn>, bonds: Bonds) -> Self {
        debug_assert!(!atoms.is_empty());

        // Sort atoms, keeping track of where each original position ends up
        let mut order: Vec<usize> = (0..atoms.len()).collect();
        order.sort_by(|&x, &y| atoms[x].cmp(&atoms[y]));
        let mut position = vec![0; atoms.len()];
        for (sorted, &original) in order.iter().enumerate() {
            position[original] = sorted;
        }
        let mut slots: Vec<Option<Rbn>> = atoms.into_iter().map(Some).collect();
        let atoms: Vec<Rbn> = order.iter().filter_map(|&i| slots[i].take()).collect();

        let bonds = relabel(&bonds, &position);
        let bonds = smallest_relabelling(&atoms, bonds);
        debug!("assemble: atom order {:?}, bonds {:?}", order, bonds);

        let mut offsets = Vec::with_capacity(atoms.len());
        let mut total = 0;
        for atom in &atoms {
            offsets.push(total);
            total += atom.n();
        }

        let mut inputs: Vec<Vec<usize>> = Vec::with_capacity(total);
        for (atom, &offset) in atoms.iter().zip(&offsets) {
            for ins in atom.inputs() {
                inputs.push(ins.iter().map(|&j| j + offset).collect());
            }
        }
        for (&(a, b), &(site_a, site_b)) in &bonds {
            let node_a = offsets[a] + site_a.node;
            let node_b = offsets[b] + site_b.node;
            inputs[node_a][site_a.slot] = node_b;
            inputs[node_b][site_b.slot] = node_a;
        }

        let states = State::concat(atoms.iter().map(Rbn::states));
        let funcs = atoms.iter().flat_map(|a| a.funcs().iter().cloned()).collect();
        let network = Rbn::from_parts(states, inputs, funcs);

        let cycle = network.cycle();
        let network = match cycle.iter().min() {
            Some(lowest) => network.with_state(lowest.clone()),
            None => network,
        };
        trace!("assemble: cycle of length {} anchored at {}", cycle.len(), network.states());

        Self {
            atoms,
            bonds,
            offsets,
            network,
            cycle,
        }
    }

    /// Atoms in canonical order.
    pub fn atoms(&self) -> &[Rbn] {
        &self.atoms
    }

    /// Bonds keyed by canonical atom positions, lower position first.
    pub fn bonds(&self) -> &Bonds {
        &self.bonds
    }

    /// Number of atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Always `false`: construction rejects molecules without atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Total number of nodes over all atoms.
    pub fn node_count(&self) -> usize {
        self.network.n()
    }

    /// Global index of the first node of atom `atom`.
    pub fn offset(&self, atom: usize) -> usize {
        self.offsets[atom]
    }

    /// The composite network, positioned at the smallest state of its cycle.
    pub fn network(&self) -> &Rbn {
        &self.network
    }

    /// The attractor cycle in discovery order, starting at the repeated state.
    pub fn cycle(&self) -> &[State] {
        &self.cycle
    }

    /// The current (anchored) state of the composite network.
    pub fn state(&self) -> &State {
        self.network.states()
    }

    /// Bond-sites of atom `atom` that are already used by a bond of this molecule.
    pub fn used_bond_sites(&self, atom: usize) -> impl Iterator<Item = BondSite> + '_ {
        self.bonds.iter().flat_map(move |(&(a, b), &(site_a, site_b))| {
            let first = (a == atom).then_some(site_a);
            let second = (b == atom).then_some(site_b);
            first.into_iter().chain(second)
        })
    }
}

/// Moves every bond to the atom positions given by `label`, lower position first.
fn relabel(bonds: &Bonds, label: &[usize]) -> Bonds {
    bonds
        .iter()
        .map(|(&(a, b), &(site_a, site_b))| {
            let (a, b) = (label[a], label[b]);
            if a < b {
                ((a, b), (site_a, site_b))
            } else {
                ((b, a), (site_b, site_a))
            }
        })
        .collect()
}

/// All orderings of `items`.
fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for (i, &first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for tail in permutations(&rest) {
            let mut perm = Vec::with_capacity(items.len());
            perm.push(first);
            perm.extend(tail);
            result.push(perm);
        }
    }
    result
}

/// Upper bound on the relabellings of equal atoms tried by [`smallest_relabelling`].
const MAX_RELABELLINGS: usize = 5040;

/// Exchanging the positions of two equal atoms gives the same molecule, so among
/// all such exchanges pick the one with the smallest bond map.
///
/// `atoms` must be sorted. If there are more than [`MAX_RELABELLINGS`] candidates,
/// the bonds are returned unchanged.
fn smallest_relabelling(atoms: &[Rbn], bonds: Bonds) -> Bonds {
    if bonds.is_empty() {
        return bonds;
    }

    // Runs of equal atoms, each with every ordering of its positions
    let mut runs: Vec<(usize, Vec<Vec<usize>>)> = Vec::new();
    let mut total = 1usize;
    let mut start = 0;
    while start < atoms.len() {
        let mut end = start + 1;
        while end < atoms.len() && atoms[end] == atoms[start] {
            end += 1;
        }
        if end - start > 1 {
            let perms = permutations(&(start..end).collect::<Vec<_>>());
            total = total.saturating_mul(perms.len());
            if total > MAX_RELABELLINGS {
                debug!("assemble: {} relabellings of equal atoms, keeping bonds as is", total);
                return bonds;
            }
            runs.push((start, perms));
        }
        start = end;
    }
    if runs.is_empty() {
        return bonds;
    }

    let mut best = bonds.clone();
    let mut choice = vec![0; runs.len()];
    let mut label: Vec<usize> = (0..atoms.len()).collect();
    loop {
        for ((start, perms), &c) in runs.iter().zip(&choice) {
            label[*start..*start + perms[c].len()].copy_from_slice(&perms[c]);
        }
        let candidate = relabel(&bonds, &label);
        if candidate < best {
            best = candidate;
        }

        // Advance to the next combination of run orderings
        let mut r = 0;
        while r < runs.len() {
            choice[r] += 1;
            if choice[r] < runs[r].1.len() {
                break;
            }
            choice[r] = 0;
            r += 1;
        }
        if r == runs.len() {
            return best;
        }
    }
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        self.atoms == other.atoms && self.bonds == other.bonds
    }
}

impl Eq for Molecule {}

impl Hash for Molecule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.atoms.hash(state);
        self.bonds.hash(state);
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Molecule([")?;
        for (i, atom) in self.atoms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", atom)?;
        }
        write!(f, "], {{")?;
        for (i, (&(a, b), &(site_a, site_b))) in self.bonds.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {}): ({}, {})", a, b, site_a, site_b)?;
        }
        write!(f, "}})")
    }
}
