//! Value types for describing bonds between atoms.
//!
//! A bond wires one input slot of one atom to one input slot of another.
//! Bonds are keyed by the pair of atom positions they connect and carry the
//! bond-site on each side.
use std::collections::BTreeMap;
use std::fmt;

/// A location on an atom that can host a bond: the `slot`-th input of node `node`.
///
/// Nodes and slots are 0-indexed and local to the owning atom.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BondSite {
    pub node: usize,
    pub slot: usize,
}

impl BondSite {
    pub const fn new(node: usize, slot: usize) -> Self {
        Self { node, slot }
    }
}

impl fmt::Display for BondSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.node, self.slot)
    }
}

impl From<(usize, usize)> for BondSite {
    fn from((node, slot): (usize, usize)) -> Self {
        Self::new(node, slot)
    }
}

/// Bond map: `(atom_a, atom_b) -> (site on atom_a, site on atom_b)`.
///
/// # Invariants
///
/// Inside a [`Molecule`][crate::molecule::Molecule] every key satisfies
/// `atom_a < atom_b`. Input maps handed to the constructor may use either order.
pub type Bonds = BTreeMap<(usize, usize), (BondSite, BondSite)>;
