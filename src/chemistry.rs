//! Reaction rules for RBN molecules.
//!
//! Two molecules react by bonding one open bond-site of an atom in each. An open
//! bond-site is an input slot that, in the atom's own wiring, reads from its own
//! node and is not yet used by a bond. Whether a bond forms, and whether an
//! existing bond survives, is decided by comparing the [activity scores][RbnChemistry::score]
//! of the two atoms it connects: the bond holds when the scores differ by less
//! than the configured tolerance.
//!
//! ## Operations
//!
//! - [`react`][Chemistry::react] picks random atoms and bond-sites and either bonds
//!   the two molecules or reports an elastic collision (`Ok(None)`).
//! - [`stabilize`][Chemistry::stabilize] breaks incompatible bonds and splits the
//!   molecule into connected fragments, recursively, until every fragment is stable.
//! - [`all_reactions`][Chemistry::all_reactions] enumerates every bond the two
//!   reactants could form, counting how many choices lead to each product.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, trace};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::molecule::Molecule;
use crate::reaction::Reaction;
use crate::types::{BondSite, Bonds};

/// A reaction model over some kind of species.
///
/// Simulation drivers hold a population of species and only talk to the
/// chemistry through this interface, so alternative models can be swapped in.
pub trait Chemistry {
    type Species;

    /// Reacts two species. Returns `Ok(None)` for an elastic collision.
    fn react<R: Rng>(
        &self,
        reactants: &[Self::Species],
        rng: &mut R,
    ) -> Result<Option<Reaction<Self::Species>>>;

    /// Decomposes a species into stable fragments. Never returns an empty vector.
    fn stabilize(&self, species: &Self::Species) -> Vec<Self::Species>;

    /// Enumerates every possible reaction of two species with its multiplicity.
    fn all_reactions(
        &self,
        reactants: &[Self::Species],
    ) -> Result<HashMap<Reaction<Self::Species>, usize>>;
}

/// Configuration for [`RbnChemistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RbnChemistryConfig {
    /// Bonds form and survive when the scores differ by strictly less than this.
    pub tolerance: u64,
    /// Flip a coin in `react` to decide which reactant is treated as first.
    pub swap_reactants: bool,
    /// Pass the product of a successful `react` through `stabilize`.
    pub stabilize_products: bool,
}

impl RbnChemistryConfig {
    pub fn new() -> Self {
        Self {
            tolerance: 1,
            swap_reactants: false,
            stabilize_products: false,
        }
    }

    /// Set the score tolerance.
    pub fn with_tolerance(mut self, tolerance: u64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enable or disable the random reactant swap.
    pub fn with_swap_reactants(mut self, swap: bool) -> Self {
        self.swap_reactants = swap;
        self
    }

    /// Enable or disable stabilization of reaction products.
    pub fn with_stabilize_products(mut self, stabilize: bool) -> Self {
        self.stabilize_products = stabilize;
        self
    }
}

impl Default for RbnChemistryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Artificial chemistry of [`Molecule`]s.
#[derive(Debug, Clone, Default)]
pub struct RbnChemistry {
    config: RbnChemistryConfig,
}

impl RbnChemistry {
    pub fn new(config: RbnChemistryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RbnChemistryConfig {
        &self.config
    }

    fn compatible(&self, score_a: i64, score_b: i64) -> bool {
        score_a.abs_diff(score_b) < self.config.tolerance
    }

    /// Activity score of atom `atom` over the molecule's cycle.
    ///
    /// For every state of the cycle, each node in the window
    /// `offset + 1 ..= offset + n` adds 1 when true and subtracts 1 when false,
    /// where `offset` is the atom's first global node and `n` its node count.
    /// The window starts one node into the atom and runs one node past it;
    /// positions past the end of the network are skipped.
    pub fn score(&self, mol: &Molecule, atom: usize) -> i64 {
        let n_pre = mol.offset(atom);
        let n_size = mol.atoms()[atom].n();
        mol.cycle()
            .iter()
            .map(|state| {
                (n_pre + 1..=n_pre + n_size)
                    .filter_map(|i| state.get(i))
                    .map(|b| if b { 1 } else { -1 })
                    .sum::<i64>()
            })
            .sum()
    }

    /// Open bond-sites of atom `atom`, node-major then slot-minor.
    pub fn bond_sites(&self, mol: &Molecule, atom: usize) -> Vec<BondSite> {
        let used: BTreeSet<BondSite> = mol.used_bond_sites(atom).collect();
        let rbn = &mol.atoms()[atom];
        let mut sites = Vec::new();
        for (node, ins) in rbn.inputs().iter().enumerate() {
            for (slot, &input) in ins.iter().enumerate() {
                // Only self-wired inputs can be replaced
                let site = BondSite::new(node, slot);
                if input == node && !used.contains(&site) {
                    sites.push(site);
                }
            }
        }
        sites
    }

    /// Joins two molecules with a new bond between `site_a` on atom `atom_a` of
    /// `mol_a` and `site_b` on atom `atom_b` of `mol_b`.
    ///
    /// The atoms of `mol_b` follow those of `mol_a` before canonicalization.
    pub fn bond(
        &self,
        mol_a: &Molecule,
        mol_b: &Molecule,
        atom_a: usize,
        atom_b: usize,
        site_a: BondSite,
        site_b: BondSite,
    ) -> Result<Molecule> {
        let offset = mol_a.len();
        let atoms = mol_a.atoms().iter().chain(mol_b.atoms()).cloned().collect();
        let mut bonds = mol_a.bonds().clone();
        bonds.extend(
            mol_b
                .bonds()
                .iter()
                .map(|(&(a, b), &sites)| ((a + offset, b + offset), sites)),
        );
        bonds.insert((atom_a, atom_b + offset), (site_a, site_b));
        Molecule::new(atoms, bonds)
    }

    fn expect_pair<'a>(reactants: &'a [Molecule]) -> Result<(&'a Molecule, &'a Molecule)> {
        match reactants {
            [a, b] => Ok((a, b)),
            _ => Err(Error::ReactantCount {
                expected: 2,
                actual: reactants.len(),
            }),
        }
    }
}

/// Disjoint sets over atom positions. The root of each set is its smallest member.
struct Components {
    parent: Vec<usize>,
}

impl Components {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }

    /// Groups members by set, ordered by smallest member, each group ascending.
    fn groups(mut self) -> Vec<Vec<usize>> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for x in 0..self.parent.len() {
            let root = self.find(x);
            groups.entry(root).or_default().push(x);
        }
        groups.into_values().collect()
    }
}

impl Chemistry for RbnChemistry {
    type Species = Molecule;

    fn react<R: Rng>(&self, reactants: &[Molecule], rng: &mut R) -> Result<Option<Reaction<Molecule>>> {
        let (first, second) = Self::expect_pair(reactants)?;
        let (mol_a, mol_b) = if self.config.swap_reactants && rng.random_bool(0.5) {
            (second, first)
        } else {
            (first, second)
        };

        let atom_a = rng.random_range(0..mol_a.len());
        let atom_b = rng.random_range(0..mol_b.len());

        let sites_a = self.bond_sites(mol_a, atom_a);
        let sites_b = self.bond_sites(mol_b, atom_b);
        let (Some(&site_a), Some(&site_b)) = (sites_a.choose(rng), sites_b.choose(rng)) else {
            debug!(
                "react: elastic, no bond sites (atom {}: {}, atom {}: {})",
                atom_a,
                sites_a.len(),
                atom_b,
                sites_b.len()
            );
            return Ok(None);
        };

        let score_a = self.score(mol_a, atom_a);
        let score_b = self.score(mol_b, atom_b);
        if !self.compatible(score_a, score_b) {
            debug!("react: elastic, scores {} and {} incompatible", score_a, score_b);
            return Ok(None);
        }

        let product = self.bond(mol_a, mol_b, atom_a, atom_b, site_a, site_b)?;
        debug!(
            "react: bonded atom {} {} with atom {} {} into {} atoms",
            atom_a,
            site_a,
            atom_b,
            site_b,
            product.len()
        );
        let products = if self.config.stabilize_products {
            self.stabilize(&product)
        } else {
            vec![product]
        };
        Ok(Some(Reaction::new(reactants.to_vec(), products)))
    }

    fn stabilize(&self, species: &Molecule) -> Vec<Molecule> {
        if species.len() == 1 {
            return vec![species.clone()];
        }

        let scores: Vec<i64> = (0..species.len()).map(|atom| self.score(species, atom)).collect();
        let to_break: BTreeSet<(usize, usize)> = species
            .bonds()
            .keys()
            .copied()
            .filter(|&(a, b)| {
                trace!("stabilize: bond ({}, {}) scores {} and {}", a, b, scores[a], scores[b]);
                !self.compatible(scores[a], scores[b])
            })
            .collect();

        if to_break.is_empty() {
            return vec![species.clone()];
        }
        debug!("stabilize: breaking {:?} of {} bonds", to_break, species.bonds().len());

        let mut components = Components::new(species.len());
        for &(a, b) in species.bonds().keys() {
            if !to_break.contains(&(a, b)) {
                components.union(a, b);
            }
        }

        let mut products = Vec::new();
        for members in components.groups() {
            let mut local = vec![usize::MAX; species.len()];
            for (i, &atom) in members.iter().enumerate() {
                local[atom] = i;
            }
            let atoms = members.iter().map(|&atom| species.atoms()[atom].clone()).collect();
            let bonds: Bonds = species
                .bonds()
                .iter()
                .filter(|(key, _)| !to_break.contains(*key))
                .filter(|(&(a, b), _)| local[a] != usize::MAX && local[b] != usize::MAX)
                .map(|(&(a, b), &sites)| ((local[a], local[b]), sites))
                .collect();
            let fragment = Molecule::assemble(atoms, bonds);
            products.extend(self.stabilize(&fragment));
        }
        products
    }

    fn all_reactions(&self, reactants: &[Molecule]) -> Result<HashMap<Reaction<Molecule>, usize>> {
        let (mol_a, mol_b) = Self::expect_pair(reactants)?;
        let mut reactions: HashMap<Reaction<Molecule>, usize> = HashMap::new();
        for atom_a in 0..mol_a.len() {
            let sites_a = self.bond_sites(mol_a, atom_a);
            for atom_b in 0..mol_b.len() {
                let sites_b = self.bond_sites(mol_b, atom_b);
                for &site_a in &sites_a {
                    for &site_b in &sites_b {
                        let product = self.bond(mol_a, mol_b, atom_a, atom_b, site_a, site_b)?;
                        let reaction = Reaction::new(reactants.to_vec(), vec![product]);
                        *reactions.entry(reaction).or_insert(0) += 1;
                    }
                }
            }
        }
        debug!("all_reactions: {} distinct reactions", reactions.len());
        Ok(reactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_log::test;

    use crate::function::TruthTable;
    use crate::rbn::Rbn;
    use crate::state::State;

    /// Atom whose nodes hold constant values, each node wired to itself through `k` slots.
    fn constant_atom(values: &[bool], k: usize) -> Rbn {
        Rbn::new(
            State::new(values.to_vec()),
            (0..values.len()).map(|i| vec![i; k]).collect(),
            values.iter().map(|&v| TruthTable::constant(k, v)).collect(),
        )
        .unwrap()
    }

    fn site(node: usize, slot: usize) -> BondSite {
        BondSite::new(node, slot)
    }

    #[test]
    fn test_score_single_node() {
        // The window of a lone one-node atom lies past the end of the network
        let chem = RbnChemistry::default();
        let mol = Molecule::from_atom(constant_atom(&[true], 1));
        assert_eq!(chem.score(&mol, 0), 0);
    }

    #[test]
    fn test_score_window() {
        let chem = RbnChemistry::default();
        let p = constant_atom(&[false], 1);
        let q = constant_atom(&[false, true], 1);
        let r = constant_atom(&[true, true, true], 1);
        let mol = Molecule::new(vec![r, p, q], Bonds::new()).unwrap();
        // Sorted: p (node 0), q (nodes 1-2), r (nodes 3-5)
        assert_eq!(mol.offset(1), 1);
        assert_eq!(mol.offset(2), 3);
        // p reads q's first node, q reads its second node and r's first, r reads its last two
        assert_eq!(chem.score(&mol, 0), -1);
        assert_eq!(chem.score(&mol, 1), 2);
        assert_eq!(chem.score(&mol, 2), 2);
    }

    #[test]
    fn test_score_sums_over_cycle() {
        let chem = RbnChemistry::default();
        // Node 1 oscillates, node 0 is constantly true
        let atom = Rbn::new(
            State::new(vec![true, false]),
            vec![vec![0], vec![1]],
            vec![TruthTable::constant(1, true), TruthTable::from_outputs(&[true, false])],
        )
        .unwrap();
        let mol = Molecule::from_atom(atom);
        assert_eq!(mol.cycle().len(), 2);
        assert_eq!(chem.score(&mol, 0), 0);
    }

    #[test]
    fn test_bond_sites() {
        let chem = RbnChemistry::default();
        let atom = Rbn::new(
            State::filled(3, false),
            vec![vec![0, 1], vec![1, 1], vec![0, 2]],
            vec![TruthTable::constant(2, false); 3],
        )
        .unwrap();
        let mol = Molecule::from_atom(atom);
        assert_eq!(
            chem.bond_sites(&mol, 0),
            vec![site(0, 0), site(1, 0), site(1, 1), site(2, 1)]
        );
    }

    #[test]
    fn test_bond_sites_exclude_used() {
        let chem = RbnChemistry::default();
        let a = constant_atom(&[true, true], 2);
        let b = constant_atom(&[false], 2);
        let mol = Molecule::new(vec![a, b], Bonds::from([((0, 1), (site(1, 0), site(0, 1)))])).unwrap();
        // b sorts first
        assert_eq!(chem.bond_sites(&mol, 0), vec![site(0, 0)]);
        assert_eq!(chem.bond_sites(&mol, 1), vec![site(0, 0), site(0, 1), site(1, 1)]);
    }

    #[test]
    fn test_bond() {
        let chem = RbnChemistry::default();
        let a = Molecule::new(
            vec![constant_atom(&[true], 2), constant_atom(&[false], 2)],
            Bonds::from([((0, 1), (site(0, 0), site(0, 0)))]),
        )
        .unwrap();
        let b = Molecule::new(
            vec![constant_atom(&[true, false], 2), constant_atom(&[false, false], 2)],
            Bonds::from([((0, 1), (site(1, 1), site(0, 1)))]),
        )
        .unwrap();
        let ab = chem.bond(&a, &b, 1, 0, site(0, 1), site(0, 0)).unwrap();
        assert_eq!(ab.len(), 4);
        assert_eq!(ab.bonds().len(), 3);
        assert!(ab.bonds().keys().all(|&(x, y)| x < y));
        assert!(ab.atoms().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_stabilize_single_atom() {
        let chem = RbnChemistry::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mol = Molecule::from_random(&mut rng, 5, 2);
        assert_eq!(chem.stabilize(&mol), vec![mol]);
    }

    #[test]
    fn test_stabilize_stable_pair() {
        let chem = RbnChemistry::default();
        let q = constant_atom(&[false, true], 1);
        let r = constant_atom(&[true, true, true], 1);
        let mol = Molecule::new(vec![q, r], Bonds::from([((0, 1), (site(1, 0), site(0, 0)))])).unwrap();
        assert_eq!(chem.score(&mol, 0), chem.score(&mol, 1));
        assert_eq!(chem.stabilize(&mol), vec![mol]);
    }

    #[test]
    fn test_stabilize_breaks_pair() {
        let chem = RbnChemistry::default();
        let a = constant_atom(&[true, true], 1);
        let b = constant_atom(&[false, false], 1);
        let mol = Molecule::new(
            vec![a.clone(), b.clone()],
            Bonds::from([((0, 1), (site(0, 0), site(0, 0)))]),
        )
        .unwrap();
        let products = chem.stabilize(&mol);
        assert_eq!(products, vec![Molecule::from_atom(b), Molecule::from_atom(a)]);
    }

    #[test]
    fn test_stabilize_partial() {
        let chem = RbnChemistry::default();
        let p = constant_atom(&[false], 1);
        let q = constant_atom(&[false, true], 1);
        let r = constant_atom(&[true, true, true], 1);
        let mol = Molecule::new(
            vec![p.clone(), q.clone(), r.clone()],
            Bonds::from([
                ((0, 1), (site(0, 0), site(0, 0))),
                ((1, 2), (site(1, 0), site(0, 0))),
            ]),
        )
        .unwrap();
        let products = chem.stabilize(&mol);
        let qr = Molecule::new(vec![q, r], Bonds::from([((0, 1), (site(1, 0), site(0, 0)))])).unwrap();
        assert_eq!(products, vec![Molecule::from_atom(p), qr]);
        for product in &products {
            assert_eq!(chem.stabilize(product), vec![product.clone()]);
        }
    }

    #[test]
    fn test_react_bonds_constant_atoms() {
        let chem = RbnChemistry::default();
        let a = Molecule::from_atom(constant_atom(&[true], 1));
        let b = Molecule::from_atom(constant_atom(&[true], 1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let reaction = chem.react(&[a.clone(), b.clone()], &mut rng).unwrap().unwrap();
        assert_eq!(reaction.reactants, vec![a, b]);
        assert_eq!(reaction.products.len(), 1);
        assert_eq!(reaction.products[0].len(), 2);
        assert_eq!(reaction.products[0].bonds().len(), 1);
    }

    #[test]
    fn test_react_incompatible_scores() {
        let chem = RbnChemistry::default();
        // Scores 1 and 0
        let a = Molecule::from_atom(constant_atom(&[true, true], 1));
        let b = Molecule::from_atom(constant_atom(&[true], 1));
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert_eq!(chem.react(&[a.clone(), b.clone()], &mut rng).unwrap(), None);
        }
    }

    #[test]
    fn test_react_tolerance() {
        let chem = RbnChemistry::new(RbnChemistryConfig::new().with_tolerance(2));
        let a = Molecule::from_atom(constant_atom(&[true, true], 1));
        let b = Molecule::from_atom(constant_atom(&[true], 1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(chem.react(&[a, b], &mut rng).unwrap().is_some());
    }

    #[test]
    fn test_react_no_bond_sites() {
        let chem = RbnChemistry::default();
        let closed = Rbn::new(
            State::filled(2, true),
            vec![vec![1], vec![0]],
            vec![TruthTable::constant(1, true); 2],
        )
        .unwrap();
        let a = Molecule::from_atom(closed);
        let b = Molecule::from_atom(constant_atom(&[true], 1));
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert_eq!(chem.react(&[a.clone(), b.clone()], &mut rng).unwrap(), None);
            assert_eq!(chem.react(&[b.clone(), a.clone()], &mut rng).unwrap(), None);
        }
    }

    #[test]
    fn test_react_stabilize_products() {
        let chem = RbnChemistry::new(
            RbnChemistryConfig::new()
                .with_tolerance(2)
                .with_stabilize_products(true),
        );
        // Bonds under tolerance 2 are also kept by stabilization under tolerance 2
        let a = Molecule::from_atom(constant_atom(&[true, true], 1));
        let b = Molecule::from_atom(constant_atom(&[true], 1));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let reaction = chem.react(&[a, b], &mut rng).unwrap().unwrap();
        let atoms: usize = reaction.products.iter().map(Molecule::len).sum();
        assert_eq!(atoms, 2);
    }

    #[test]
    fn test_reactant_count() {
        let chem = RbnChemistry::default();
        let a = Molecule::from_atom(constant_atom(&[true], 1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            chem.react(&[a.clone()], &mut rng).unwrap_err(),
            Error::ReactantCount { expected: 2, actual: 1 }
        );
        assert_eq!(
            chem.all_reactions(&[a.clone(), a.clone(), a]).unwrap_err(),
            Error::ReactantCount { expected: 2, actual: 3 }
        );
    }

    #[test]
    fn test_all_reactions_cross_product() {
        let chem = RbnChemistry::default();
        let a = Molecule::from_atom(constant_atom(&[true, false], 2));
        let b = Molecule::from_atom(constant_atom(&[false, true], 2));
        let reactions = chem.all_reactions(&[a.clone(), b.clone()]).unwrap();
        let total: usize = reactions.values().sum();
        assert_eq!(total, 4 * 4);
        for reaction in reactions.keys() {
            assert_eq!(reaction.reactants, vec![a.clone(), b.clone()]);
            assert_eq!(reaction.products.len(), 1);
            assert_eq!(reaction.products[0].bonds().len(), 1);
        }
    }

    #[test]
    fn test_all_reactions_identical_atoms() {
        let chem = RbnChemistry::default();
        let a = Molecule::from_atom(constant_atom(&[true], 2));
        let b = Molecule::from_atom(constant_atom(&[true], 2));
        let reactions = chem.all_reactions(&[a, b]).unwrap();
        // Slots (0, 1) bonded to (0, 0) and (0, 0) bonded to (0, 1) give the same product
        assert_eq!(reactions.len(), 3);
        let mut counts: Vec<usize> = reactions.values().copied().collect();
        counts.sort();
        assert_eq!(counts, vec![1, 1, 2]);
    }

    #[test]
    fn test_all_reactions_none_available() {
        let chem = RbnChemistry::default();
        let closed = Rbn::new(
            State::filled(2, true),
            vec![vec![1], vec![0]],
            vec![TruthTable::constant(1, true); 2],
        )
        .unwrap();
        let a = Molecule::from_atom(closed);
        let b = Molecule::from_atom(constant_atom(&[true], 1));
        assert!(chem.all_reactions(&[a, b]).unwrap().is_empty());
    }

    #[test]
    fn test_components() {
        let mut components = Components::new(5);
        components.union(3, 1);
        components.union(4, 2);
        components.union(2, 3);
        assert_eq!(components.groups(), vec![vec![0], vec![1, 2, 3, 4]]);
    }
}
