//! # rbn-achem: an artificial chemistry of Random Boolean Networks
//!
//! **`rbn-achem`** models molecules built from **Random Boolean Networks (RBNs)** and the
//! rules by which two molecules bond, and by which a molecule breaks apart into stable fragments.
//!
//! ## What is an RBN molecule?
//!
//! An RBN is a set of boolean nodes, each reading `k` other nodes and updating synchronously
//! through its own boolean function. Iterated from any state, it eventually falls into a
//! repeating **cycle** of states.
//!
//! A **molecule** is one or more RBN **atoms** composed into one larger network. Input slots that
//! an atom wires back to their own node are open valences: a **bond** rewires one such slot on
//! each of two atoms so that each reads the other. The dynamics of the composite network decide
//! whether the bond holds.
//!
//! ## Key Features
//!
//! - **Canonical composition**: [`Molecule`][crate::molecule::Molecule] sorts its atoms and
//!   remaps bonds, so the same atoms and bonds give the same molecule in any input order.
//! - **Deterministic dynamics**: the attractor cycle is computed once at construction and the
//!   molecule is anchored at the smallest state of that cycle.
//! - **Pluggable chemistry**: simulation drivers use the [`Chemistry`][crate::chemistry::Chemistry]
//!   trait; [`RbnChemistry`][crate::chemistry::RbnChemistry] is the RBN implementation.
//!
//! ## Basic Usage
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use rbn_achem::chemistry::{Chemistry, RbnChemistry};
//! use rbn_achem::molecule::Molecule;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let chem = RbnChemistry::default();
//!
//! let a = Molecule::from_random(&mut rng, 5, 2);
//! let b = Molecule::from_random(&mut rng, 5, 2);
//!
//! // Either a bond forms, or the collision is elastic
//! if let Some(reaction) = chem.react(&[a.clone(), b.clone()], &mut rng)? {
//!     let product = &reaction.products[0];
//!     assert_eq!(product.len(), 2);
//!     assert_eq!(product.bonds().len(), 1);
//! }
//!
//! // Every possible bond between the two, with multiplicities
//! let reactions = chem.all_reactions(&[a, b])?;
//! for (reaction, count) in &reactions {
//!     assert!(*count >= 1);
//!     assert_eq!(reaction.products.len(), 1);
//! }
//! # Ok::<(), rbn_achem::error::Error>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`rbn`]**: The boolean network itself, with random generation and cycle discovery.
//! - **[`molecule`]**: Composition of atoms and bonds into one network.
//! - **[`chemistry`]**: Scoring, bonding, stabilization and reaction enumeration.

pub mod chemistry;
pub mod error;
pub mod function;
pub mod molecule;
pub mod rbn;
pub mod reaction;
pub mod state;
pub mod types;
