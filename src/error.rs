//! Error types for molecule construction and reactions.
//!
//! No-bond outcomes (elastic collisions) are not errors: reaction operations
//! report them as `Ok(None)`.

use thiserror::Error;

use crate::types::BondSite;

/// Errors raised by molecule construction and by the chemistry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A molecule must contain at least one atom.
    #[error("molecule must include at least one atom")]
    NoAtoms,

    /// Bond key references an atom position past the end of the atom list.
    #[error("bond to atom position {atom} out of range for {count} atoms")]
    BondOutOfRange { atom: usize, count: usize },

    /// Bond key pairs an atom with itself.
    #[error("bond from atom {atom} to itself")]
    SelfBond { atom: usize },

    /// Two bond keys collapse onto the same canonical key.
    #[error("duplicate bond between atoms {first} and {second}")]
    DuplicateBond { first: usize, second: usize },

    /// Bond-site node or slot does not exist on the atom.
    #[error("invalid bond site {site} on atom {atom}")]
    InvalidBondSite { atom: usize, site: BondSite },

    /// Reaction operations take an exact number of reactants.
    #[error("expected {expected} reactants, got {actual}")]
    ReactantCount { expected: usize, actual: usize },

    /// Explicit network data is inconsistent.
    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}

pub type Result<T> = std::result::Result<T, Error>;
