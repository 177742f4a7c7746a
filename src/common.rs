//! Defines some common functions used in this library.

/// Defines loss function trait and its instances.
pub mod loss_functions;

/// Defines some checker functions.
pub(crate) mod checker;

/// Thin wrappers around `faer` for small dense solves.
pub(crate) mod linalg;


pub use loss_functions::{LossFunction, GBMLoss};
