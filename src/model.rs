//! Model terms: which predictor enters the additive model,
//! and through which base learner.

/// Defines `ModelTerm` and its parameters.
pub mod term;

/// Defines a validated builder for term lists.
pub mod builder;


pub use term::{
    ModelTerm,
    LearnerKind,
    Direction,
    SplineConfig,
    Penalty,
};

pub use builder::{
    ModelBuilder,
    TermList,
};
