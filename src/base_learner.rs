//! Provides the base learners of the component-wise boosting.
//! Each term of an additive model is fitted by exactly one base learner.
pub mod core;

/// Design matrices and their cache.
pub mod basis;
pub(crate) mod bspline;

/// Least squares on linear and categorical terms.
pub mod ols;
/// Penalized B-splines.
pub mod pspline;
/// Monotone penalized B-splines.
pub mod monotone;
pub(crate) mod active_set;
/// Tree stumps.
pub mod stump;


pub use self::core::{
    BaseLearner,
    Contribution,
    LearnerFit,
    fit,
};
pub use self::basis::{TermBasis, BasisCache};
pub use self::ols::OlsLearner;
pub use self::pspline::PSplineLearner;
pub use self::monotone::MonotoneLearner;
pub use self::stump::StumpLearner;
