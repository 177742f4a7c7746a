//! Error and warning types.
//!
//! Configuration problems are reported before any fitting begins.
//! Degenerate fits and numerical instabilities never abort a boosting path;
//! they are recovered locally and surfaced as [`FitWarning`]s.
use polars::prelude::PolarsError;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use std::fmt;


/// Errors raised while validating a model configuration.
/// All of them are detected before the first boosting iteration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The term list has no element.
    #[error("the term list is empty")]
    EmptyTermList,

    /// A term refers to a predictor that the sample does not have.
    #[error("predictor `{0}` does not exist in the sample")]
    UnknownPredictor(String),

    /// Two terms refer to the same predictor.
    #[error("predictor `{0}` appears in more than one term")]
    DuplicatePredictor(String),

    /// The number of boosting iterations is zero.
    #[error("the maximal number of iterations must be positive")]
    NonPositiveMstop,

    /// Cross-validation needs at least two folds.
    #[error("at least 2 folds are required, got {0}")]
    TooFewFolds(usize),

    /// More folds than examples.
    #[error("{folds} folds are requested but the sample has {n_sample} examples")]
    TooManyFolds {
        /// Requested number of folds.
        folds: usize,
        /// Number of examples.
        n_sample: usize,
    },

    /// The shrinkage parameter is outside of `(0, 1]`.
    #[error("shrinkage must lie in (0, 1], got {0}")]
    InvalidShrinkage(f64),

    /// A missing (null or `NaN`) value was found.
    #[error("missing value in column `{column}` at row {row}")]
    MissingValue {
        /// Column name.
        column: String,
        /// Row index.
        row: usize,
    },

    /// An infinite value was found.
    #[error("infinite value in column `{column}` at row {row}")]
    NonFiniteValue {
        /// Column name.
        column: String,
        /// Row index.
        row: usize,
    },

    /// A column does not have the expected number of values.
    #[error("column `{column}` has {found} values, expected {expected}")]
    LengthMismatch {
        /// Column name.
        column: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// Observation weights are malformed.
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    /// A truncation point beyond the fitted path.
    #[error("iteration {requested} exceeds the fitted path length {available}")]
    IterationOutOfRange {
        /// Requested iteration.
        requested: usize,
        /// Last iteration of the path.
        available: usize,
    },

    /// A term index beyond the term list.
    #[error("term index {0} is out of range")]
    UnknownTerm(usize),

    /// A base-learner parameter is out of its domain.
    #[error("invalid learner parameter: {0}")]
    InvalidParameter(String),

    /// A persisted path whose parts do not fit together.
    #[error("malformed boosting path: {0}")]
    MalformedPath(String),

    /// The target column does not exist.
    #[error("the target column `{0}` does not exist")]
    UnknownTarget(String),

    /// The sample has no example or no response.
    #[error("the sample has no example with a response")]
    EmptySample,
}


/// Reasons why a base learner cannot produce a fit.
/// A degenerate term is excluded from the candidate selection,
/// the boosting path itself continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DegenerateFitError {
    /// The predictor is constant over the rows with positive weight.
    #[error("the predictor has zero variance on the weighted rows")]
    ZeroVariance,

    /// The (penalized) Gram matrix is not positive definite.
    #[error("the weighted basis matrix is singular")]
    SingularBasis,

    /// A stump found no split point.
    #[error("no admissible split point")]
    NoSplit,

    /// The predictor range or the candidate fit is not finite.
    #[error("the predictor range or the candidate fit is not finite")]
    NonFinite,
}


/// An ill-conditioned basis solve.
/// The fit is still used, but the caller should know about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericInstabilityWarning {
    /// Predictor of the offending term.
    pub predictor: String,
    /// Estimated condition number of the solved system.
    pub condition_estimate: f64,
}


impl fmt::Display for NumericInstabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ill-conditioned basis solve for `{}` \
            (condition estimate {:.3e})",
            self.predictor,
            self.condition_estimate,
        )
    }
}


/// Conditions collected while fitting a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FitWarning {
    /// A term was excluded from the selection.
    /// `iteration` is the first iteration where the term was excluded.
    Degenerate {
        /// Iteration index (`1`-based).
        iteration: usize,
        /// Predictor of the excluded term.
        predictor: String,
        /// Why the term is excluded.
        reason: DegenerateFitError,
    },

    /// See [`NumericInstabilityWarning`].
    NumericInstability(NumericInstabilityWarning),
}


impl fmt::Display for FitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degenerate { iteration, predictor, reason } => {
                write!(
                    f,
                    "term `{predictor}` excluded from iteration {iteration}: \
                    {reason}"
                )
            },
            Self::NumericInstability(warning) => write!(f, "{warning}"),
        }
    }
}


/// The error type of this crate.
#[derive(Debug, Error)]
pub enum BoostError {
    /// See [`ConfigurationError`].
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Errors from `polars` while converting a data frame.
    #[error(transparent)]
    DataFrame(#[from] PolarsError),

    /// I/O errors while persisting a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// (De)serialization errors while persisting a path.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}


/// `Result` alias with [`BoostError`].
pub type Result<T> = std::result::Result<T, BoostError>;
