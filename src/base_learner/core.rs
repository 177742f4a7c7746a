//! Provides `BaseLearner` trait and the fitted contributions.
use ndarray::{Array1, Array2};
use serde::{Serialize, Deserialize};

use crate::{ModelTerm, LearnerKind};
use crate::error::DegenerateFitError;
use super::basis::{TermBasis, Design};
use super::{
    ols::OlsLearner,
    pspline::PSplineLearner,
    monotone::MonotoneLearner,
    stump::StumpLearner,
};

use std::sync::Arc;


/// A fitted contribution function of a single term.
/// Every contribution of a term shares the [`TermBasis`] of the term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Contribution {
    /// `x ↦ basis.row(x) · coefficients`.
    Coefficients(Vec<f64>),
    /// `x ↦ left` if `x <= threshold`, `right` otherwise.
    Split {
        /// Split point.
        threshold: f64,
        /// Prediction on the left leaf.
        left: f64,
        /// Prediction on the right leaf.
        right: f64,
    },
    /// `x ↦ 0`, the update of an iteration where no term was fitted.
    Zero,
}


impl Contribution {
    /// Returns `factor * self`.
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Self::Coefficients(coef) => {
                Self::Coefficients(coef.iter().map(|c| factor * c).collect())
            },
            Self::Split { threshold, left, right } => {
                Self::Split {
                    threshold: *threshold,
                    left: factor * left,
                    right: factor * right,
                }
            },
            Self::Zero => Self::Zero,
        }
    }


    /// Evaluate this contribution at `x`.
    pub fn evaluate(&self, basis: &TermBasis, x: f64) -> f64 {
        match self {
            Self::Coefficients(coef) => basis.evaluate(coef, x),
            Self::Split { threshold, left, right } => {
                if x <= *threshold { *left } else { *right }
            },
            Self::Zero => 0.0,
        }
    }
}


/// The output of [`BaseLearner::fit`].
#[derive(Clone, Debug)]
pub struct LearnerFit {
    /// The fitted contribution function.
    pub contribution: Contribution,
    /// Values of the contribution at every training row,
    /// including the rows with zero weight.
    pub fitted: Vec<f64>,
    /// Weighted sum of squared errors against the pseudo-residuals.
    pub sse: f64,
    /// Degrees of freedom of the learner.
    pub df: f64,
}


/// A trait that defines the behavior of a base learner.
///
/// A base learner is prepared once per boosting path
/// for a fixed predictor column and fixed observation weights;
/// every weight-dependent quantity is computed at that point.
/// [`BaseLearner::fit`] is then called once per iteration
/// with the current pseudo-residuals.
pub trait BaseLearner: Send + Sync {
    /// The name of the base learner.
    fn name(&self) -> &str;


    /// Degrees of freedom, the trace of the hat matrix.
    fn degrees_of_freedom(&self) -> f64;


    /// Condition estimate of the solved system, if any.
    fn condition_estimate(&self) -> Option<f64> {
        None
    }


    /// Fit the pseudo-residuals `residuals`.
    fn fit(&self, residuals: &[f64]) -> Result<LearnerFit, DegenerateFitError>;
}


/// Prepare the base learner of `term` on the given design.
pub(crate) fn prepare(
    term: &ModelTerm,
    design: Arc<Design>,
    column: &[f64],
    weights: &[f64],
) -> Result<Box<dyn BaseLearner>, DegenerateFitError>
{
    let learner: Box<dyn BaseLearner> = match term.kind() {
        LearnerKind::Ols { .. } | LearnerKind::Categorical => {
            Box::new(OlsLearner::new(design, column, weights)?)
        },
        LearnerKind::PSpline(config) => {
            Box::new(PSplineLearner::new(design, config, column, weights)?)
        },
        LearnerKind::Monotone(config, direction) => {
            Box::new(
                MonotoneLearner::new(design, config, *direction, column, weights)?
            )
        },
        LearnerKind::Stump => {
            Box::new(StumpLearner::new(design, column, weights)?)
        },
    };
    Ok(learner)
}


/// Fit a single term to the pseudo-residuals.
///
/// This is the one-shot form of the base-learner contract:
/// `(column, residuals, weights) -> (contribution, df, sse)`.
/// The boosting path prepares the learners once and reuses them instead.
pub fn fit(
    term: &ModelTerm,
    column: &[f64],
    residuals: &[f64],
    weights: &[f64],
) -> Result<LearnerFit, DegenerateFitError>
{
    let design = Arc::new(Design::build(term.kind(), column)?);
    prepare(term, design, column, weights)?.fit(residuals)
}


/// Fails if the predictor takes less than two distinct values
/// on the rows with positive weight.
pub(super) fn check_variance(column: &[f64], weights: &[f64])
    -> Result<(), DegenerateFitError>
{
    let mut values = column.iter()
        .zip(weights)
        .filter(|(_, w)| **w > 0.0)
        .map(|(x, _)| *x);

    let Some(first) = values.next() else {
        return Err(DegenerateFitError::ZeroVariance);
    };
    if values.any(|x| x != first) {
        Ok(())
    } else {
        Err(DegenerateFitError::ZeroVariance)
    }
}


/// Build a [`LearnerFit`] of a linear-in-parameters learner.
pub(super) fn coefficient_fit(
    matrix: &Array2<f64>,
    coef: Array1<f64>,
    residuals: &[f64],
    weights: &[f64],
    df: f64,
) -> Result<LearnerFit, DegenerateFitError>
{
    let fitted = matrix.dot(&coef).to_vec();
    let sse = weighted_sse(residuals, &fitted[..], weights);
    if !sse.is_finite() {
        return Err(DegenerateFitError::NonFinite);
    }

    Ok(LearnerFit {
        contribution: Contribution::Coefficients(coef.to_vec()),
        fitted,
        sse,
        df,
    })
}


/// `Σ w (u - f)^2` over the rows with positive weight.
pub(super) fn weighted_sse(residuals: &[f64], fitted: &[f64], weights: &[f64])
    -> f64
{
    residuals.iter()
        .zip(fitted)
        .zip(weights)
        .filter(|(_, w)| **w > 0.0)
        .map(|((u, f), w)| w * (u - f).powi(2))
        .sum()
}
