//! This file defines some functions that checks some pre-conditions
//! E.g., the term list refers to existing predictors.
//! Every check runs before the first boosting iteration.

use crate::{Sample, ModelTerm, LearnerKind};
use crate::error::ConfigurationError;

use std::collections::HashSet;


/// Check whether the training sample is valid or not.
#[inline(always)]
pub(crate) fn check_sample(sample: &Sample)
    -> Result<(), ConfigurationError>
{
    if !sample.has_target() {
        return Err(ConfigurationError::EmptySample);
    }
    Ok(())
}


/// Check the term list against the sample.
pub(crate) fn check_terms(sample: &Sample, terms: &[ModelTerm])
    -> Result<(), ConfigurationError>
{
    if terms.is_empty() {
        return Err(ConfigurationError::EmptyTermList);
    }

    let mut seen = HashSet::with_capacity(terms.len());
    for term in terms {
        let name = term.predictor();
        if !sample.has_feature(name) {
            return Err(ConfigurationError::UnknownPredictor(name.to_string()));
        }
        if !seen.insert(name) {
            return Err(ConfigurationError::DuplicatePredictor(name.to_string()));
        }
        check_learner(term)?;
    }
    Ok(())
}


fn check_learner(term: &ModelTerm) -> Result<(), ConfigurationError> {
    match term.kind() {
        LearnerKind::PSpline(config) | LearnerKind::Monotone(config, _) => {
            config.validate()
                .map_err(|msg| {
                    ConfigurationError::InvalidParameter(
                        format!("term `{}`: {msg}", term.predictor())
                    )
                })
        },
        _ => Ok(()),
    }
}


/// Check the maximal number of iterations.
#[inline(always)]
pub(crate) fn check_mstop(max_iter: usize) -> Result<(), ConfigurationError> {
    if max_iter == 0 {
        return Err(ConfigurationError::NonPositiveMstop);
    }
    Ok(())
}


/// Check the shrinkage parameter (the step size).
#[inline(always)]
pub(crate) fn check_shrinkage(nu: f64) -> Result<(), ConfigurationError> {
    if !(nu > 0.0 && nu <= 1.0) {
        return Err(ConfigurationError::InvalidShrinkage(nu));
    }
    Ok(())
}


/// Check the observation weights.
pub(crate) fn check_weights(weights: &[f64], n_sample: usize)
    -> Result<(), ConfigurationError>
{
    if weights.len() != n_sample {
        return Err(ConfigurationError::LengthMismatch {
            column: "weights".into(),
            expected: n_sample,
            found: weights.len(),
        });
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ConfigurationError::InvalidWeights(
            "weights must be finite and non-negative".into()
        ));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(ConfigurationError::InvalidWeights(
            "the total weight must be positive".into()
        ));
    }
    Ok(())
}


/// Check the number of folds for the cross-validation.
/// `disjoint` is `true` if the folds partition the sample.
#[inline(always)]
pub(crate) fn check_folds(n_folds: usize, n_sample: usize, disjoint: bool)
    -> Result<(), ConfigurationError>
{
    if n_folds < 2 {
        return Err(ConfigurationError::TooFewFolds(n_folds));
    }
    if disjoint && n_folds > n_sample {
        return Err(ConfigurationError::TooManyFolds { folds: n_folds, n_sample });
    }
    Ok(())
}
