//! Predictions and partial effects of a truncated boosting path.
use rayon::prelude::*;

use crate::{
    base_learner::{Contribution, TermBasis},
    booster::{BoostingPath, PathView},
    error::{ConfigurationError, Result},
    Sample,
};


/// The summed contribution of a single term.
///
/// Coefficient updates of a term share one basis,
/// so they are added up into one coefficient vector.
/// Split updates are kept as they are.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialEffect {
    predictor: String,
    basis: Option<TermBasis>,
    coefficients: Vec<f64>,
    splits: Vec<Contribution>,
}


impl PartialEffect {
    fn zero(predictor: &str, basis: Option<&TermBasis>) -> Self {
        let n_coef = basis.map_or(0, TermBasis::n_coefficients);
        Self {
            predictor: predictor.to_string(),
            basis: basis.cloned(),
            coefficients: vec![0.0; n_coef],
            splits: Vec::new(),
        }
    }


    fn add(&mut self, update: &Contribution) {
        match update {
            Contribution::Coefficients(coef) => {
                self.coefficients.iter_mut()
                    .zip(coef)
                    .for_each(|(c, u)| { *c += u; });
            },
            Contribution::Split { .. } => {
                self.splits.push(update.clone());
            },
            Contribution::Zero => {},
        }
    }


    /// The predictor this effect is a function of.
    pub fn predictor(&self) -> &str {
        &self.predictor
    }


    /// Returns `true` if the term was never selected.
    pub fn is_zero(&self) -> bool {
        self.splits.is_empty() && self.coefficients.iter().all(|c| *c == 0.0)
    }


    /// Summed coefficients on the term's basis.
    /// Empty for stump terms.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }


    /// Value of the effect at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let smooth = match &self.basis {
            Some(basis) if !self.coefficients.is_empty() => {
                basis.evaluate(&self.coefficients, x)
            },
            _ => 0.0,
        };
        let steps = match &self.basis {
            Some(basis) => {
                self.splits.iter()
                    .map(|split| split.evaluate(basis, x))
                    .sum::<f64>()
            },
            None => 0.0,
        };
        smooth + steps
    }


    /// Values of the effect at every element of `xs`.
    pub fn eval_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }


    /// Converts this effect into a plain function.
    pub fn into_fn(self) -> impl Fn(f64) -> f64 {
        move |x| self.eval(x)
    }
}


impl<'a> PathView<'a> {
    /// Partial effect of the `term`-th term.
    pub fn partial_effect(&self, term: usize)
        -> std::result::Result<PartialEffect, ConfigurationError>
    {
        let path = self.path();
        let model_term = path.terms().get(term)
            .ok_or(ConfigurationError::UnknownTerm(term))?;

        let mut effect = PartialEffect::zero(
            model_term.predictor(), path.basis(term),
        );
        self.steps().iter()
            .filter(|step| step.term == Some(term))
            .for_each(|step| effect.add(&step.update));
        Ok(effect)
    }


    /// Partial effects of every term.
    pub fn partial_effects(&self) -> Vec<PartialEffect> {
        (0..self.path().terms().len())
            .filter_map(|j| self.partial_effect(j).ok())
            .collect()
    }


    /// Predictions of the truncated model on `sample`.
    /// The sample needs the predictors of the selected terms only.
    pub fn predict(&self, sample: &Sample)
        -> std::result::Result<Vec<f64>, ConfigurationError>
    {
        let n_sample = sample.shape().0;
        let mut predictions = vec![self.path().offset(); n_sample];

        for effect in self.partial_effects() {
            if effect.is_zero() { continue; }

            let feature = sample.feature(effect.predictor())
                .ok_or_else(|| {
                    ConfigurationError::UnknownPredictor(effect.predictor().to_string())
                })?;

            predictions.par_iter_mut()
                .zip(feature.values())
                .for_each(|(p, &x)| { *p += effect.eval(x); });
        }
        Ok(predictions)
    }
}


/// Predictions of `path` truncated at `at_iteration` on `sample`.
pub fn predict(path: &BoostingPath, at_iteration: usize, sample: &Sample)
    -> Result<Vec<f64>>
{
    let predictions = path.at(at_iteration)?.predict(sample)?;
    Ok(predictions)
}


/// Partial effect of the `term`-th term of `path`
/// truncated at `at_iteration`.
pub fn partial_effect(path: &BoostingPath, at_iteration: usize, term: usize)
    -> Result<PartialEffect>
{
    let effect = path.at(at_iteration)?.partial_effect(term)?;
    Ok(effect)
}
