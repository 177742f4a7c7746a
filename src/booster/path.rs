//! The fitted boosting path.
use serde::{Serialize, Deserialize};

use crate::ModelTerm;
use crate::base_learner::{Contribution, TermBasis};
use crate::common::loss_functions::GBMLoss;
use crate::error::{ConfigurationError, FitWarning, Result};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;


/// The record of a single boosting iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostingStep {
    /// Index of the selected term,
    /// `None` if every term was degenerate at this iteration.
    pub term: Option<usize>,
    /// The shrunk contribution added to the model.
    pub update: Contribution,
    /// Weighted SSE of the selected fit against the pseudo-residuals.
    pub sse: f64,
    /// Degrees of freedom of the selected learner.
    pub df: f64,
}


/// The sequence of additive models produced by a boosting run.
///
/// Every iteration is recorded,
/// so the model after any `k <= mstop()` iterations
/// is available through [`BoostingPath::at`] without refitting.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BoostingPath {
    pub(crate) terms: Vec<ModelTerm>,
    // One basis per term, `None` for a term without a valid basis.
    pub(crate) bases: Vec<Option<TermBasis>>,
    pub(crate) loss: GBMLoss,
    pub(crate) offset: f64,
    pub(crate) shrinkage: f64,
    pub(crate) steps: Vec<BoostingStep>,
    pub(crate) risk: Vec<f64>,
    pub(crate) holdout_risk: Vec<f64>,
    pub(crate) warnings: Vec<FitWarning>,
}


impl BoostingPath {
    /// Number of recorded iterations.
    #[inline]
    pub fn mstop(&self) -> usize {
        self.steps.len()
    }


    /// The terms of the model.
    #[inline]
    pub fn terms(&self) -> &[ModelTerm] {
        &self.terms
    }


    /// The basis of the `j`-th term.
    #[inline]
    pub fn basis(&self, j: usize) -> Option<&TermBasis> {
        self.bases.get(j).and_then(Option::as_ref)
    }


    /// The intercept of the model.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }


    /// The loss function the path descends.
    #[inline]
    pub fn loss(&self) -> GBMLoss {
        self.loss
    }


    /// The shrinkage parameter (step size).
    #[inline]
    pub fn shrinkage(&self) -> f64 {
        self.shrinkage
    }


    /// All recorded steps.
    #[inline]
    pub fn steps(&self) -> &[BoostingStep] {
        &self.steps
    }


    /// Weighted in-sample risk at iterations `0..=mstop()`.
    #[inline]
    pub fn risk(&self) -> &[f64] {
        &self.risk
    }


    /// Mean loss on the held-out rows at iterations `0..=mstop()`.
    /// Empty if the path has no held-out rows.
    #[inline]
    pub fn holdout_risk(&self) -> &[f64] {
        &self.holdout_risk
    }


    /// Conditions collected while fitting.
    #[inline]
    pub fn warnings(&self) -> &[FitWarning] {
        &self.warnings
    }


    /// The selected term per iteration.
    pub fn selected_terms(&self) -> Vec<Option<usize>> {
        self.steps.iter()
            .map(|step| step.term)
            .collect()
    }


    /// Share of the iterations that selected each term.
    pub fn selection_frequencies(&self) -> Vec<f64> {
        let mut counts = vec![0usize; self.terms.len()];
        self.steps.iter()
            .filter_map(|step| step.term)
            .for_each(|j| { counts[j] += 1; });

        let total = self.steps.len().max(1) as f64;
        counts.into_iter()
            .map(|c| c as f64 / total)
            .collect()
    }


    /// The model after the first `iteration` steps.
    /// `iteration = 0` is the offset-only model.
    pub fn at(&self, iteration: usize)
        -> std::result::Result<PathView<'_>, ConfigurationError>
    {
        if iteration > self.mstop() {
            return Err(ConfigurationError::IterationOutOfRange {
                requested: iteration,
                available: self.mstop(),
            });
        }
        Ok(PathView { path: self, iteration })
    }


    /// The model after every recorded step.
    pub fn last(&self) -> PathView<'_> {
        PathView { path: self, iteration: self.mstop() }
    }


    /// Write this path as JSON.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }


    /// Read a path written by [`BoostingPath::to_json_file`].
    /// The path is checked for consistency before it is returned.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let path: Self = serde_json::from_reader(BufReader::new(file))?;
        path.check_consistency()?;
        Ok(path)
    }


    fn check_consistency(&self) -> std::result::Result<(), ConfigurationError> {
        let malformed = |msg: String| Err(ConfigurationError::MalformedPath(msg));

        if self.risk.len() != self.steps.len() + 1 {
            return malformed(format!(
                "{} risk values for {} steps", self.risk.len(), self.steps.len(),
            ));
        }
        if !self.holdout_risk.is_empty() && self.holdout_risk.len() != self.risk.len() {
            return malformed(format!(
                "{} held-out risk values for {} steps",
                self.holdout_risk.len(), self.steps.len(),
            ));
        }
        if self.bases.len() != self.terms.len() {
            return malformed(format!(
                "{} bases for {} terms", self.bases.len(), self.terms.len(),
            ));
        }

        let n_terms = self.terms.len();
        for (t, step) in self.steps.iter().enumerate() {
            let Some(j) = step.term else { continue; };
            if j >= n_terms {
                return malformed(format!(
                    "step {} selects term {j} of {n_terms}", t + 1,
                ));
            }
            let n_coef = self.basis(j).map(TermBasis::n_coefficients);
            let consistent = match (&step.update, n_coef) {
                (Contribution::Coefficients(coef), Some(n)) => coef.len() == n,
                (Contribution::Split { .. }, Some(0)) => true,
                (Contribution::Zero, _) => true,
                _ => false,
            };
            if !consistent {
                return malformed(format!(
                    "the update of step {} does not fit the basis of term {j}",
                    t + 1,
                ));
            }
        }
        Ok(())
    }
}


/// A truncation of a [`BoostingPath`].
/// Creating a view does not copy anything.
#[derive(Clone, Copy, Debug)]
pub struct PathView<'a> {
    path: &'a BoostingPath,
    iteration: usize,
}


impl<'a> PathView<'a> {
    /// The underlying path.
    #[inline]
    pub fn path(&self) -> &'a BoostingPath {
        self.path
    }


    /// The truncation point.
    #[inline]
    pub fn iteration(&self) -> usize {
        self.iteration
    }


    /// The first `iteration()` steps.
    #[inline]
    pub fn steps(&self) -> &'a [BoostingStep] {
        &self.path.steps[..self.iteration]
    }


    /// In-sample risk of the truncated model.
    #[inline]
    pub fn risk(&self) -> f64 {
        self.path.risk[self.iteration]
    }
}
