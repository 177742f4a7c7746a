//! Provides the component-wise gradient boosting ([`ComponentwiseBoost`])
//! of Bühlmann and Yu, 2003.
use rayon::prelude::*;

use crate::{
    common::loss_functions::*,
    common::checker,
    common::linalg::UNSTABLE_CONDITION,
    base_learner::{self, BaseLearner, BasisCache, Contribution, LearnerFit},
    error::{
        ConfigurationError,
        DegenerateFitError,
        FitWarning,
        NumericInstabilityWarning,
        Result,
    },
    Booster,
    BoostingPath,
    BoostingStep,
    ModelTerm,
    Sample,
};

use std::mem;
use std::ops::ControlFlow;


/// The default number of boosting iterations.
pub const DEFAULT_MAX_ITER: usize = 100;
/// The default shrinkage parameter.
pub const DEFAULT_SHRINKAGE: f64 = 0.1;


type Prepared = std::result::Result<Box<dyn BaseLearner>, DegenerateFitError>;


/// Component-wise functional gradient boosting for additive models.
///
/// Each term of the model has its own base learner.
/// In every iteration, all the base learners fit the pseudo-residuals
/// of the current model, and only the one with the smallest
/// weighted SSE is added to the model, scaled by the shrinkage parameter.
///
/// See the following paper:
///
/// [Peter Bühlmann and Bin Yu, 2003 - Boosting With the L2 Loss](https://doi.org/10.1198/016214503000125)
///
/// # Example
/// ```no_run
/// use gamboost::prelude::*;
///
/// let sample = Sample::from_columns(
///     vec![("x", vec![0.0, 1.0, 2.0, 3.0]), ("z", vec![1.0, 0.0, 1.0, 0.0])],
///     vec![0.1, 0.9, 2.1, 2.9],
/// ).unwrap();
///
/// let terms = ModelBuilder::new()
///     .spline("x")
///     .categorical("z")
///     .build(&sample)
///     .unwrap();
///
/// let path = ComponentwiseBoost::init(&sample, &terms)
///     .max_iter(200)
///     .shrinkage(0.1)
///     .run()
///     .unwrap();
///
/// let fitted = path.last().predict(&sample).unwrap();
/// ```
pub struct ComponentwiseBoost<'a> {
    // Training data
    sample: &'a Sample,
    terms: Vec<ModelTerm>,
    cache: Option<&'a BasisCache<'a>>,


    // Parameters
    max_iter: usize,
    shrinkage: f64,
    loss: GBMLoss,
    weights: Option<Vec<f64>>,
    holdout: Vec<usize>,


    // State of the run
    learners: Vec<Prepared>,
    train_weights: Vec<f64>,
    predictions: Vec<f64>,
    excluded: Vec<bool>,
    path: BoostingPath,
}


impl<'a> ComponentwiseBoost<'a> {
    /// Initialize the `ComponentwiseBoost`
    /// with the default parameters.
    pub fn init(sample: &'a Sample, terms: &[ModelTerm]) -> Self {
        Self {
            sample,
            terms: terms.to_vec(),
            cache: None,

            max_iter: DEFAULT_MAX_ITER,
            shrinkage: DEFAULT_SHRINKAGE,
            loss: GBMLoss::default(),
            weights: None,
            holdout: Vec::new(),

            learners: Vec::new(),
            train_weights: Vec::new(),
            predictions: Vec::new(),
            excluded: Vec::new(),
            path: BoostingPath::default(),
        }
    }


    /// Set the number of boosting iterations.
    /// Default is `100`.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }


    /// Set the shrinkage parameter (step size) in `(0, 1]`.
    /// Default is `0.1`.
    pub fn shrinkage(mut self, shrinkage: f64) -> Self {
        self.shrinkage = shrinkage;
        self
    }


    /// Set the loss function.
    /// Default is [`GBMLoss::L2`].
    pub fn loss(mut self, loss: GBMLoss) -> Self {
        self.loss = loss;
        self
    }


    /// Set the observation weights.
    /// Default is `1` for every observation.
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }


    /// Hold out the given rows.
    /// Held-out rows get zero weight and their mean loss
    /// is recorded at every iteration.
    pub fn holdout(mut self, rows: Vec<usize>) -> Self {
        self.holdout = rows;
        self
    }


    /// Reuse the design matrices in `cache`.
    /// The cache must be built on the same sample.
    pub fn cache(mut self, cache: &'a BasisCache<'a>) -> Self {
        self.cache = Some(cache);
        self
    }


    fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        let n_sample = self.sample.shape().0;
        checker::check_sample(self.sample)?;
        checker::check_terms(self.sample, &self.terms)?;
        checker::check_mstop(self.max_iter)?;
        checker::check_shrinkage(self.shrinkage)?;

        if let Some(weights) = &self.weights {
            checker::check_weights(weights, n_sample)?;
        }
        if let Some(&row) = self.holdout.iter().find(|&&i| i >= n_sample) {
            return Err(ConfigurationError::InvalidParameter(
                format!("held-out row {row} is out of range (n_sample = {n_sample})")
            ));
        }
        if let Some(cache) = self.cache {
            if !std::ptr::eq(cache.sample(), self.sample) {
                return Err(ConfigurationError::InvalidParameter(
                    "the basis cache is built on another sample".into()
                ));
            }
        }
        if let GBMLoss::Huber(delta) = self.loss {
            if !(delta > 0.0 && delta.is_finite()) {
                return Err(ConfigurationError::InvalidParameter(
                    format!("Huber delta must be positive, got {delta}")
                ));
            }
        }
        Ok(())
    }


    /// Prepare the base learner of every term.
    fn prepare_learners(&mut self) {
        let own_cache;
        let cache = match self.cache {
            Some(cache) => cache,
            None => {
                own_cache = BasisCache::build(self.sample, &self.terms);
                &own_cache
            },
        };

        let sample = self.sample;
        let weights = &self.train_weights;
        let prepared = self.terms.par_iter()
            .map(|term| -> std::result::Result<_, DegenerateFitError> {
                let design = cache.design(term)?;
                let basis = design.basis.clone();
                let column = sample[term.predictor()].values();
                let learner = base_learner::core::prepare(
                    term, design, column, weights,
                );
                Ok((basis, learner))
            })
            .collect::<Vec<_>>();

        self.learners = Vec::with_capacity(self.terms.len());
        self.path.bases = Vec::with_capacity(self.terms.len());
        for item in prepared {
            match item {
                Ok((basis, learner)) => {
                    self.path.bases.push(Some(basis));
                    self.learners.push(learner);
                },
                Err(reason) => {
                    self.path.bases.push(None);
                    self.learners.push(Err(reason));
                },
            }
        }
    }


    /// Record the ill-conditioned learners.
    fn check_conditions(&mut self) {
        for (term, learner) in self.terms.iter().zip(&self.learners) {
            let Ok(learner) = learner else { continue; };
            let Some(condition) = learner.condition_estimate() else { continue; };
            if condition > UNSTABLE_CONDITION {
                let warning = NumericInstabilityWarning {
                    predictor: term.predictor().to_string(),
                    condition_estimate: condition,
                };
                log::warn!("{warning}");
                self.path.warnings.push(FitWarning::NumericInstability(warning));
            }
        }
    }


    /// Exclude the `j`-th term, reporting it once per path.
    fn exclude(&mut self, j: usize, iteration: usize, reason: DegenerateFitError) {
        if mem::replace(&mut self.excluded[j], true) {
            return;
        }
        let warning = FitWarning::Degenerate {
            iteration,
            predictor: self.terms[j].predictor().to_string(),
            reason,
        };
        log::warn!("{warning}");
        self.path.warnings.push(warning);
    }


    fn record_risk(&mut self) {
        let target = self.sample.target();
        let risk = self.loss.weighted_eval(
            &self.predictions, target, &self.train_weights,
        );
        self.path.risk.push(risk);

        if !self.holdout.is_empty() {
            let loss = self.holdout.iter()
                .map(|&i| self.loss.eval_at_point(self.predictions[i], target[i]))
                .sum::<f64>()
                / self.holdout.len() as f64;
            self.path.holdout_risk.push(loss);
        }
    }
}


/// Index of the smallest SSE among the admissible candidates.
/// Ties go to the smallest index.
fn select(candidates: &[Option<LearnerFit>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (j, fit) in candidates.iter().enumerate() {
        let Some(fit) = fit else { continue; };
        match best {
            Some((_, sse)) if fit.sse >= sse => {},
            _ => { best = Some((j, fit.sse)); },
        }
    }
    best.map(|(j, _)| j)
}


impl Booster for ComponentwiseBoost<'_> {
    type Output = BoostingPath;


    fn name(&self) -> &str {
        "Component-wise Gradient Boosting"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let (n_sample, n_feature) = self.sample.shape();
        let info = Vec::from([
            ("# of examples", format!("{n_sample}")),
            ("# of features", format!("{n_feature}")),
            ("# of terms", format!("{}", self.terms.len())),
            ("Shrinkage", format!("{}", self.shrinkage)),
            ("Loss", format!("{}", self.loss)),
            ("Max iteration", format!("{}", self.max_iter)),
        ]);
        Some(info)
    }


    fn preprocess(&mut self) -> Result<()> {
        self.validate()?;

        let n_sample = self.sample.shape().0;
        let mut weights = self.weights.clone()
            .unwrap_or_else(|| vec![1.0; n_sample]);
        for &i in &self.holdout {
            weights[i] = 0.0;
        }
        checker::check_weights(&weights, n_sample)?;
        self.train_weights = weights;

        let offset = self.loss.offset(self.sample.target(), &self.train_weights);

        self.path = BoostingPath {
            terms: self.terms.clone(),
            bases: Vec::new(),
            loss: self.loss,
            offset,
            shrinkage: self.shrinkage,
            steps: Vec::with_capacity(self.max_iter),
            risk: Vec::with_capacity(self.max_iter + 1),
            holdout_risk: Vec::new(),
            warnings: Vec::new(),
        };
        self.predictions = vec![offset; n_sample];
        self.excluded = vec![false; self.terms.len()];

        self.prepare_learners();
        self.check_conditions();
        self.record_risk();
        Ok(())
    }


    fn boost(&mut self, iteration: usize) -> ControlFlow<usize> {
        if self.max_iter < iteration {
            return ControlFlow::Break(self.max_iter);
        }

        let residuals = self.loss.pseudo_residuals(
            &self.predictions, self.sample.target(),
        );

        let fits = self.learners.par_iter()
            .map(|learner| -> std::result::Result<LearnerFit, DegenerateFitError> {
                let learner = learner.as_ref().map_err(|reason| *reason)?;
                let fit = learner.fit(&residuals)?;
                if fit.fitted.iter().any(|f| !f.is_finite()) {
                    return Err(DegenerateFitError::NonFinite);
                }
                Ok(fit)
            })
            .collect::<Vec<_>>();

        let mut candidates = Vec::with_capacity(fits.len());
        for (j, fit) in fits.into_iter().enumerate() {
            match fit {
                Ok(fit) => candidates.push(Some(fit)),
                Err(reason) => {
                    self.exclude(j, iteration, reason);
                    candidates.push(None);
                },
            }
        }

        let selected = select(&candidates)
            .and_then(|j| candidates[j].take().map(|fit| (j, fit)));
        let step = match selected {
            Some((j, fit)) => {
                let nu = self.shrinkage;
                self.predictions.par_iter_mut()
                    .zip(&fit.fitted)
                    .for_each(|(p, f)| { *p += nu * f; });

                log::debug!(
                    "iteration {iteration}: selected `{}` (sse {:.6e}, df {:.3})",
                    self.terms[j].predictor(), fit.sse, fit.df,
                );
                BoostingStep {
                    term: Some(j),
                    update: fit.contribution.scaled(nu),
                    sse: fit.sse,
                    df: fit.df,
                }
            },
            None => {
                log::debug!("iteration {iteration}: every term is degenerate");
                let sse = residuals.iter()
                    .zip(&self.train_weights)
                    .map(|(u, w)| w * u * u)
                    .sum::<f64>();
                BoostingStep {
                    term: None,
                    update: Contribution::Zero,
                    sse,
                    df: 0.0,
                }
            },
        };

        self.path.steps.push(step);
        self.record_risk();

        ControlFlow::Continue(())
    }


    fn postprocess(&mut self) -> Self::Output {
        self.learners.clear();
        mem::take(&mut self.path)
    }
}
