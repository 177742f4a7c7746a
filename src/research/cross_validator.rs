use rayon::prelude::*;
use colored::Colorize;
use serde::{Serialize, Deserialize};

use crate::{
    common::loss_functions::GBMLoss,
    common::checker,
    base_learner::BasisCache,
    booster::componentwise::{DEFAULT_MAX_ITER, DEFAULT_SHRINKAGE},
    error::{ConfigurationError, Result},
    Booster,
    ComponentwiseBoost,
    ModelTerm,
    Sample,
};
use super::resampling::{Fold, Resampler, Resampling};


/// The number of folds set as default.
pub const DEFAULT_N_FOLDS: usize = 10;
/// The seed set as default.
pub const DEFAULT_SEED: u64 = 1234;

const WIDTH: usize = 12;


/// The outcome of a cross-validation.
/// Entry `k` of each curve is the risk of the model after `k` iterations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CvResult {
    resampling: Resampling,
    fold_risk: Vec<Vec<f64>>,
    mean_risk: Vec<f64>,
    best_mstop: usize,
}


impl CvResult {
    /// Build the result from the held-out risk curve of every fold.
    fn from_folds(resampling: Resampling, fold_risk: Vec<Vec<f64>>) -> Self {
        let n_folds = fold_risk.len() as f64;
        let len = fold_risk.first().map_or(0, Vec::len);

        let mean_risk = (0..len)
            .map(|k| fold_risk.iter().map(|curve| curve[k]).sum::<f64>() / n_folds)
            .collect::<Vec<_>>();

        let best_mstop = argmin(&mean_risk);
        Self { resampling, fold_risk, mean_risk, best_mstop }
    }


    /// The resampling scheme.
    pub fn resampling(&self) -> Resampling {
        self.resampling
    }


    /// Held-out risk curve of every fold.
    pub fn fold_risk(&self) -> &[Vec<f64>] {
        &self.fold_risk
    }


    /// Mean held-out risk over the folds, indexed by `0..=mstop_max`.
    ///
    /// Entry `0` is the held-out loss of the offset fitted on the
    /// training rows of each fold. For the L2 loss this is the mean
    /// squared deviation of the held-out responses from the training mean,
    /// that is, the held-out variance plus the squared shift between the
    /// held-out mean and the training mean.
    pub fn mean_risk(&self) -> &[f64] {
        &self.mean_risk
    }


    /// The iteration that minimizes the mean risk.
    /// Ties go to the smallest iteration.
    pub fn best_mstop(&self) -> usize {
        self.best_mstop
    }


    /// Number of folds that contributed to the mean.
    pub fn n_folds(&self) -> usize {
        self.fold_risk.len()
    }
}


/// Index of the first minimum.
fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (k, v) in values.iter().enumerate() {
        if *v < values[best] {
            best = k;
        }
    }
    best
}


/// Cross-validation of the number of boosting iterations.
///
/// Each fold runs a fresh [`ComponentwiseBoost`] on the full sample,
/// with zero weight on the rows that are not used for training,
/// and records the mean loss on the test rows at every iteration.
///
/// # Example
/// ```no_run
/// use gamboost::prelude::*;
///
/// # let sample: Sample = unimplemented!();
/// let terms = ModelBuilder::new()
///     .spline("x1")
///     .monotone("x2", Direction::Increasing)
///     .build(&sample)
///     .unwrap();
///
/// let cv = CrossValidator::new(&sample, &terms)
///     .max_iter(500)
///     .n_folds(5)
///     .seed(777)
///     .verbose(true)
///     .evaluate()
///     .unwrap();
///
/// let path = fit_path(&sample, &terms, cv.best_mstop().max(1), 0.1).unwrap();
/// ```
pub struct CrossValidator<'a> {
    sample: &'a Sample,
    terms: Vec<ModelTerm>,
    cache: Option<&'a BasisCache<'a>>,

    max_iter: usize,
    n_folds: usize,
    seed: u64,
    resampling: Resampling,
    shrinkage: f64,
    loss: GBMLoss,
    verbose: bool,
}


impl<'a> CrossValidator<'a> {
    /// Construct a new instance of `CrossValidator`
    /// with the default parameters.
    pub fn new(sample: &'a Sample, terms: &[ModelTerm]) -> Self {
        Self {
            sample,
            terms: terms.to_vec(),
            cache: None,

            max_iter: DEFAULT_MAX_ITER,
            n_folds: DEFAULT_N_FOLDS,
            seed: DEFAULT_SEED,
            resampling: Resampling::KFold,
            shrinkage: DEFAULT_SHRINKAGE,
            loss: GBMLoss::default(),
            verbose: false,
        }
    }


    /// Set the maximal number of boosting iterations.
    /// Default value is `100`.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }


    /// Set the number of folds.
    /// Default value is `10`.
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the seed of the randomness.
    /// Default value is `1234`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the resampling scheme.
    /// Default is [`Resampling::KFold`].
    pub fn resampling(mut self, resampling: Resampling) -> Self {
        self.resampling = resampling;
        self
    }


    /// Set the shrinkage parameter.
    /// Default value is `0.1`.
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


    /// Set the verbose parameter.
    /// If `true`, the fold sizes and a summary are printed.
    /// Default value is `false`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Reuse the design matrices in `cache`.
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

        let disjoint = self.resampling == Resampling::KFold;
        checker::check_folds(self.n_folds, n_sample, disjoint)?;

        if let Resampling::Subsampling(ratio) = self.resampling {
            if !(ratio > 0.0 && ratio < 1.0) {
                return Err(ConfigurationError::InvalidParameter(
                    format!("subsampling ratio must lie in (0, 1), got {ratio}")
                ));
            }
        }
        Ok(())
    }


    /// Generate the folds from a single seeded generator.
    fn folds(&self) -> Vec<Fold> {
        Resampler::new(self.sample.shape().0)
            .n_folds(self.n_folds)
            .seed(self.seed)
            .resampling(self.resampling)
            .verbose(self.verbose)
            .collect()
    }


    /// Run the cross-validation.
    pub fn evaluate(&self) -> Result<CvResult> {
        self.validate()?;

        let own_cache;
        let cache = match self.cache {
            Some(cache) => cache,
            None => {
                own_cache = BasisCache::build(self.sample, &self.terms);
                &own_cache
            },
        };

        let folds = self.folds()
            .into_iter()
            .enumerate()
            .filter(|(k, fold)| {
                if fold.test.is_empty() {
                    log::warn!("fold {} has no test row and is skipped", k + 1);
                }
                !fold.test.is_empty()
            })
            .map(|(_, fold)| fold)
            .collect::<Vec<_>>();

        if folds.is_empty() {
            return Err(ConfigurationError::InvalidParameter(
                "no fold has a test row".into()
            ).into());
        }

        let fold_risk = folds.into_par_iter()
            .map(|fold| -> Result<Vec<f64>> {
                let path = ComponentwiseBoost::init(self.sample, &self.terms)
                    .max_iter(self.max_iter)
                    .shrinkage(self.shrinkage)
                    .loss(self.loss)
                    .weights(fold.train_weights)
                    .holdout(fold.test)
                    .cache(cache)
                    .run()?;
                Ok(path.holdout_risk().to_vec())
            })
            .collect::<Result<Vec<_>>>()?;

        let result = CvResult::from_folds(self.resampling, fold_risk);

        log::info!(
            "{} cross-validation over {} folds: best mstop = {} (risk {:.6e})",
            self.resampling,
            result.n_folds(),
            result.best_mstop(),
            result.mean_risk()[result.best_mstop()],
        );
        if self.verbose {
            self.print_summary(&result);
        }

        Ok(result)
    }


    fn print_summary(&self, result: &CvResult) {
        let best = result.best_mstop();
        println!(
            "{}    {}    {}",
            format!("  [{: >9}]", result.resampling()).bold().red(),
            format!("[MSTOP {:>WIDTH$}]", best).bold().green(),
            format!("[RISK {:>WIDTH$.6}]", result.mean_risk()[best]).bold().yellow(),
        );
    }
}


/// Cross-validate `terms` with `fold_count` shuffled folds.
pub fn cross_validate(
    sample: &Sample,
    terms: &[ModelTerm],
    mstop_max: usize,
    fold_count: usize,
    seed: u64,
) -> Result<CvResult>
{
    CrossValidator::new(sample, terms)
        .max_iter(mstop_max)
        .n_folds(fold_count)
        .seed(seed)
        .evaluate()
}


/// Cross-validate several term lists on the same folds.
/// The design matrices are built once and shared by every variant.
pub fn cross_validate_variants<T>(
    sample: &Sample,
    variants: &[T],
    mstop_max: usize,
    fold_count: usize,
    seed: u64,
) -> Result<Vec<CvResult>>
    where T: AsRef<[ModelTerm]> + Sync,
{
    let cache = BasisCache::build(
        sample,
        variants.iter().flat_map(|terms| terms.as_ref().iter()),
    );

    variants.par_iter()
        .map(|terms| {
            CrossValidator::new(sample, terms.as_ref())
                .max_iter(mstop_max)
                .n_folds(fold_count)
                .seed(seed)
                .cache(&cache)
                .evaluate()
        })
        .collect()
}
