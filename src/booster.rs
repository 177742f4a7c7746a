//! Provides the component-wise boosting algorithm and its output.

mod core;

/// Component-wise gradient boosting.
pub mod componentwise;
/// The fitted path and its truncations.
pub mod path;


/// Booster trait
pub use self::core::Booster;

pub use self::componentwise::ComponentwiseBoost;
pub use self::path::{BoostingPath, BoostingStep, PathView};


use crate::{Sample, ModelTerm};
use crate::error::Result;


/// Fit a boosting path of `mstop_max` iterations
/// with squared-error loss and unit weights.
///
/// This is a shorthand of
/// ```no_run
/// # use gamboost::prelude::*;
/// # let (sample, terms): (Sample, Vec<ModelTerm>) = unimplemented!();
/// let path = ComponentwiseBoost::init(&sample, &terms)
///     .max_iter(100)
///     .shrinkage(0.1)
///     .run();
/// ```
pub fn fit_path(
    sample: &Sample,
    terms: &[ModelTerm],
    mstop_max: usize,
    shrinkage: f64,
) -> Result<BoostingPath>
{
    ComponentwiseBoost::init(sample, terms)
        .max_iter(mstop_max)
        .shrinkage(shrinkage)
        .run()
}
