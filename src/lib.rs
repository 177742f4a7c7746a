#![warn(missing_docs)]

//!
//! A crate that provides component-wise functional gradient boosting
//! for additive models.
//!
//! An additive model explains the response as
//! `offset + f_1(x_1) + ... + f_p(x_p)`.
//! Each `f_j` is fitted by the base learner of its term:
//!
//! - Linear least squares (`ols`) and dummy-coded categorical effects.
//! - Penalized B-splines (P-splines).
//! - Monotone P-splines,
//!     whose effect is non-decreasing or non-increasing.
//! - Tree stumps.
//!
//! In every iteration,
//! all the base learners fit the negative gradient of the loss,
//! and only the best one is added to the model after shrinkage.
//! Every iteration is recorded,
//! so a path fitted for `mstop_max` iterations
//! also holds the models of every smaller `mstop`,
//! and the cross-validation picks among them without refitting.
//!
//! ```no_run
//! use gamboost::prelude::*;
//!
//! # let sample: Sample = unimplemented!();
//! let terms = ModelBuilder::new()
//!     .spline("age")
//!     .monotone("dose", Direction::Increasing)
//!     .categorical("group")
//!     .build(&sample)
//!     .unwrap();
//!
//! let cv = cross_validate(&sample, &terms, 500, 10, 1234).unwrap();
//! let path = fit_path(&sample, &terms, 500, 0.1).unwrap();
//!
//! let fitted = predict(&path, cv.best_mstop(), &sample).unwrap();
//! let dose = partial_effect(&path, cv.best_mstop(), 1).unwrap();
//! println!("effect of dose at 2.5: {}", dose.eval(2.5));
//! ```

pub mod common;
pub mod error;
pub mod sample;
pub mod model;
pub mod base_learner;
pub mod booster;
pub mod predictor;
pub mod research;

pub mod prelude;


pub use error::{
    BoostError,
    ConfigurationError,
    DegenerateFitError,
    NumericInstabilityWarning,
    FitWarning,
    Result,
};

pub use sample::{Sample, Feature};

pub use model::{
    ModelTerm,
    LearnerKind,
    Direction,
    SplineConfig,
    Penalty,
    ModelBuilder,
    TermList,
};

pub use common::{LossFunction, GBMLoss};

pub use base_learner::{
    BaseLearner,
    BasisCache,
    Contribution,
    LearnerFit,
    TermBasis,
};

pub use booster::{
    Booster,
    ComponentwiseBoost,
    BoostingPath,
    BoostingStep,
    PathView,
    fit_path,
};

pub use predictor::{
    PartialEffect,
    predict,
    partial_effect,
};

pub use research::{
    CrossValidator,
    CvResult,
    Resampling,
    cross_validate,
    cross_validate_variants,
};
