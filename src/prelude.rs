//! Exports the standard types, traits, and functions.
//!

pub use crate::sample::{
    Sample,
    Feature,
};


pub use crate::model::{
    // Term list
    ModelBuilder,
    ModelTerm,
    TermList,


    // Learner parameters
    LearnerKind,
    SplineConfig,
    Penalty,
    Direction,
};


pub use crate::booster::{
    // Booster trait
    Booster,

    ComponentwiseBoost,
    BoostingPath,
    PathView,
    fit_path,
};


pub use crate::base_learner::{
    // Base Learner trait
    BaseLearner,
    BasisCache,
};


pub use crate::common::{
    LossFunction,
    GBMLoss,
};


pub use crate::predictor::{
    PartialEffect,
    predict,
    partial_effect,
};


pub use crate::research::{
    CrossValidator,
    CvResult,
    Resampling,
    cross_validate,
    cross_validate_variants,
};


pub use crate::error::{
    ConfigurationError,
    DegenerateFitError,
    FitWarning,
};
