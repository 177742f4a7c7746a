//! Cross-validation of the number of boosting iterations.
//! - Fold generation (k-fold, bootstrap, subsampling)
//! - Held-out risk curves and the stopping iteration

/// Generates the training/test pairs.
pub mod resampling;

/// Runs a boosting path per fold.
pub mod cross_validator;


pub use resampling::{Resampler, Resampling, Fold};
pub use cross_validator::{
    CrossValidator,
    CvResult,
    cross_validate,
    cross_validate_variants,
};
