//! Struct `Sample` represents a batch sample:
//! a set of named predictor columns and a response vector.

// Provides feature struct.
pub(crate) mod feature_struct;
// Provides sample struct.
pub(crate) mod sample_struct;


pub use sample_struct::Sample;
pub use feature_struct::Feature;
