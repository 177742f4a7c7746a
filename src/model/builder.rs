use crate::Sample;
use crate::common::checker;
use crate::error::ConfigurationError;
use super::term::*;

use std::ops::Deref;


/// A term list that passed the validation against a [`Sample`].
/// Dereferences to `[ModelTerm]`.
#[derive(Clone, Debug, PartialEq)]
pub struct TermList {
    terms: Vec<ModelTerm>,
}


impl TermList {
    /// Returns the terms as a vector.
    pub fn into_inner(self) -> Vec<ModelTerm> {
        self.terms
    }
}


impl Deref for TermList {
    type Target = [ModelTerm];
    fn deref(&self) -> &Self::Target {
        &self.terms[..]
    }
}


impl AsRef<[ModelTerm]> for TermList {
    fn as_ref(&self) -> &[ModelTerm] {
        &self.terms[..]
    }
}


/// A struct that builds a [`TermList`].
/// The builder replaces formula strings such as
/// `y ~ bols(x1) + bbs(x2) + bmono(x3)`.
///
/// # Example
/// ```
/// use gamboost::prelude::*;
///
/// let sample = Sample::from_columns(
///     vec![
///         ("x1", vec![0.0, 1.0, 2.0, 3.0]),
///         ("x2", vec![1.0, 0.0, 1.0, 0.0]),
///     ],
///     vec![0.1, 0.9, 2.1, 2.9],
/// ).unwrap();
///
/// let terms = ModelBuilder::new()
///     .ols("x1")
///     .categorical("x2")
///     .build(&sample)
///     .unwrap();
/// assert_eq!(terms.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ModelBuilder {
    terms: Vec<ModelTerm>,
}


impl ModelBuilder {
    /// Construct an empty builder.
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }


    /// Append an arbitrary term.
    pub fn term(mut self, term: ModelTerm) -> Self {
        self.terms.push(term);
        self
    }


    /// Append a linear term with intercept.
    pub fn ols<S: ToString>(self, predictor: S) -> Self {
        self.term(ModelTerm::ols(predictor))
    }


    /// Append a linear term without intercept.
    pub fn ols_without_intercept<S: ToString>(self, predictor: S) -> Self {
        self.term(ModelTerm::new(predictor, LearnerKind::Ols { intercept: false }))
    }


    /// Append a dummy-coded categorical term.
    pub fn categorical<S: ToString>(self, predictor: S) -> Self {
        self.term(ModelTerm::categorical(predictor))
    }


    /// Append a P-spline term with the default configuration.
    pub fn spline<S: ToString>(self, predictor: S) -> Self {
        self.term(ModelTerm::spline(predictor))
    }


    /// Append a P-spline term with the given configuration.
    pub fn spline_with<S: ToString>(self, predictor: S, config: SplineConfig)
        -> Self
    {
        self.term(ModelTerm::new(predictor, LearnerKind::PSpline(config)))
    }


    /// Append a monotone P-spline term with the default configuration.
    pub fn monotone<S: ToString>(self, predictor: S, direction: Direction)
        -> Self
    {
        self.term(ModelTerm::monotone(predictor, direction))
    }


    /// Append a monotone P-spline term with the given configuration.
    pub fn monotone_with<S: ToString>(
        self,
        predictor: S,
        config: SplineConfig,
        direction: Direction,
    ) -> Self
    {
        let kind = LearnerKind::Monotone(config, direction);
        self.term(ModelTerm::new(predictor, kind))
    }


    /// Append a tree-stump term.
    pub fn stump<S: ToString>(self, predictor: S) -> Self {
        self.term(ModelTerm::stump(predictor))
    }


    /// Validate the terms against `sample` and build a [`TermList`].
    /// This method consumes `self`.
    pub fn build(self, sample: &Sample) -> Result<TermList, ConfigurationError> {
        checker::check_terms(sample, &self.terms[..])?;
        Ok(TermList { terms: self.terms })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sample {
        Sample::from_columns(
            vec![("a", vec![0.0, 1.0, 2.0]), ("b", vec![1.0, 1.0, 0.0])],
            vec![1.0, 2.0, 3.0],
        ).unwrap()
    }


    #[test]
    fn unknown_predictor_is_rejected() {
        let err = ModelBuilder::new()
            .ols("a")
            .spline("c")
            .build(&sample())
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownPredictor("c".into()));
    }


    #[test]
    fn duplicate_predictor_is_rejected() {
        let err = ModelBuilder::new()
            .ols("a")
            .stump("a")
            .build(&sample())
            .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicatePredictor("a".into()));
    }


    #[test]
    fn empty_builder_is_rejected() {
        let err = ModelBuilder::new().build(&sample()).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyTermList);
    }
}
