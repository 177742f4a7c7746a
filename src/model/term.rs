use serde::{Serialize, Deserialize};

use std::fmt;


/// The number of interior knots set as default.
pub const DEFAULT_N_KNOTS: usize = 20;
/// The spline degree set as default.
pub const DEFAULT_DEGREE: usize = 3;
/// The order of the difference penalty set as default.
pub const DEFAULT_DIFFERENCE_ORDER: usize = 2;
/// The degrees of freedom of a smoother set as default.
pub const DEFAULT_DF: f64 = 4.0;


/// Direction of a monotonicity constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Non-decreasing effect.
    Increasing,
    /// Non-increasing effect.
    Decreasing,
}


impl Direction {
    /// `+1.0` for `Increasing`, `-1.0` for `Decreasing`.
    #[inline]
    pub(crate) fn sign(&self) -> f64 {
        match self {
            Self::Increasing => 1.0,
            Self::Decreasing => -1.0,
        }
    }
}


/// Strength of the difference penalty of a spline learner.
/// The strength is fixed for the whole boosting path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Penalty {
    /// Use the smoothing parameter `lambda` as is.
    Lambda(f64),
    /// Choose `lambda` so that the smoother has
    /// the given degrees of freedom.
    Df(f64),
}


/// Parameters of the penalized B-spline learners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplineConfig {
    /// Number of interior knots.
    pub n_knots: usize,
    /// Degree of the B-splines.
    pub degree: usize,
    /// Order of the difference penalty on the coefficients.
    pub difference_order: usize,
    /// Penalty strength.
    pub penalty: Penalty,
}


impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            n_knots: DEFAULT_N_KNOTS,
            degree: DEFAULT_DEGREE,
            difference_order: DEFAULT_DIFFERENCE_ORDER,
            penalty: Penalty::Df(DEFAULT_DF),
        }
    }
}


impl SplineConfig {
    /// Set the number of interior knots.
    pub fn n_knots(mut self, n_knots: usize) -> Self {
        self.n_knots = n_knots;
        self
    }


    /// Set the degree of the B-splines.
    pub fn degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }


    /// Set the order of the difference penalty.
    pub fn difference_order(mut self, order: usize) -> Self {
        self.difference_order = order;
        self
    }


    /// Set the penalty.
    pub fn penalty(mut self, penalty: Penalty) -> Self {
        self.penalty = penalty;
        self
    }


    /// Number of B-spline basis functions.
    #[inline]
    pub fn n_basis(&self) -> usize {
        self.n_knots + self.degree + 1
    }


    /// Checks the parameters, returning a description of the first problem.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.degree < 1 {
            return Err(format!("spline degree must be >= 1, got {}", self.degree));
        }
        let n_basis = self.n_basis();
        if self.difference_order >= n_basis {
            return Err(format!(
                "difference order {} must be less than \
                the number of basis functions {n_basis}",
                self.difference_order,
            ));
        }
        match self.penalty {
            Penalty::Lambda(lambda) if !(lambda >= 0.0 && lambda.is_finite()) => {
                Err(format!("lambda must be finite and non-negative, got {lambda}"))
            },
            Penalty::Df(df) => {
                let lower = self.difference_order.max(1) as f64;
                if !(lower < df && df <= n_basis as f64) {
                    Err(format!(
                        "df must lie in ({lower}, {n_basis}], got {df}"
                    ))
                } else {
                    Ok(())
                }
            },
            _ => Ok(()),
        }
    }
}


/// The type of base learner that fits a term.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LearnerKind {
    /// Weighted linear least squares.
    Ols {
        /// Whether the term has its own intercept.
        intercept: bool,
    },
    /// Dummy-coded least squares for a categorical predictor.
    /// The smallest level is the reference level.
    Categorical,
    /// Penalized B-spline smoother.
    PSpline(SplineConfig),
    /// Penalized B-spline smoother with monotone coefficients.
    Monotone(SplineConfig, Direction),
    /// Single-split regression tree.
    Stump,
}


impl fmt::Display for LearnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ols { intercept: true } => write!(f, "ols"),
            Self::Ols { intercept: false } => write!(f, "ols (no intercept)"),
            Self::Categorical => write!(f, "categorical"),
            Self::PSpline(config) => {
                write!(f, "pspline ({} knots, degree {})", config.n_knots, config.degree)
            },
            Self::Monotone(config, dir) => {
                write!(
                    f,
                    "monotone pspline ({} knots, degree {}, {dir:?})",
                    config.n_knots,
                    config.degree,
                )
            },
            Self::Stump => write!(f, "stump"),
        }
    }
}


/// A term of the additive model.
/// Each term is a pair of a predictor name and the base learner
/// that models the effect of the predictor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelTerm {
    predictor: String,
    kind: LearnerKind,
}


impl ModelTerm {
    /// Construct a new term.
    pub fn new<S: ToString>(predictor: S, kind: LearnerKind) -> Self {
        Self { predictor: predictor.to_string(), kind }
    }


    /// Linear term with intercept.
    pub fn ols<S: ToString>(predictor: S) -> Self {
        Self::new(predictor, LearnerKind::Ols { intercept: true })
    }


    /// Dummy-coded categorical term.
    pub fn categorical<S: ToString>(predictor: S) -> Self {
        Self::new(predictor, LearnerKind::Categorical)
    }


    /// P-spline term with the default configuration.
    pub fn spline<S: ToString>(predictor: S) -> Self {
        Self::new(predictor, LearnerKind::PSpline(SplineConfig::default()))
    }


    /// Monotone P-spline term with the default configuration.
    pub fn monotone<S: ToString>(predictor: S, direction: Direction) -> Self {
        Self::new(
            predictor,
            LearnerKind::Monotone(SplineConfig::default(), direction),
        )
    }


    /// Tree-stump term.
    pub fn stump<S: ToString>(predictor: S) -> Self {
        Self::new(predictor, LearnerKind::Stump)
    }


    /// Predictor name.
    #[inline]
    pub fn predictor(&self) -> &str {
        &self.predictor
    }


    /// Base learner type.
    #[inline]
    pub fn kind(&self) -> &LearnerKind {
        &self.kind
    }


    /// Monotonicity direction, if the term is constrained.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        match self.kind {
            LearnerKind::Monotone(_, dir) => Some(dir),
            _ => None,
        }
    }
}


impl fmt::Display for ModelTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.predictor, self.kind)
    }
}
