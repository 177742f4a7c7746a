//! Design matrices of the base learners and their per-sample cache.
use ndarray::Array2;
use serde::{Serialize, Deserialize};

use crate::{Sample, ModelTerm, LearnerKind};
use crate::error::DegenerateFitError;
use crate::sample::feature_struct::distinct_values;
use super::bspline;

use std::collections::HashMap;
use std::sync::Arc;


/// The map from a predictor value to a design row.
/// A `TermBasis` is built once from the full predictor column
/// and stored in the fitted path,
/// so that the contributions can be evaluated at new values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TermBasis {
    /// `[1, x]` or `[x]`.
    Linear {
        /// Whether the first column is the intercept.
        intercept: bool,
    },
    /// `[1, 1{x == l_1}, ..., 1{x == l_k}]`.
    /// `levels[0]` is the reference level.
    Categorical {
        /// Sorted distinct values of the predictor.
        levels: Vec<f64>,
    },
    /// B-spline basis on equally spaced knots.
    BSpline {
        /// Full knot vector.
        knots: Vec<f64>,
        /// Degree of the splines.
        degree: usize,
    },
    /// Tree stumps carry their own split rule.
    Stump,
}


impl TermBasis {
    /// Build the basis of `kind` from the predictor column.
    pub(crate) fn build(kind: &LearnerKind, column: &[f64])
        -> Result<Self, DegenerateFitError>
    {
        let basis = match kind {
            LearnerKind::Ols { intercept } => {
                Self::Linear { intercept: *intercept }
            },
            LearnerKind::Categorical => {
                let levels = distinct_values(column);
                if levels.len() < 2 {
                    return Err(DegenerateFitError::ZeroVariance);
                }
                Self::Categorical { levels }
            },
            LearnerKind::PSpline(config) | LearnerKind::Monotone(config, _) => {
                let (lower, upper) = column.iter()
                    .fold((f64::MAX, f64::MIN), |(lo, hi), &x| {
                        (lo.min(x), hi.max(x))
                    });
                if !(lower.is_finite() && upper.is_finite()) {
                    return Err(DegenerateFitError::NonFinite);
                }
                if !(lower < upper) {
                    return Err(DegenerateFitError::ZeroVariance);
                }
                let knots = bspline::knot_vector(
                    lower, upper, config.n_knots, config.degree,
                );
                Self::BSpline { knots, degree: config.degree }
            },
            LearnerKind::Stump => Self::Stump,
        };
        Ok(basis)
    }


    /// Number of coefficients of a contribution on this basis.
    /// Stumps have no coefficient vector.
    pub fn n_coefficients(&self) -> usize {
        match self {
            Self::Linear { intercept: true } => 2,
            Self::Linear { intercept: false } => 1,
            Self::Categorical { levels } => levels.len(),
            Self::BSpline { knots, degree } => knots.len() - degree - 1,
            Self::Stump => 0,
        }
    }


    /// Design row at `x`.
    /// B-spline rows are evaluated at `x` clamped to the boundary knots.
    pub(crate) fn row(&self, x: f64) -> Vec<f64> {
        match self {
            Self::Linear { intercept: true } => vec![1.0, x],
            Self::Linear { intercept: false } => vec![x],
            Self::Categorical { levels } => {
                let mut row = vec![0.0; levels.len()];
                // Levels unseen in training contribute nothing.
                if let Some(k) = level_index(levels, x) {
                    row[0] = 1.0;
                    if k > 0 { row[k] = 1.0; }
                }
                row
            },
            Self::BSpline { knots, degree } => {
                bspline::basis_row(x, knots, *degree)
            },
            Self::Stump => Vec::new(),
        }
    }


    /// Design matrix for the whole column.
    pub(crate) fn design(&self, column: &[f64]) -> Array2<f64> {
        let n_coef = self.n_coefficients();
        let mut design = Array2::zeros((column.len(), n_coef));
        for (mut dst, &x) in design.rows_mut().into_iter().zip(column) {
            for (d, v) in dst.iter_mut().zip(self.row(x)) {
                *d = v;
            }
        }
        design
    }


    /// Evaluates `row(x) · coef`.
    /// Outside of the boundary knots, B-spline contributions
    /// are extended linearly with the boundary slope.
    pub fn evaluate(&self, coef: &[f64], x: f64) -> f64 {
        let dot = |row: Vec<f64>| {
            row.iter().zip(coef).map(|(r, c)| r * c).sum::<f64>()
        };
        match self {
            Self::BSpline { knots, degree } => {
                let (lower, upper) = bspline::boundary(knots, *degree);
                let edge = x.clamp(lower, upper);
                let value = dot(bspline::basis_row(edge, knots, *degree));
                if x == edge {
                    value
                } else {
                    let slope = dot(bspline::derivative_row(edge, knots, *degree));
                    value + slope * (x - edge)
                }
            },
            _ => dot(self.row(x)),
        }
    }
}


/// Position of `x` in the sorted `levels`.
#[inline]
fn level_index(levels: &[f64], x: f64) -> Option<usize> {
    levels.binary_search_by(|l| l.total_cmp(&x)).ok()
}


/// A basis together with its evaluation on the training column.
#[derive(Debug)]
pub(crate) struct Design {
    pub(crate) basis: TermBasis,
    /// `n_sample x n_coefficients`, empty for stumps.
    pub(crate) matrix: Array2<f64>,
    /// Row indices sorted by the predictor value, used by stumps.
    pub(crate) order: Vec<usize>,
}


impl Design {
    pub(crate) fn build(kind: &LearnerKind, column: &[f64])
        -> Result<Self, DegenerateFitError>
    {
        let basis = TermBasis::build(kind, column)?;
        let matrix = basis.design(column);
        let order = match basis {
            TermBasis::Stump => {
                let mut order = (0..column.len()).collect::<Vec<_>>();
                order.sort_by(|&i, &j| column[i].total_cmp(&column[j]));
                order
            },
            _ => Vec::new(),
        };
        Ok(Self { basis, matrix, order })
    }
}


/// Cache key: the predictor and the layout of its basis.
/// The penalty strength does not change the design,
/// so it is not a part of the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BasisKey {
    predictor: String,
    layout: BasisLayout,
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum BasisLayout {
    Linear { intercept: bool },
    Categorical,
    BSpline { n_knots: usize, degree: usize },
    Sorted,
}


impl BasisKey {
    fn of(term: &ModelTerm) -> Self {
        let layout = match term.kind() {
            LearnerKind::Ols { intercept } => {
                BasisLayout::Linear { intercept: *intercept }
            },
            LearnerKind::Categorical => BasisLayout::Categorical,
            LearnerKind::PSpline(config) | LearnerKind::Monotone(config, _) => {
                BasisLayout::BSpline {
                    n_knots: config.n_knots,
                    degree: config.degree,
                }
            },
            LearnerKind::Stump => BasisLayout::Sorted,
        };
        Self { predictor: term.predictor().to_string(), layout }
    }
}


type CachedDesign = Result<Arc<Design>, DegenerateFitError>;


/// Memoized design matrices for one [`Sample`].
///
/// The cache is filled at construction and never mutated afterwards,
/// so it can be shared read-only across folds and model variants.
/// A spline term and a monotone term on the same predictor
/// with the same knots share one entry.
pub struct BasisCache<'a> {
    sample: &'a Sample,
    entries: HashMap<BasisKey, CachedDesign>,
}


impl<'a> BasisCache<'a> {
    /// Build the designs of every term in `terms`.
    /// Terms whose predictor does not exist in `sample` are skipped;
    /// the term validation reports them.
    pub fn build<'t, I>(sample: &'a Sample, terms: I) -> Self
        where I: IntoIterator<Item = &'t ModelTerm>,
    {
        let mut entries = HashMap::new();
        for term in terms {
            let key = BasisKey::of(term);
            if entries.contains_key(&key) { continue; }
            let Some(feature) = sample.feature(term.predictor()) else {
                continue;
            };
            let design = Design::build(term.kind(), feature.values())
                .map(Arc::new);
            entries.insert(key, design);
        }
        Self { sample, entries }
    }


    /// Returns the sample this cache is built on.
    pub fn sample(&self) -> &'a Sample {
        self.sample
    }


    /// Number of distinct designs in this cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }


    /// Returns `true` if this cache has no design.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }


    /// Returns the design of `term`.
    /// A term that is not in the cache is built on the fly
    /// (and not stored).
    pub(crate) fn design(&self, term: &ModelTerm) -> CachedDesign {
        if let Some(design) = self.entries.get(&BasisKey::of(term)) {
            return design.clone();
        }
        let feature = self.sample.feature(term.predictor())
            .ok_or(DegenerateFitError::ZeroVariance)?;
        Design::build(term.kind(), feature.values()).map(Arc::new)
    }
}
