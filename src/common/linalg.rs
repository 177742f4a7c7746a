//! Small dense solves on top of `faer`.
//! The matrices here are at most a few dozen columns wide
//! (one column per basis function), so copies are cheap.
use faer::linalg::solvers::{self, Solve};
use faer::{Mat, MatRef, Side};
use ndarray::{Array1, Array2};
use thiserror::Error;


/// Condition estimate above which a solve is reported as unstable.
pub(crate) const UNSTABLE_CONDITION: f64 = 1e10;
/// Condition estimate above which a system is treated as singular.
pub(crate) const SINGULAR_CONDITION: f64 = 1e14;


#[derive(Debug, Error)]
pub(crate) enum LinalgError {
    #[error("Cholesky factorization failed: {0:?}")]
    Cholesky(solvers::LltError),
    #[error("matrix is numerically singular (condition estimate {0:.3e})")]
    Singular(f64),
}


fn to_mat(array: &Array2<f64>) -> Mat<f64> {
    let (rows, cols) = array.dim();
    Mat::from_fn(rows, cols, |i, j| array[(i, j)])
}


fn mat_to_array(mat: MatRef<'_, f64>) -> Array2<f64> {
    Array2::from_shape_fn((mat.nrows(), mat.ncols()), |(i, j)| mat[(i, j)])
}


/// Cholesky factor of a symmetric positive definite matrix.
pub(crate) struct Cholesky {
    factor: solvers::Llt<f64>,
    condition: f64,
}


impl Cholesky {
    /// Factorize `a`.
    /// Fails if `a` is not positive definite
    /// or if its condition estimate exceeds `SINGULAR_CONDITION`.
    pub(crate) fn factorize(a: &Array2<f64>) -> Result<Self, LinalgError> {
        let mat = to_mat(a);
        let factor = mat.as_ref()
            .llt(Side::Lower)
            .map_err(LinalgError::Cholesky)?;

        let l = factor.L();
        let (lo, hi) = (0..l.nrows())
            .map(|i| l[(i, i)].abs())
            .fold((f64::MAX, 0.0_f64), |(lo, hi), d| (lo.min(d), hi.max(d)));
        let condition = if lo > 0.0 { (hi / lo).powi(2) } else { f64::INFINITY };
        if condition > SINGULAR_CONDITION {
            return Err(LinalgError::Singular(condition));
        }

        Ok(Self { factor, condition })
    }


    /// Squared ratio of the extreme diagonal entries of the factor.
    /// This is a cheap lower bound on the 2-norm condition number.
    #[inline]
    pub(crate) fn condition_estimate(&self) -> f64 {
        self.condition
    }


    pub(crate) fn solve_vec(&self, rhs: &Array1<f64>) -> Array1<f64> {
        let rhs = Mat::from_fn(rhs.len(), 1, |i, _| rhs[i]);
        let sol = self.factor.solve(rhs.as_ref());
        Array1::from_shape_fn(sol.nrows(), |i| sol[(i, 0)])
    }


    pub(crate) fn solve_mat(&self, rhs: &Array2<f64>) -> Array2<f64> {
        let rhs = to_mat(rhs);
        let sol = self.factor.solve(rhs.as_ref());
        mat_to_array(sol.as_ref())
    }


    /// The inverse of the factorized matrix.
    pub(crate) fn inverse(&self) -> Array2<f64> {
        let n = self.factor.L().nrows();
        self.solve_mat(&Array2::eye(n))
    }
}


/// `Xᵀ W X` for the design `x` and the diagonal weights `w`.
pub(crate) fn weighted_gram(x: &Array2<f64>, w: &[f64]) -> Array2<f64> {
    let w = Array1::from_vec(w.to_vec());
    let wx = x * &w.insert_axis(ndarray::Axis(1));
    x.t().dot(&wx)
}


/// `Xᵀ W u` for the design `x`, the diagonal weights `w`,
/// and the vector `u`.
pub(crate) fn weighted_cross(x: &Array2<f64>, w: &[f64], u: &[f64]) -> Array1<f64> {
    let wu = w.iter()
        .zip(u)
        .map(|(w, u)| w * u)
        .collect::<Array1<f64>>();
    x.t().dot(&wu)
}


/// Trace of the product `a b` of two square matrices.
pub(crate) fn trace_of_product(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    let n = a.nrows();
    (0..n)
        .map(|i| a.row(i).dot(&b.column(i)))
        .sum()
}
