//! B-spline basis on equally spaced knots and the difference penalty.
//!
//! The knot vector covers `[lower, upper]` with `n_knots` interior knots
//! and is extended by `degree` knots beyond either boundary,
//! so that the basis forms a partition of unity on the whole range.
use ndarray::Array2;


/// Equally spaced knot vector over `[lower, upper]`.
/// Its length is `n_knots + 2 + 2 * degree`.
pub(crate) fn knot_vector(
    lower: f64,
    upper: f64,
    n_knots: usize,
    degree: usize,
) -> Vec<f64>
{
    let step = (upper - lower) / (n_knots + 1) as f64;
    let n_total = n_knots + 2 + 2 * degree;
    (0..n_total)
        .map(|j| lower + (j as f64 - degree as f64) * step)
        .collect()
}


/// Returns the index `j` of the knot span `[t_j, t_{j+1}]`
/// that contains `x`, restricted to the valid range of the basis.
fn knot_span(x: f64, knots: &[f64], degree: usize) -> usize {
    let first = degree;
    let last = knots.len() - degree - 2;
    let mut span = first;
    while span < last && knots[span + 1] <= x {
        span += 1;
    }
    span
}


/// Cox-de Boor recursion.
/// Returns the basis rows of degree `degree - 1` and `degree` at `x`.
/// The first one has `n_basis + 1` entries, the second `n_basis`.
fn recursion(x: f64, knots: &[f64], degree: usize) -> (Vec<f64>, Vec<f64>) {
    let m = knots.len();
    let span = knot_span(x, knots, degree);

    let mut current = vec![0.0; m - 1];
    current[span] = 1.0;
    let mut previous = current.clone();

    for k in 1..=degree {
        let mut next = vec![0.0; m - 1 - k];
        for (i, b) in next.iter_mut().enumerate() {
            let left_den = knots[i + k] - knots[i];
            let right_den = knots[i + k + 1] - knots[i + 1];

            let left = if left_den > 0.0 {
                (x - knots[i]) / left_den * current[i]
            } else {
                0.0
            };
            let right = if right_den > 0.0 {
                (knots[i + k + 1] - x) / right_den * current[i + 1]
            } else {
                0.0
            };
            *b = left + right;
        }
        previous = std::mem::replace(&mut current, next);
    }

    (previous, current)
}


/// Values of the B-spline basis functions at `x`.
/// `x` is clamped to the boundary knots.
pub(crate) fn basis_row(x: f64, knots: &[f64], degree: usize) -> Vec<f64> {
    let x = clamp_to_range(x, knots, degree);
    recursion(x, knots, degree).1
}


/// First derivatives of the B-spline basis functions at `x`.
/// `x` is clamped to the boundary knots.
pub(crate) fn derivative_row(x: f64, knots: &[f64], degree: usize) -> Vec<f64> {
    let x = clamp_to_range(x, knots, degree);
    let (lower_degree, _) = recursion(x, knots, degree);

    let n_basis = knots.len() - degree - 1;
    let p = degree as f64;
    (0..n_basis)
        .map(|i| {
            let left_den = knots[i + degree] - knots[i];
            let right_den = knots[i + degree + 1] - knots[i + 1];
            let left = if left_den > 0.0 { lower_degree[i] / left_den } else { 0.0 };
            let right = if right_den > 0.0 { lower_degree[i + 1] / right_den } else { 0.0 };
            p * (left - right)
        })
        .collect()
}


/// Boundary knots `(lower, upper)` of the valid range.
#[inline]
pub(crate) fn boundary(knots: &[f64], degree: usize) -> (f64, f64) {
    (knots[degree], knots[knots.len() - degree - 1])
}


#[inline]
fn clamp_to_range(x: f64, knots: &[f64], degree: usize) -> f64 {
    let (lower, upper) = boundary(knots, degree);
    x.clamp(lower, upper)
}


/// `DᵀD` where `D` is the difference matrix of the given `order`
/// on `n_basis` coefficients.
pub(crate) fn difference_penalty(n_basis: usize, order: usize) -> Array2<f64> {
    let mut d = Array2::<f64>::eye(n_basis);
    for _ in 0..order {
        let rows = d.nrows();
        let next = Array2::from_shape_fn((rows - 1, n_basis), |(i, j)| {
            d[(i + 1, j)] - d[(i, j)]
        });
        d = next;
    }
    d.t().dot(&d)
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn knot_vector_has_the_expected_length() {
        let knots = knot_vector(0.0, 1.0, 4, 3);
        assert_eq!(knots.len(), 4 + 2 + 6);
        assert_abs_diff_eq!(knots[3], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(knots[8], 1.0, epsilon = 1e-12);
        assert_eq!(boundary(&knots, 3), (knots[3], knots[8]));
    }


    #[test]
    fn basis_is_a_partition_of_unity() {
        let knots = knot_vector(-2.0, 5.0, 6, 3);
        for &x in &[-2.0, -1.3, 0.0, 0.7, 2.5, 4.99, 5.0] {
            let row = basis_row(x, &knots, 3);
            assert_eq!(row.len(), 6 + 3 + 1);
            assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert!(row.iter().all(|b| *b >= -1e-15));
        }
    }


    #[test]
    fn derivative_matches_finite_differences() {
        let knots = knot_vector(0.0, 10.0, 5, 3);
        let coef = (0..9).map(|i| (i as f64).sin()).collect::<Vec<_>>();
        let value = |x: f64| {
            basis_row(x, &knots, 3).iter().zip(&coef).map(|(b, c)| b * c).sum::<f64>()
        };

        let x = 3.3;
        let h = 1e-6;
        let numeric = (value(x + h) - value(x - h)) / (2.0 * h);
        let analytic = derivative_row(x, &knots, 3).iter()
            .zip(&coef)
            .map(|(b, c)| b * c)
            .sum::<f64>();
        assert_abs_diff_eq!(numeric, analytic, epsilon = 1e-5);
    }


    #[test]
    fn derivative_of_a_linear_coefficient_sequence_is_constant() {
        // Equally spaced knots reproduce linear functions
        // from linearly increasing coefficients.
        let knots = knot_vector(0.0, 1.0, 3, 2);
        let coef = (0..6).map(|i| i as f64).collect::<Vec<_>>();
        let slope = |x: f64| {
            derivative_row(x, &knots, 2).iter().zip(&coef).map(|(b, c)| b * c).sum::<f64>()
        };
        assert_abs_diff_eq!(slope(0.1), slope(0.9), epsilon = 1e-10);
    }


    #[test]
    fn second_order_penalty_vanishes_on_linear_coefficients() {
        let p = difference_penalty(6, 2);
        let beta = ndarray::Array1::from_iter((0..6).map(|i| 2.0 * i as f64 + 1.0));
        let quad = beta.dot(&p.dot(&beta));
        assert_abs_diff_eq!(quad, 0.0, epsilon = 1e-12);
        assert_eq!(p.dim(), (6, 6));
    }
}
