//! Active-set method for a bound-constrained quadratic program
//!
//! ```txt
//!     min  ½ γᵀ Q γ - cᵀ γ
//!     s.t. γ_i >= 0   for i >= n_free
//! ```
//!
//! where `Q` is symmetric positive definite.
//! This is the scheme of Lawson and Hanson's NNLS,
//! run on the quadratic form instead of a least-squares residual.
use ndarray::{Array1, Array2};

use crate::common::linalg::Cholesky;


/// Solve the program above.
///
/// Every iterate is feasible and the objective never increases,
/// so the current iterate is returned when a sub-problem cannot be solved
/// or the iteration limit is reached.
pub(crate) fn solve(q: &Array2<f64>, c: &Array1<f64>, n_free: usize) -> Array1<f64> {
    let n = c.len();
    let scale = c.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    let tol = 1e-10 * scale;
    let max_iter = 3 * n + 10;

    // `passive[i] == true` means `γ_i` is not held at its bound.
    let mut passive = (0..n).map(|i| i < n_free).collect::<Vec<_>>();
    let mut gamma = Array1::<f64>::zeros(n);

    if n_free > 0 {
        match solve_subproblem(q, c, &passive) {
            Some(z) => { gamma = z; },
            None => { return gamma; },
        }
    }

    for _ in 0..max_iter {
        // Multipliers of the bound constraints.
        let multiplier = c - &q.dot(&gamma);
        let entering = (n_free..n)
            .filter(|&i| !passive[i])
            .filter(|&i| multiplier[i] > tol)
            .max_by(|&i, &j| multiplier[i].total_cmp(&multiplier[j]));

        let Some(entering) = entering else { break; };
        passive[entering] = true;

        // Inner loop: move towards the unconstrained minimizer
        // on the passive set, dropping the variables that hit their bound.
        loop {
            let Some(z) = solve_subproblem(q, c, &passive) else {
                return gamma;
            };

            let blocking = (n_free..n)
                .filter(|&i| passive[i] && z[i] <= 0.0);
            let mut step = 1.0_f64;
            let mut blocked = false;
            for i in blocking {
                let denom = gamma[i] - z[i];
                let alpha = if denom > 0.0 { gamma[i] / denom } else { 0.0 };
                if alpha < step {
                    step = alpha;
                }
                blocked = true;
            }

            if !blocked {
                gamma = z;
                break;
            }

            gamma = &gamma + &(step * &(&z - &gamma));
            for i in n_free..n {
                if passive[i] && gamma[i] <= tol {
                    passive[i] = false;
                    gamma[i] = 0.0;
                }
            }
            if !passive[entering] {
                // The entering variable dropped out immediately.
                break;
            }
        }
    }

    gamma
}


/// Minimizer of the objective with the non-passive variables fixed at zero.
fn solve_subproblem(q: &Array2<f64>, c: &Array1<f64>, passive: &[bool])
    -> Option<Array1<f64>>
{
    let index = passive.iter()
        .enumerate()
        .filter_map(|(i, p)| p.then_some(i))
        .collect::<Vec<_>>();

    let k = index.len();
    let sub_q = Array2::from_shape_fn((k, k), |(a, b)| q[(index[a], index[b])]);
    let sub_c = Array1::from_shape_fn(k, |a| c[index[a]]);

    let cholesky = Cholesky::factorize(&sub_q).ok()?;
    let sub_z = cholesky.solve_vec(&sub_c);

    let mut z = Array1::zeros(c.len());
    for (a, &i) in index.iter().enumerate() {
        z[i] = sub_z[a];
    }
    Some(z)
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn unconstrained_minimizer_is_kept_when_feasible() {
        let q = array![[2.0, 0.5], [0.5, 1.0]];
        let c = array![1.0, 1.0];
        let gamma = solve(&q, &c, 0);

        let expected = Cholesky::factorize(&q).unwrap().solve_vec(&c);
        assert!(expected.iter().all(|v| *v > 0.0));
        assert_abs_diff_eq!(gamma[0], expected[0], epsilon = 1e-10);
        assert_abs_diff_eq!(gamma[1], expected[1], epsilon = 1e-10);
    }


    #[test]
    fn negative_coordinates_are_clamped() {
        // Separable problem: the solution is max(c_i / q_ii, 0).
        let q = Array2::from_diag(&array![1.0, 2.0, 4.0]);
        let c = array![1.0, -2.0, 2.0];
        let gamma = solve(&q, &c, 0);
        assert_abs_diff_eq!(gamma[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gamma[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gamma[2], 0.5, epsilon = 1e-12);
    }


    #[test]
    fn free_variables_may_be_negative() {
        let q = Array2::from_diag(&array![1.0, 1.0]);
        let c = array![-3.0, -1.0];
        let gamma = solve(&q, &c, 1);
        assert_abs_diff_eq!(gamma[0], -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gamma[1], 0.0, epsilon = 1e-12);
    }


    #[test]
    fn solution_satisfies_the_kkt_conditions() {
        let q = array![
            [4.0, 1.0, 0.5, 0.0],
            [1.0, 3.0, 1.0, 0.2],
            [0.5, 1.0, 2.0, 0.7],
            [0.0, 0.2, 0.7, 1.5],
        ];
        let c = array![1.0, -2.0, 0.5, -0.3];
        let gamma = solve(&q, &c, 1);

        let grad = q.dot(&gamma) - &c;
        assert_abs_diff_eq!(grad[0], 0.0, epsilon = 1e-9);
        for i in 1..4 {
            assert!(gamma[i] >= 0.0);
            assert!(grad[i] >= -1e-9);
            assert_abs_diff_eq!(gamma[i] * grad[i], 0.0, epsilon = 1e-9);
        }
    }
}
