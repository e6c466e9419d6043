//! Finite-difference Jacobians
//!
//! Central differences of a vector field `f: ℝᴺ × ℝᴹ → ℝᴺ` with respect
//! to its state and input arguments. Used to check closed-form
//! linearizations, never inside the simulation loop.

use nalgebra::{SMatrix, SVector};

/// Central-difference Jacobians `(∂f/∂x, ∂f/∂u)` at `(x, u)`
///
/// Each column `j` is `(f(x + ε·eⱼ) − f(x − ε·eⱼ)) / 2ε`, so the
/// truncation error is `O(ε²)`.
///
/// # Arguments
/// * `x` - State at which to differentiate
/// * `u` - Input at which to differentiate
/// * `eps` - Perturbation size (must be positive)
/// * `f` - Vector field f(x, u)
pub fn central_difference<const N: usize, const M: usize, E, F>(
    x: &SVector<f64, N>,
    u: &SVector<f64, M>,
    eps: f64,
    mut f: F,
) -> Result<(SMatrix<f64, N, N>, SMatrix<f64, N, M>), E>
where
    F: FnMut(&SVector<f64, N>, &SVector<f64, M>) -> Result<SVector<f64, N>, E>,
{
    let mut jac_x = SMatrix::<f64, N, N>::zeros();
    let mut jac_u = SMatrix::<f64, N, M>::zeros();

    for j in 0..N {
        let mut plus = *x;
        let mut minus = *x;
        plus[j] += eps;
        minus[j] -= eps;
        let column = (f(&plus, u)? - f(&minus, u)?) / (2.0 * eps);
        jac_x.set_column(j, &column);
    }

    for j in 0..M {
        let mut plus = *u;
        let mut minus = *u;
        plus[j] += eps;
        minus[j] -= eps;
        let column = (f(x, &plus)? - f(x, &minus)?) / (2.0 * eps);
        jac_u.set_column(j, &column);
    }

    Ok((jac_x, jac_u))
}
