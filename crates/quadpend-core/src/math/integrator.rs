//! Fixed-step explicit integrators
//!
//! All schemes advance `dx/dt = f(t, x)` by one constant step `dt`.
//! There is no error control: the step size is chosen by the caller
//! and never adapted.

use nalgebra::SVector;
use serde::{Deserialize, Serialize};

/// Explicit integration scheme used by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationScheme {
    /// Forward Euler (first order)
    Euler,
    /// Classic 4th-order Runge-Kutta
    #[default]
    Rk4,
}

impl IntegrationScheme {
    /// Advance `x` by one step of size `dt`, stopping at the first
    /// failed derivative evaluation.
    pub fn step<const N: usize, E, F>(
        self,
        x: &SVector<f64, N>,
        t: f64,
        dt: f64,
        f: F,
    ) -> Result<SVector<f64, N>, E>
    where
        F: FnMut(f64, &SVector<f64, N>) -> Result<SVector<f64, N>, E>,
    {
        match self {
            IntegrationScheme::Euler => try_euler(x, t, dt, f),
            IntegrationScheme::Rk4 => try_rk4(x, t, dt, f),
        }
    }
}

/// Classic RK4 step
///
/// # Arguments
/// * `x` - Current state
/// * `t` - Current time
/// * `dt` - Time step
/// * `f` - Derivative function f(t, x) -> dx/dt
///
/// Returns the error of the first stage that fails; later stages are
/// not evaluated.
pub fn try_rk4<const N: usize, E, F>(
    x: &SVector<f64, N>,
    t: f64,
    dt: f64,
    mut f: F,
) -> Result<SVector<f64, N>, E>
where
    F: FnMut(f64, &SVector<f64, N>) -> Result<SVector<f64, N>, E>,
{
    let k1 = f(t, x)?;
    let k2 = f(t + dt / 2.0, &(x + k1 * dt / 2.0))?;
    let k3 = f(t + dt / 2.0, &(x + k2 * dt / 2.0))?;
    let k4 = f(t + dt, &(x + k3 * dt))?;

    Ok(x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0))
}

/// Forward Euler step (first-order)
pub fn try_euler<const N: usize, E, F>(
    x: &SVector<f64, N>,
    t: f64,
    dt: f64,
    mut f: F,
) -> Result<SVector<f64, N>, E>
where
    F: FnMut(f64, &SVector<f64, N>) -> Result<SVector<f64, N>, E>,
{
    Ok(x + f(t, x)? * dt)
}
