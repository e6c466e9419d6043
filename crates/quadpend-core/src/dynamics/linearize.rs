//! Closed-form linearization
//!
//! δẋ ≈ A·δx + B·δu about an operating point (u_f, x_f), with
//!
//! ```text
//! α = m1·l1/(m1+mb)          I = I1 + m1·mb·l1²/(m1+mb)
//! U = u_f[0] + u_f[1]        Δ = θ_link − θ_body
//! ```
//!
//! The accelerations in reduced form are
//!
//! ```text
//! ẍ  = −sinθb·U/(m1+mb) + α·sinθ1·θ̇1² + α²/I·cosθ1·sinΔ·U
//! ÿ  = −g + cosθb·U/(m1+mb) − α·cosθ1·θ̇1² + α²/I·sinθ1·sinΔ·U
//! θ̈b = lb·(u1 − u0)/Ib
//! θ̈1 = −α/I·sinΔ·U
//! ```
//!
//! and A, B are their partial derivatives. The Jacobians ignore input
//! saturation, so they describe the unclamped vector field.
//!
//! The result is provisional: check it with
//! [`LinearizedDynamics::max_jacobian_error`] before using it to design
//! a controller.

use crate::math::central_difference;
use crate::{Command, InputMatrix, StateMatrix, StateVector};

use super::{DynamicsError, QuadrotorPendulum, THETA_BODY, THETA_LINK, VELOCITY_OFFSET};

/// Linear model `ẋ ≈ drift + A·(x − x_f) + B·(u − u_f)`
#[derive(Debug, Clone)]
pub struct LinearizedDynamics {
    /// Command at the operating point
    pub operating_command: Command,
    /// State at the operating point
    pub operating_state: StateVector,
    /// State Jacobian ∂f/∂x (8×8)
    pub a: StateMatrix,
    /// Input Jacobian ∂f/∂u (8×2)
    pub b: InputMatrix,
    /// f(u_f, x_f), zero at an equilibrium
    pub drift: StateVector,
}

impl LinearizedDynamics {
    /// First-order prediction of `ẋ` at `(u_f + δu, x_f + δx)`
    pub fn predict(&self, dx: &StateVector, du: &Command) -> StateVector {
        self.drift + self.a * dx + self.b * du
    }

    /// Largest absolute difference between the closed-form Jacobians and
    /// central finite differences of the model with step `eps`
    pub fn max_jacobian_error(&self, model: &QuadrotorPendulum, eps: f64) -> Result<f64, DynamicsError> {
        let (fd_a, fd_b) = model.finite_difference_jacobian(&self.operating_command, &self.operating_state, eps)?;
        let err_a = (fd_a - self.a).abs().max();
        let err_b = (fd_b - self.b).abs().max();
        Ok(err_a.max(err_b))
    }

    /// Whether the operating point is an equilibrium within `tol`
    pub fn is_equilibrium(&self, tol: f64) -> bool {
        self.drift.abs().max() <= tol
    }
}

impl QuadrotorPendulum {
    /// Closed-form Jacobians `(A, B)` of the derivative at `(u_f, x_f)`
    pub fn linearize_matrices(&self, u_f: &Command, x_f: &StateVector) -> (StateMatrix, InputMatrix) {
        let p = self.params();
        let total = p.total_mass();
        let alpha = p.alpha();
        let inertia = p.reduced_inertia();
        let k = alpha * alpha / inertia;

        let theta_b = x_f[THETA_BODY];
        let theta_1 = x_f[THETA_LINK];
        let rate_1 = x_f[THETA_LINK + VELOCITY_OFFSET];
        let thrust = u_f[0] + u_f[1];

        let (sb, cb) = theta_b.sin_cos();
        let (s1, c1) = theta_1.sin_cos();
        let (sd, cd) = (theta_1 - theta_b).sin_cos();
        let (s21, c21) = (2.0 * theta_1 - theta_b).sin_cos();
        let vertical_gain = p.pivot_inertia() / total / inertia;

        let mut b = InputMatrix::zeros();
        let bx = -sb / total + k * c1 * sd;
        let by = vertical_gain * cb - k * c1 * cd;
        let b_link = -alpha / inertia * sd;
        b[(4, 0)] = bx;
        b[(4, 1)] = bx;
        b[(5, 0)] = by;
        b[(5, 1)] = by;
        b[(6, 0)] = -p.lb() / p.body_inertia();
        b[(6, 1)] = p.lb() / p.body_inertia();
        b[(7, 0)] = b_link;
        b[(7, 1)] = b_link;

        let mut a = StateMatrix::zeros();
        a.fixed_view_mut::<4, 4>(0, VELOCITY_OFFSET).fill_with_identity();

        a[(4, 2)] = (-cb / total - k * c1 * cd) * thrust;
        a[(5, 2)] = (-vertical_gain * sb - k * c1 * sd) * thrust;

        a[(4, 3)] = alpha * c1 * rate_1 * rate_1 + k * c21 * thrust;
        a[(5, 3)] = alpha * s1 * rate_1 * rate_1 + k * s21 * thrust;

        a[(4, 7)] = 2.0 * alpha * s1 * rate_1;
        a[(5, 7)] = -2.0 * alpha * c1 * rate_1;

        a[(7, 2)] = alpha / inertia * cd * thrust;
        a[(7, 3)] = -alpha / inertia * cd * thrust;

        (a, b)
    }

    /// Linearize about `(u_f, x_f)`
    ///
    /// The drift term is the nonlinear derivative at the operating point,
    /// evaluated without saturation so that it is consistent with `B`.
    pub fn linearize(&self, u_f: &Command, x_f: &StateVector) -> Result<LinearizedDynamics, DynamicsError> {
        let (a, b) = self.linearize_matrices(u_f, x_f);
        let drift = self.unsaturated_derivative(u_f, x_f)?;

        Ok(LinearizedDynamics {
            operating_command: *u_f,
            operating_state: *x_f,
            a,
            b,
            drift,
        })
    }

    /// Central-difference Jacobians of the unsaturated derivative
    pub fn finite_difference_jacobian(
        &self,
        u: &Command,
        x: &StateVector,
        eps: f64,
    ) -> Result<(StateMatrix, InputMatrix), DynamicsError> {
        central_difference(x, u, eps, |x, u| self.unsaturated_derivative(u, x))
    }
}
