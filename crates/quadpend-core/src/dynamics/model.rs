//! Continuous-time model
//!
//! ẋ = f(x, u) = [q̇; M(q)⁻¹·(τ_G(q) + B(q)·sat(u) − C(q, q̇)·q̇)]
//!
//! The inverse is never formed: q̈ comes from a Cholesky solve of the
//! mass matrix. The model output is the state itself, so it has no
//! direct feedthrough from the command.

use crate::{Command, Coordinates, StateVector, INPUT_DIM};

use super::{join_state, split_state, DynamicsError, ManipulatorMatrices, PhysicalParameters};

/// Planar quadrotor with a pendulum link
#[derive(Debug, Clone)]
pub struct QuadrotorPendulum {
    params: PhysicalParameters,
}

impl QuadrotorPendulum {
    pub fn new(params: PhysicalParameters) -> Self {
        Self { params }
    }

    /// Physical parameters of this model
    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    /// Manipulator-equation terms (M, C, τ_G, B) at `(q, q̇)`
    pub fn manipulator_dynamics(&self, q: &Coordinates, qd: &Coordinates) -> ManipulatorMatrices {
        ManipulatorMatrices::evaluate(&self.params, q, qd)
    }

    /// Saturate or validate a command against `[-input_max, input_max]`
    ///
    /// In strict mode the first out-of-range component is reported as
    /// [`DynamicsError::InputRange`]. Otherwise every component is
    /// clamped. A NaN component cannot be clamped and is always rejected.
    pub fn condition_command(&self, u: &Command, strict: bool) -> Result<Command, DynamicsError> {
        let limit = self.params.input_max();
        let mut conditioned = *u;

        for index in 0..INPUT_DIM {
            let value = u[index];
            if value.is_nan() || (strict && value.abs() > limit) {
                return Err(DynamicsError::InputRange { index, value, limit });
            }
            conditioned[index] = value.clamp(-limit, limit);
        }

        Ok(conditioned)
    }

    /// State derivative `ẋ = [q̇; q̈]`
    ///
    /// The caller's command is never modified; saturation is applied to
    /// a copy.
    ///
    /// # Arguments
    /// * `u` - Rotor thrust command
    /// * `x` - Current state
    /// * `strict` - Reject out-of-range commands instead of clamping them
    pub fn derivative(
        &self,
        u: &Command,
        x: &StateVector,
        strict: bool,
    ) -> Result<StateVector, DynamicsError> {
        let u = self.condition_command(u, strict)?;
        self.unsaturated_derivative(&u, x)
    }

    /// State derivative with the command applied as given
    pub(crate) fn unsaturated_derivative(
        &self,
        u: &Command,
        x: &StateVector,
    ) -> Result<StateVector, DynamicsError> {
        let (q, qd) = split_state(x);
        let terms = self.manipulator_dynamics(&q, &qd);
        let qdd = terms.solve_accelerations(&terms.generalized_force(u, &qd))?;

        Ok(join_state(&qd, &qdd))
    }

    /// Output map: the full state is visible downstream
    ///
    /// Depends only on `x`, never on the current command.
    pub fn output(&self, x: &StateVector) -> StateVector {
        *x
    }
}

impl Default for QuadrotorPendulum {
    fn default() -> Self {
        Self::new(PhysicalParameters::default())
    }
}
