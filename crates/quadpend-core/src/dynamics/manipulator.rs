//! Manipulator-equation matrices
//!
//! M(q)·q̈ + C(q, q̇)·q̇ = τ_G(q) + B(q)·u
//!
//! where:
//! - M: mass matrix (symmetric positive-definite, depends on θ_link)
//! - C: Coriolis matrix (depends on θ_link, θ̇_link)
//! - τ_G: gravity generalized force (depends on θ_link)
//! - B: input map from rotor thrusts (depends on θ_body)

use nalgebra::Vector4;

use crate::{Command, Coordinates, InputMap, Mat4};

use super::{DynamicsError, PhysicalParameters, THETA_BODY, THETA_LINK};

/// Reciprocal condition estimate of the unit-diagonal mass matrix below
/// which it is treated as numerically singular
const MIN_RECIPROCAL_CONDITION: f64 = 1e-12;

/// The four terms of the manipulator equation at one `(q, q̇)`
#[derive(Debug, Clone, PartialEq)]
pub struct ManipulatorMatrices {
    /// Mass matrix M
    pub mass: Mat4,
    /// Coriolis matrix C
    pub coriolis: Mat4,
    /// Gravity generalized force τ_G
    pub gravity: Coordinates,
    /// Input map B
    pub input: InputMap,
    /// Link angle the terms were evaluated at
    pub theta_link: f64,
}

impl ManipulatorMatrices {
    /// Build all four terms from the physical parameters
    pub fn evaluate(params: &PhysicalParameters, q: &Coordinates, qd: &Coordinates) -> Self {
        let total = params.total_mass();
        let coupling = params.m1() * params.l1();
        let (s1, c1) = q[THETA_LINK].sin_cos();
        let (sb, cb) = q[THETA_BODY].sin_cos();
        let link_rate = qd[THETA_LINK];

        #[rustfmt::skip]
        let mass = Mat4::new(
            total,         0.0,           0.0,                   coupling * c1,
            0.0,           total,         0.0,                   coupling * s1,
            0.0,           0.0,           params.body_inertia(), 0.0,
            coupling * c1, coupling * s1, 0.0,                   params.pivot_inertia(),
        );

        let mut coriolis = Mat4::zeros();
        coriolis[(0, 3)] = -coupling * s1 * link_rate;
        coriolis[(1, 3)] = coupling * c1 * link_rate;

        let gravity = Vector4::new(
            0.0,
            -total * params.g(),
            0.0,
            -coupling * params.g() * s1,
        );

        #[rustfmt::skip]
        let input = InputMap::new(
            -sb,          -sb,
            cb,           cb,
            -params.lb(), params.lb(),
            0.0,          0.0,
        );

        Self {
            mass,
            coriolis,
            gravity,
            input,
            theta_link: q[THETA_LINK],
        }
    }

    /// Right-hand side `τ_G + B·u − C·q̇`
    pub fn generalized_force(&self, u: &Command, qd: &Coordinates) -> Coordinates {
        self.gravity + self.input * u - self.coriolis * qd
    }

    /// Solve `M·q̈ = rhs` through a Cholesky factorization
    ///
    /// `M` is first scaled to unit diagonal, `S = D·M·D` with
    /// `D = diag(M)^(-1/2)`, so the conditioning check only sees the
    /// coupling between coordinates and not their units. Fails if `M` is
    /// not positive-definite, the reciprocal condition estimate of `S`
    /// falls below `1e-12`, or the solution is not finite.
    pub fn solve_accelerations(&self, rhs: &Coordinates) -> Result<Coordinates, DynamicsError> {
        let singular = |reason: String| DynamicsError::SingularMassMatrix {
            theta_link: self.theta_link,
            reason,
        };

        let scale = self.mass.diagonal().map(|d| 1.0 / d.sqrt());
        if !scale.iter().all(|s| s.is_finite()) {
            return Err(singular("mass matrix has a non-positive diagonal".to_string()));
        }
        let scaled = Mat4::from_fn(|i, j| self.mass[(i, j)] * scale[i] * scale[j]);

        let chol = scaled
            .cholesky()
            .ok_or_else(|| singular("mass matrix is not positive-definite".to_string()))?;

        // cond(S) ≈ (max Lᵢᵢ / min Lᵢᵢ)²
        let diag = chol.l_dirty().diagonal();
        let ratio = diag.min() / diag.max();
        let rcond = ratio * ratio;
        if rcond.is_nan() || rcond < MIN_RECIPROCAL_CONDITION {
            return Err(singular(format!(
                "ill-conditioned mass matrix (reciprocal condition {rcond:e})"
            )));
        }

        // M⁻¹ = D·S⁻¹·D
        let qdd = chol.solve(&rhs.component_mul(&scale)).component_mul(&scale);
        if qdd.iter().all(|v| v.is_finite()) {
            Ok(qdd)
        } else {
            Err(singular("non-finite generalized accelerations".to_string()))
        }
    }
}
