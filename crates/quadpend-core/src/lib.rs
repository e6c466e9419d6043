//! # quadpend core
//!
//! Planar quadrotor with a pivot-mounted pendulum link.
//!
//! This library implements the manipulator-equation model of the system,
//! its closed-form linearization about an operating point, and a
//! sampled-data simulation in which a zero-order-hold controller is
//! clocked periodically while the continuous state is integrated with a
//! fixed explicit step.
//!
//! ## Modules
//!
//! - [`math`]: Fixed-step integrators and finite-difference Jacobians
//! - [`dynamics`]: Physical parameters, manipulator matrices, state derivative, linearization
//! - [`control`]: Feedback policies and the zero-order-hold controller
//! - [`simulation`]: Configuration, signal logs and the simulation loop
//!
//! ## Model
//!
//! ```text
//! M(q)·q̈ + C(q, q̇)·q̇ = τ_G(q) + B(q)·u
//!
//! q = [x_body, y_body, θ_body, θ_link]
//! x = [q; q̇] ∈ ℝ⁸,  u = [u₀, u₁] ∈ ℝ² (rotor thrusts)
//! ```

pub mod math;
pub mod dynamics;
pub mod control;
pub mod simulation;

use nalgebra::{Matrix4, Matrix4x2, SMatrix, SVector, Vector2, Vector4};

/// Number of generalized coordinates
pub const NUM_COORDINATES: usize = 4;

/// Dimension of the full state `[q; q̇]`
pub const STATE_DIM: usize = 8;

/// Number of thrust inputs
pub const INPUT_DIM: usize = 2;

/// Full state vector `[q; q̇]`
pub type StateVector = SVector<f64, STATE_DIM>;

/// Generalized coordinates or their rates
pub type Coordinates = Vector4<f64>;

/// Rotor thrust command
pub type Command = Vector2<f64>;

/// 4×4 matrix in generalized coordinates (mass, Coriolis)
pub type Mat4 = Matrix4<f64>;

/// 4×2 input map
pub type InputMap = Matrix4x2<f64>;

/// State Jacobian of the derivative (8×8)
pub type StateMatrix = SMatrix<f64, STATE_DIM, STATE_DIM>;

/// Input Jacobian of the derivative (8×2)
pub type InputMatrix = SMatrix<f64, STATE_DIM, INPUT_DIM>;

pub use control::{Controller, FeedbackPolicy};
pub use dynamics::{DynamicsError, PhysicalParameters, QuadrotorPendulum};
pub use simulation::{run_simulation, SimConfig, SimulationError, Simulator};
