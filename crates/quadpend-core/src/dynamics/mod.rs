//! Dynamics of the planar quadrotor-pendulum
//!
//! - Physical parameters and derived inertias
//! - Manipulator-equation matrices M, C, τ_G, B
//! - Continuous-time state derivative with input saturation
//! - Closed-form linearization about an operating point

pub mod error;
pub mod params;
pub mod state;
pub mod manipulator;
pub mod model;
pub mod linearize;

pub use error::*;
pub use params::*;
pub use state::*;
pub use manipulator::*;
pub use model::*;
pub use linearize::*;
