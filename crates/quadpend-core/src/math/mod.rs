//! Numerical utilities
//!
//! Fixed-step explicit integrators and finite-difference Jacobians.

pub mod integrator;
pub mod jacobian;

pub use integrator::*;
pub use jacobian::*;
