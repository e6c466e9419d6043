//! Discrete-time control
//!
//! - Feedback policies (closures, zero, constant, fixed-gain linear feedback)
//! - Zero-order-hold controller clocked at the control period

pub mod policy;
pub mod controller;

pub use policy::*;
pub use controller::*;
