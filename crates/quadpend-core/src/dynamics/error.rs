//! Errors raised while building or evaluating the dynamics model

use thiserror::Error;

/// Dynamics errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DynamicsError {
    #[error("Invalid physical parameter {name} = {value}: {requirement}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        requirement: &'static str,
    },
    #[error("Command u[{index}] = {value} is outside [-{limit}, {limit}]")]
    InputRange { index: usize, value: f64, limit: f64 },
    #[error("Mass matrix solve failed at theta_link = {theta_link}: {reason}")]
    SingularMassMatrix { theta_link: f64, reason: String },
}
