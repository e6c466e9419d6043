//! Feedback policies
//!
//! A policy maps the measured state and the current time to a rotor
//! thrust command. Any `FnMut(&StateVector, f64) -> Command` closure is a
//! policy; the types below cover the common fixed laws.

use nalgebra::SMatrix;

use crate::{Command, StateVector, INPUT_DIM, STATE_DIM};

/// State feedback law `u = π(x, t)`
pub trait FeedbackPolicy {
    /// Command to hold until the next control tick
    fn command(&mut self, state: &StateVector, time: f64) -> Command;
}

impl<F> FeedbackPolicy for F
where
    F: FnMut(&StateVector, f64) -> Command,
{
    fn command(&mut self, state: &StateVector, time: f64) -> Command {
        self(state, time)
    }
}

/// Always commands zero thrust
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroPolicy;

impl FeedbackPolicy for ZeroPolicy {
    fn command(&mut self, _state: &StateVector, _time: f64) -> Command {
        Command::zeros()
    }
}

/// Open-loop constant command
#[derive(Debug, Clone, Copy)]
pub struct ConstantPolicy(pub Command);

impl FeedbackPolicy for ConstantPolicy {
    fn command(&mut self, _state: &StateVector, _time: f64) -> Command {
        self.0
    }
}

/// Gain matrix of a linear state-feedback law (2×8)
pub type FeedbackGain = SMatrix<f64, INPUT_DIM, STATE_DIM>;

/// Fixed-gain linear feedback `u = u_ref − K·(x − x_ref)`
///
/// The gain is supplied by the caller. A gain synthesized from
/// [`crate::dynamics::LinearizedDynamics`] is only as trustworthy as that
/// linearization; validate it first.
#[derive(Debug, Clone)]
pub struct LinearFeedbackPolicy {
    /// Reference state
    pub x_ref: StateVector,
    /// Feedforward command at the reference
    pub u_ref: Command,
    /// Feedback gain K
    pub gain: FeedbackGain,
}

impl LinearFeedbackPolicy {
    pub fn new(x_ref: StateVector, u_ref: Command, gain: FeedbackGain) -> Self {
        Self { x_ref, u_ref, gain }
    }
}

impl FeedbackPolicy for LinearFeedbackPolicy {
    fn command(&mut self, state: &StateVector, _time: f64) -> Command {
        self.u_ref - self.gain * (state - self.x_ref)
    }
}
