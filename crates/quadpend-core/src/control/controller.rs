//! Zero-order-hold controller
//!
//! Clocked at a fixed control period. On every tick the feedback policy
//! is evaluated once on the current state and the result is latched into
//! the command register; between ticks the register is returned
//! unchanged.
//!
//! ```text
//! Uninitialized --tick--> Holding --tick--> Holding ...
//! ```

use thiserror::Error;
use tracing::{debug, info};

use crate::{Command, StateVector};

use super::FeedbackPolicy;

/// Relative slack allowed when checking the tick schedule
const SCHEDULE_TOLERANCE: f64 = 1e-9;

/// Controller errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error("Invalid {name} = {value}: must be positive and finite")]
    InvalidPeriod { name: &'static str, value: f64 },
    #[error("Tick at t = {time} arrives before the next control boundary at t = {next_due}")]
    EarlyTick { time: f64, next_due: f64 },
}

/// Command register state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    /// No tick has happened yet; the output is zero
    Uninitialized,
    /// Holding the command of the most recent tick
    Holding,
}

/// Discrete controller with a zero-order-hold output
pub struct Controller<P> {
    /// Feedback policy evaluated on each tick
    policy: P,
    /// Control period [s]
    control_period: f64,
    /// Telemetry period [s], `None` disables reporting
    print_period: Option<f64>,
    /// Held command
    register: Option<Command>,
    /// Time of the most recent tick
    last_tick_time: Option<f64>,
    /// Time of the most recent telemetry report
    last_report_time: f64,
    /// Number of ticks since construction or reset
    tick_count: u64,
}

impl<P: FeedbackPolicy> Controller<P> {
    /// Create a controller
    ///
    /// # Arguments
    /// * `policy` - Feedback law evaluated on each tick
    /// * `control_period` - Time between ticks [s]
    /// * `print_period` - Time between telemetry reports [s], `None` to disable
    pub fn new(policy: P, control_period: f64, print_period: Option<f64>) -> Result<Self, ControllerError> {
        check_period("control_period", control_period)?;
        if let Some(period) = print_period {
            check_period("print_period", period)?;
        }

        Ok(Self {
            policy,
            control_period,
            print_period,
            register: None,
            last_tick_time: None,
            last_report_time: -print_period.unwrap_or(0.0),
            tick_count: 0,
        })
    }

    /// Evaluate the policy and latch its command
    ///
    /// Must be called once per control boundary. A tick that arrives
    /// before the next boundary is rejected and leaves the register
    /// untouched.
    pub fn tick(&mut self, state: &StateVector, time: f64) -> Result<Command, ControllerError> {
        if let Some(next_due) = self.next_tick_time() {
            if time < next_due - SCHEDULE_TOLERANCE * self.control_period.max(1.0) {
                return Err(ControllerError::EarlyTick { time, next_due });
            }
        }

        let command = self.policy.command(state, time);
        self.register = Some(command);
        self.last_tick_time = Some(time);
        self.tick_count += 1;

        debug!(time, u0 = command[0], u1 = command[1], tick = self.tick_count, "controller tick");
        self.report(state, time, &command);

        Ok(command)
    }

    /// Held command; zero before the first tick
    pub fn output(&self) -> Command {
        self.register.unwrap_or_else(Command::zeros)
    }

    /// Held command, `None` before the first tick
    pub fn held(&self) -> Option<Command> {
        self.register
    }

    /// Register state
    pub fn hold_state(&self) -> HoldState {
        if self.register.is_some() {
            HoldState::Holding
        } else {
            HoldState::Uninitialized
        }
    }

    /// Control period [s]
    pub fn control_period(&self) -> f64 {
        self.control_period
    }

    /// Telemetry period [s]
    pub fn print_period(&self) -> Option<f64> {
        self.print_period
    }

    /// Number of ticks so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Time of the most recent tick
    pub fn last_tick_time(&self) -> Option<f64> {
        self.last_tick_time
    }

    /// Earliest time at which the next tick is accepted
    pub fn next_tick_time(&self) -> Option<f64> {
        self.last_tick_time.map(|t| t + self.control_period)
    }

    /// Access the feedback policy
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Return to the uninitialized state
    pub fn reset(&mut self) {
        self.register = None;
        self.last_tick_time = None;
        self.last_report_time = -self.print_period.unwrap_or(0.0);
        self.tick_count = 0;
    }

    fn report(&mut self, state: &StateVector, time: f64, command: &Command) {
        let Some(period) = self.print_period else {
            return;
        };
        if time - self.last_report_time >= period {
            self.last_report_time = time;
            info!(
                time,
                x_body = state[0],
                y_body = state[1],
                theta_body = state[2],
                theta_link = state[3],
                u0 = command[0],
                u1 = command[1],
                "controller telemetry"
            );
        }
    }
}

impl<P> std::fmt::Debug for Controller<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("control_period", &self.control_period)
            .field("print_period", &self.print_period)
            .field("register", &self.register)
            .field("last_tick_time", &self.last_tick_time)
            .field("tick_count", &self.tick_count)
            .finish_non_exhaustive()
    }
}

fn check_period(name: &'static str, value: f64) -> Result<(), ControllerError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ControllerError::InvalidPeriod { name, value })
    }
}
