//! Simulation configuration
//!
//! Defines configuration structures for setting up simulations. Every
//! section has defaults, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! integrator = "rk4"
//!
//! [physics]
//! m1 = 1.5
//!
//! [timing]
//! duration = 5.0
//! control_period = 0.02
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dynamics::{DynamicsError, PhysicalParameters};
use crate::math::IntegrationScheme;
use crate::{StateVector, STATE_DIM};

/// Relative slack when matching the integration step to the control period
const TIMING_TOLERANCE: f64 = 1e-9;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid timing {name} = {value}: {reason}")]
    InvalidTiming {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("Invalid physics: {0}")]
    Physics(#[from] DynamicsError),
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Physical parameters
    pub physics: PhysicsConfig,
    /// Clocks and run length
    pub timing: TimingConfig,
    /// Explicit integration scheme
    pub integrator: IntegrationScheme,
    /// Reject out-of-range commands instead of clamping them
    pub strict_inputs: bool,
    /// Initial state `[x, y, θ_body, θ_link, ẋ, ẏ, θ̇_body, θ̇_link]`
    pub initial_state: [f64; STATE_DIM],
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            timing: TimingConfig::default(),
            integrator: IntegrationScheme::default(),
            strict_inputs: false,
            initial_state: [0.0; STATE_DIM],
        }
    }
}

impl SimConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check physics and timing
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.to_params()?;
        self.timing.schedule()?;
        Ok(())
    }

    /// Initial state as a vector
    pub fn initial_state_vector(&self) -> StateVector {
        StateVector::from_column_slice(&self.initial_state)
    }

    /// Set the initial state
    pub fn with_initial_state(mut self, x0: &StateVector) -> Self {
        self.initial_state.copy_from_slice(x0.as_slice());
        self
    }
}

/// Physical parameters configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Body mass [kg]
    pub mb: f64,
    /// Body half-length [m]
    pub lb: f64,
    /// Pendulum mass [kg]
    pub m1: f64,
    /// Pendulum length [m]
    pub l1: f64,
    /// Gravity magnitude [m/s²]
    pub g: f64,
    /// Per-rotor thrust saturation [N]
    pub input_max: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            mb: 1.0,
            lb: 0.2,
            m1: 2.0,
            l1: 0.2,
            g: 10.0,
            input_max: 10.0,
        }
    }
}

impl PhysicsConfig {
    pub fn to_params(&self) -> Result<PhysicalParameters, DynamicsError> {
        PhysicalParameters::new(self.mb, self.lb, self.m1, self.l1, self.g, self.input_max)
    }
}

impl From<&PhysicalParameters> for PhysicsConfig {
    fn from(params: &PhysicalParameters) -> Self {
        Self {
            mb: params.mb(),
            lb: params.lb(),
            m1: params.m1(),
            l1: params.l1(),
            g: params.g(),
            input_max: params.input_max(),
        }
    }
}

/// Timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Total simulated time [s]
    pub duration: f64,
    /// Controller tick period [s]
    pub control_period: f64,
    /// Telemetry period [s]; `None` disables telemetry
    pub print_period: Option<f64>,
    /// Integration step [s]; `None` means one step per control period
    pub integration_step: Option<f64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            duration: 30.0,
            control_period: 0.0333,
            print_period: Some(1.0),
            integration_step: None,
        }
    }
}

impl TimingConfig {
    /// Integration step actually used [s]
    pub fn step_size(&self) -> f64 {
        self.integration_step.unwrap_or(self.control_period)
    }

    /// Number of integration steps per control period
    ///
    /// The integration step must divide the control period into a whole
    /// number of sub-steps so that both clocks stay aligned.
    pub fn substeps(&self) -> Result<usize, ConfigError> {
        require_positive("control_period", self.control_period)?;
        let step = self.step_size();
        require_positive("integration_step", step)?;

        if step > self.control_period * (1.0 + TIMING_TOLERANCE) {
            return Err(ConfigError::InvalidTiming {
                name: "integration_step",
                value: step,
                reason: "must not exceed the control period",
            });
        }

        let ratio = self.control_period / step;
        let substeps = ratio.round();
        if (ratio - substeps).abs() > TIMING_TOLERANCE * ratio {
            return Err(ConfigError::InvalidTiming {
                name: "integration_step",
                value: step,
                reason: "must divide the control period evenly",
            });
        }

        Ok(substeps as usize)
    }

    /// Number of whole control intervals that fit in the duration
    pub fn num_control_steps(&self) -> Result<u64, ConfigError> {
        require_positive("control_period", self.control_period)?;
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(ConfigError::InvalidTiming {
                name: "duration",
                value: self.duration,
                reason: "must be non-negative and finite",
            });
        }
        if let Some(period) = self.print_period {
            require_positive("print_period", period)?;
        }

        Ok((self.duration / self.control_period + TIMING_TOLERANCE).floor() as u64)
    }

    /// Validate the timing and lay out the control intervals
    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        let substeps = self.substeps()?;
        let whole_intervals = self.num_control_steps()?;

        let remainder = self.duration - whole_intervals as f64 * self.control_period;
        let final_interval = (remainder > TIMING_TOLERANCE * self.control_period).then_some(remainder);

        Ok(Schedule {
            control_period: self.control_period,
            step_size: self.step_size(),
            substeps,
            whole_intervals,
            final_interval,
        })
    }
}

/// Control intervals of one run
///
/// `whole_intervals` full control periods, followed by a shortened final
/// interval when the duration is not a multiple of the control period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    /// Control period [s]
    pub control_period: f64,
    /// Integration step within a full interval [s]
    pub step_size: f64,
    /// Integration steps per full interval
    pub substeps: usize,
    /// Number of full control intervals
    pub whole_intervals: u64,
    /// Length of the final shortened interval [s]
    pub final_interval: Option<f64>,
}

impl Schedule {
    /// Total number of control intervals, including a shortened one
    pub fn num_intervals(&self) -> u64 {
        self.whole_intervals + u64::from(self.final_interval.is_some())
    }

    /// Start time of interval `index` [s]
    pub fn interval_start(&self, index: u64) -> f64 {
        index as f64 * self.control_period
    }

    /// Length and integration step count of interval `index`
    ///
    /// The shortened interval is split into the fewest equal steps no
    /// longer than the configured integration step.
    pub fn interval(&self, index: u64) -> (f64, usize) {
        match self.final_interval {
            Some(length) if index >= self.whole_intervals => {
                let steps = (length / self.step_size - TIMING_TOLERANCE).ceil().max(1.0);
                (length, steps as usize)
            }
            _ => (self.control_period, self.substeps),
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidTiming {
            name,
            value,
            reason: "must be positive and finite",
        })
    }
}
