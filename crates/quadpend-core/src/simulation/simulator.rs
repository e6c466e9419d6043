//! Main simulation runner
//!
//! Two clocks drive the run. The discrete control clock ticks the
//! controller at every multiple of the control period; the continuous
//! clock advances the state with one or more fixed integration steps per
//! control interval while the held command stays constant.
//!
//! ```text
//! t_k = k·T
//!   u_k     = controller.tick(x(t_k), t_k)
//!   x(t_k+1) = integrate(f(u_k, ·), x(t_k), T)
//! ```
//!
//! When the duration is not a multiple of `T`, the run ends with one
//! shortened interval so that the last state sample lands exactly on the
//! duration.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::control::{Controller, ControllerError, FeedbackPolicy};
use crate::dynamics::{DynamicsError, PhysicalParameters, QuadrotorPendulum};
use crate::math::IntegrationScheme;
use crate::{Command, StateVector};

use super::{ConfigError, PhysicsConfig, Schedule, SignalLog, SimConfig, SimulationLogs, TimingConfig};

/// Snapshot of a run that stopped on a dynamics error
#[derive(Debug, Clone)]
pub struct AbortedRun {
    /// Time of the failed integration step [s]
    pub time: f64,
    /// Last committed state before the failure
    pub state: StateVector,
    /// Dynamics error that stopped the run
    pub source: DynamicsError,
    /// Samples recorded up to the failure, marked incomplete
    pub logs: SimulationLogs,
}

impl fmt::Display for AbortedRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "simulation aborted at t = {:.6} after {} state samples: {}",
            self.time,
            self.logs.states.len(),
            self.source
        )
    }
}

/// Simulation errors
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),
    #[error("{0}")]
    Aborted(Box<AbortedRun>),
    #[error("Simulation halted by an abort at t = {time}; reset before stepping again")]
    Halted { time: f64 },
}

impl SimulationError {
    /// Partial logs of an aborted run
    pub fn partial_logs(&self) -> Option<&SimulationLogs> {
        match self {
            SimulationError::Aborted(run) => Some(&run.logs),
            _ => None,
        }
    }
}

/// Main simulator
pub struct Simulator<P> {
    /// Configuration
    config: SimConfig,
    /// Continuous-time model
    model: QuadrotorPendulum,
    /// Zero-order-hold controller
    controller: Controller<P>,
    /// Current state
    state: StateVector,
    /// Completed control intervals
    step_index: u64,
    /// Control interval layout
    schedule: Schedule,
    /// Time of the abort that stopped the run, if any
    aborted_at: Option<f64>,
    /// Recorded signals
    logs: SimulationLogs,
}

impl<P: FeedbackPolicy> Simulator<P> {
    /// Create a simulator from a configuration and a feedback policy
    pub fn new(config: SimConfig, policy: P) -> Result<Self, SimulationError> {
        let params = config.physics.to_params().map_err(ConfigError::from)?;
        let schedule = config.timing.schedule()?;
        let num_steps = schedule.num_intervals() as usize;
        let controller = Controller::new(policy, config.timing.control_period, config.timing.print_period)?;
        let state = config.initial_state_vector();

        let mut logs = SimulationLogs {
            commands: SignalLog::with_capacity(num_steps),
            states: SignalLog::with_capacity(num_steps + 1),
            complete: false,
        };
        logs.states.push(0.0, state);

        Ok(Self {
            config,
            model: QuadrotorPendulum::new(params),
            controller,
            state,
            step_index: 0,
            schedule,
            aborted_at: None,
            logs,
        })
    }

    /// Advance by one control interval
    ///
    /// The controller ticks on the current state, then the state is
    /// integrated over the interval with the held command. The new state
    /// is committed only when every integration step succeeds.
    ///
    /// Does nothing once the duration has been reached. After an abort
    /// every call fails with [`SimulationError::Halted`] until
    /// [`Simulator::reset`].
    pub fn step(&mut self) -> Result<&StateVector, SimulationError> {
        if let Some(time) = self.aborted_at {
            return Err(SimulationError::Halted { time });
        }
        if self.is_finished() {
            return Ok(&self.state);
        }

        let t = self.time();
        let measured = self.model.output(&self.state);
        self.controller.tick(&measured, t)?;
        let command = self.controller.output();
        self.logs.commands.push(t, command);

        let (length, substeps) = self.schedule.interval(self.step_index);
        let h = length / substeps as f64;
        let strict = self.config.strict_inputs;
        let mut x = self.state;

        for sub in 0..substeps {
            let ts = t + sub as f64 * h;
            let model = &self.model;
            let result = self
                .config
                .integrator
                .step(&x, ts, h, |_t, x| model.derivative(&command, x, strict));

            match result {
                Ok(next) => x = next,
                Err(source) => return Err(self.abort(ts, source)),
            }
        }

        self.step_index += 1;
        self.state = x;
        let t_next = self.time();
        self.logs.states.push(t_next, x);

        debug!(
            time = t_next,
            y_body = x[1],
            theta_link = x[3],
            u0 = command[0],
            u1 = command[1],
            "simulation step"
        );

        Ok(&self.state)
    }

    /// Run until the configured duration is reached
    pub fn run(&mut self) -> Result<&SimulationLogs, SimulationError> {
        info!(
            intervals = self.schedule.num_intervals(),
            control_period = self.schedule.control_period,
            substeps = self.schedule.substeps,
            integrator = ?self.config.integrator,
            "simulation started"
        );

        while !self.is_finished() {
            self.step()?;
        }
        self.logs.complete = true;

        info!(time = self.time(), samples = self.logs.states.len(), "simulation finished");
        Ok(&self.logs)
    }

    /// Reset to the initial state
    pub fn reset(&mut self) {
        self.state = self.config.initial_state_vector();
        self.step_index = 0;
        self.aborted_at = None;
        self.controller.reset();
        self.logs.clear();
        self.logs.states.push(0.0, self.state);
    }

    fn abort(&mut self, time: f64, source: DynamicsError) -> SimulationError {
        self.logs.complete = false;
        self.aborted_at = Some(time);
        warn!(time, error = %source, samples = self.logs.states.len(), "simulation aborted");

        SimulationError::Aborted(Box::new(AbortedRun {
            time,
            state: self.state,
            source,
            logs: self.logs.clone(),
        }))
    }

    /// Current simulation time [s]
    ///
    /// Computed from the interval count so that it does not accumulate
    /// rounding error over long runs. Equals the duration exactly after a
    /// shortened final interval.
    pub fn time(&self) -> f64 {
        if self.step_index > self.schedule.whole_intervals {
            self.config.timing.duration
        } else {
            self.schedule.interval_start(self.step_index)
        }
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }

    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Control intervals in a full run
    pub fn num_steps(&self) -> u64 {
        self.schedule.num_intervals()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn is_finished(&self) -> bool {
        self.step_index >= self.schedule.num_intervals()
    }

    /// Whether a dynamics error stopped the run
    pub fn is_aborted(&self) -> bool {
        self.aborted_at.is_some()
    }

    pub fn logs(&self) -> &SimulationLogs {
        &self.logs
    }

    pub fn into_logs(self) -> SimulationLogs {
        self.logs
    }

    pub fn model(&self) -> &QuadrotorPendulum {
        &self.model
    }

    pub fn controller(&self) -> &Controller<P> {
        &self.controller
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

impl<P> fmt::Debug for Simulator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("step_index", &self.step_index)
            .field("schedule", &self.schedule)
            .field("aborted_at", &self.aborted_at)
            .finish_non_exhaustive()
    }
}

/// Run a complete simulation and return `(command_log, state_log)`
///
/// Commands are clamped to the saturation limit and the state is
/// integrated with RK4. `integration_step = None` uses one step per
/// control period.
pub fn run_simulation<P: FeedbackPolicy>(
    params: &PhysicalParameters,
    policy: P,
    x0: &StateVector,
    duration: f64,
    control_period: f64,
    print_period: Option<f64>,
    integration_step: Option<f64>,
) -> Result<(SignalLog<Command>, SignalLog<StateVector>), SimulationError> {
    let config = SimConfig {
        physics: PhysicsConfig::from(params),
        timing: TimingConfig {
            duration,
            control_period,
            print_period,
            integration_step,
        },
        integrator: IntegrationScheme::Rk4,
        strict_inputs: false,
        ..SimConfig::default()
    }
    .with_initial_state(x0);

    let mut simulator = Simulator::new(config, policy)?;
    simulator.run()?;
    let logs = simulator.into_logs();
    Ok((logs.commands, logs.states))
}
