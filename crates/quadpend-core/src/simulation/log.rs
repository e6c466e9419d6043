//! Time-stamped signal recording

use crate::{Command, StateVector};

/// Time-ordered samples of one signal
#[derive(Debug, Clone, PartialEq)]
pub struct SignalLog<T> {
    times: Vec<f64>,
    values: Vec<T>,
}

impl<T> Default for SignalLog<T> {
    fn default() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T> SignalLog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Record a sample
    pub fn push(&mut self, time: f64, value: T) {
        self.times.push(time);
        self.values.push(value);
    }

    /// Sample times [s]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample values, aligned with [`SignalLog::times`]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Most recent sample
    pub fn last(&self) -> Option<(f64, &T)> {
        Some((*self.times.last()?, self.values.last()?))
    }

    /// Iterate over `(time, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> {
        self.times.iter().copied().zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time span covered by the log
    pub fn duration(&self) -> f64 {
        match (self.times.first(), self.times.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.times.clear();
        self.values.clear();
    }
}

/// Everything recorded during one run
#[derive(Debug, Clone, Default)]
pub struct SimulationLogs {
    /// Commands latched at each control tick
    pub commands: SignalLog<Command>,
    /// State at t = 0 and at the end of every control interval
    pub states: SignalLog<StateVector>,
    /// False when the run stopped before its final interval
    pub complete: bool,
}

impl SimulationLogs {
    pub fn clear(&mut self) {
        self.commands.clear();
        self.states.clear();
        self.complete = false;
    }
}
