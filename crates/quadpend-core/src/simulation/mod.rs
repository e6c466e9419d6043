//! Simulation
//!
//! - Configuration with TOML loading
//! - Time-stamped signal logs
//! - Two-clock simulation loop with a zero-order-hold controller

pub mod config;
pub mod log;
pub mod simulator;

pub use config::*;
pub use log::*;
pub use simulator::*;
