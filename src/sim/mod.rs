//! Simulation of circuits: the event scheduler, its configuration and the [Workbench]
//! that owns the active circuit.
mod config;
mod monitor;
mod simulator;
mod workbench;

pub use config::*;
pub use monitor::SignalMonitor;
pub use simulator::Simulator;
pub use workbench::{SimEvent, Unsettled, Workbench};
