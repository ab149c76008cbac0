pub mod command;
pub mod config;
pub mod core;
pub mod error;
pub mod sim;
pub mod stats;
pub mod workload;

pub use config::SimConfig;
pub use core::{JobId, SimEvent};
pub use error::{AdmissionError, ConfigError, ParseError, SimError};
pub use sim::{ProgramTemplate, Sim, SystemView};
