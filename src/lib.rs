pub mod action_selection;
pub mod config;
pub mod env;
pub mod error;
pub mod plot;
pub mod q_table;
pub mod utils;

mod agent;

pub use agent::QLearningAgent;
pub use config::{AgentConfig, TerminalBootstrap};
pub use error::{AgentError, Result};
pub use q_table::QTable;
