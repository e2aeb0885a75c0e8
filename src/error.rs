use thiserror::Error;

use crate::env::EnvError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("action {0} is not part of the action space")]
    InvalidAction(String),

    #[error("the action space is empty, there is nothing to select from")]
    EmptyActionSpace,

    #[error("invalid agent configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("failed to render plot: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
