mod action_space;
mod box_pushing;

use thiserror::Error;

pub use action_space::ActionSpace;
pub use box_pushing::{BoxPushingEnv, BoxState, Move};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    #[error("environment is not ready, reset must be called before step")]
    NotReady,
    #[error("environment failure: {0}")]
    Failure(String),
}

/// Outcome of one environment step: next state, reward and the done flag.
pub type StepResult<S> = Result<(S, f64, bool), EnvError>;

pub trait Env<S, A> {
    fn reset(&mut self) -> S;
    fn step(&mut self, action: A) -> StepResult<S>;
    fn action_space(&self) -> ActionSpace<A>;
    fn render(&self) -> String;
}

/// Environments laid out on a 2D grid.
pub trait GridWorld<S> {
    fn world_height(&self) -> usize;
    fn world_width(&self) -> usize;
    /// Every state the environment can produce, used for eager table initialization.
    fn states(&self) -> Vec<S>;
}

/// Projection of a state onto the (row, col) cell shown in the value grid.
pub trait GridCell {
    fn cell(&self) -> (usize, usize);
}

impl GridCell for (usize, usize, usize, usize) {
    fn cell(&self) -> (usize, usize) {
        (self.0, self.1)
    }
}
