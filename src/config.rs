//! Hyper-parameters of the Q-learning agent.

use crate::action_selection::EnumEpsilonSchedule;
use crate::error::{AgentError, Result};

/// What the backup does with the next state's value on a terminal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalBootstrap {
    /// Always add `γ · max Q(s', ·)`, terminal or not.
    #[default]
    Bootstrap,
    /// Drop the bootstrap term when the environment reports `done`.
    Zero,
}

/// Configuration for creating a [`QLearningAgent`](crate::QLearningAgent).
///
/// ```
/// use box_pushing_qlearning::{AgentConfig, TerminalBootstrap};
///
/// let config = AgentConfig::default()
///     .with_learning_rate(0.5)
///     .with_seed(42)
///     .with_terminal_bootstrap(TerminalBootstrap::Zero);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// α, in [0, 1]
    pub learning_rate: f64,
    /// γ, in [0, 1]
    pub discount_factor: f64,
    /// Initial exploration rate, in [0, 1]
    pub epsilon: f64,
    pub epsilon_schedule: EnumEpsilonSchedule,
    pub terminal_bootstrap: TerminalBootstrap,
    /// Random seed for reproducibility, `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Draw a progress bar while training
    pub show_progress: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.99,
            epsilon: 0.1,
            epsilon_schedule: EnumEpsilonSchedule::default(),
            terminal_bootstrap: TerminalBootstrap::default(),
            seed: None,
            show_progress: false,
        }
    }
}

impl AgentConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_epsilon_schedule(mut self, schedule: impl Into<EnumEpsilonSchedule>) -> Self {
        self.epsilon_schedule = schedule.into();
        self
    }

    pub fn with_terminal_bootstrap(mut self, terminal_bootstrap: TerminalBootstrap) -> Self {
        self.terminal_bootstrap = terminal_bootstrap;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_range("learning_rate", self.learning_rate)?;
        check_unit_range("discount_factor", self.discount_factor)?;
        check_unit_range("epsilon", self.epsilon)?;
        Ok(())
    }
}

fn check_unit_range(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AgentError::InvalidConfig(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )))
    }
}
