use indexmap::IndexMap;
use kdam::{tqdm, BarExt};
use ndarray::Array2;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, info};

use crate::action_selection::EpsilonGreedy;
use crate::config::{AgentConfig, TerminalBootstrap};
use crate::env::{ActionSpace, Env, GridCell, GridWorld};
use crate::error::{AgentError, Result};
use crate::q_table::QTable;
use crate::utils::{argmax, max};

/// Tabular one-step Q-learning with epsilon-greedy exploration.
pub struct QLearningAgent<S: Hash + Eq + Clone + Debug, A> {
    q_table: QTable<S, A>,
    action_selection: EpsilonGreedy,
    learning_rate: f64,
    discount_factor: f64,
    terminal_bootstrap: TerminalBootstrap,
    show_progress: bool,
    reward_history: Vec<f64>,
    episode_lengths: Vec<u64>,
    training_error: Vec<f64>,
}

impl<S: Hash + Eq + Clone + Debug, A: Copy + PartialEq + Debug> QLearningAgent<S, A> {
    /// Agent with an empty table, rows appear as states are visited.
    pub fn new(config: AgentConfig, action_space: ActionSpace<A>) -> Result<Self> {
        Self::from_table(config, QTable::new(action_space))
    }

    /// Agent whose table already holds a zero row for every state of `world`.
    pub fn with_eager_states<W: GridWorld<S> + ?Sized>(
        config: AgentConfig,
        action_space: ActionSpace<A>,
        world: &W,
    ) -> Result<Self> {
        let states = world.states();
        debug!(states = states.len(), "pre-populating Q table");
        Self::from_table(config, QTable::with_states(action_space, states))
    }

    pub fn from_table(config: AgentConfig, q_table: QTable<S, A>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table,
            action_selection: EpsilonGreedy::new(
                config.epsilon,
                config.epsilon_schedule,
                config.seed,
            ),
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            terminal_bootstrap: config.terminal_bootstrap,
            show_progress: config.show_progress,
            reward_history: vec![],
            episode_lengths: vec![],
            training_error: vec![],
        })
    }

    pub fn q_table(&self) -> &QTable<S, A> {
        &self.q_table
    }

    pub fn q_table_mut(&mut self) -> &mut QTable<S, A> {
        &mut self.q_table
    }

    pub fn action_space(&self) -> &ActionSpace<A> {
        self.q_table.action_space()
    }

    pub fn epsilon(&self) -> f64 {
        self.action_selection.epsilon()
    }

    /// Total reward of every episode finished so far, across `learn` calls.
    pub fn reward_history(&self) -> &[f64] {
        &self.reward_history
    }

    pub fn episode_lengths(&self) -> &[u64] {
        &self.episode_lengths
    }

    /// Temporal difference of every backup performed.
    pub fn training_error(&self) -> &[f64] {
        &self.training_error
    }

    /// Epsilon-greedy action at `state`.
    pub fn select(&mut self, state: &S) -> Result<A> {
        let values = self.q_table.row_or_default(state).to_vec();
        self.action_selection.select(&values, self.q_table.action_space())
    }

    fn greedy(&mut self, state: &S) -> Result<A> {
        let values = self.q_table.row_or_default(state).to_vec();
        self.action_selection.exploit(&values, self.q_table.action_space())
    }

    /// One-step Q-learning backup, returns the temporal difference.
    pub fn update(&mut self, state: &S, action: A, reward: f64, next_state: &S) -> Result<f64> {
        self.backup(state, action, reward, next_state, false)
    }

    fn backup(
        &mut self,
        state: &S,
        action: A,
        reward: f64,
        next_state: &S,
        terminated: bool,
    ) -> Result<f64> {
        let current = self.q_table.get_or_default(state, action)?;
        let future = if terminated && self.terminal_bootstrap == TerminalBootstrap::Zero {
            0.0
        } else {
            let next_values = self.q_table.row_or_default(next_state);
            if next_values.is_empty() {
                0.0
            } else {
                max(next_values)
            }
        };
        let target = reward + self.discount_factor * future;
        // blended form keeps α = 1 an exact replacement and α = 0 a no-op
        let value = (1.0 - self.learning_rate) * current + self.learning_rate * target;
        self.q_table.set(state, action, value)?;
        Ok(target - current)
    }

    /// Run `n_episodes` full episodes, returning the total reward of each.
    ///
    /// An environment error aborts training at once; the unfinished episode is
    /// not recorded.
    pub fn learn<E: Env<S, A> + ?Sized>(
        &mut self,
        env: &mut E,
        n_episodes: usize,
    ) -> Result<Vec<f64>> {
        info!(
            n_episodes,
            epsilon = self.epsilon(),
            known_states = self.q_table.len(),
            "training started"
        );
        let mut pb = if self.show_progress {
            let mut pb = tqdm!(total = n_episodes);
            pb.set_description("training".to_string());
            Some(pb)
        } else {
            None
        };

        let mut rewards: Vec<f64> = Vec::with_capacity(n_episodes);
        for episode in 0..n_episodes {
            let mut epi_reward: f64 = 0.0;
            let mut action_counter: u64 = 0;
            let mut curr_state: S = env.reset();

            loop {
                action_counter += 1;
                let action = self.select(&curr_state)?;
                let (next_state, reward, terminated) = env.step(action)?;
                let td = self.backup(&curr_state, action, reward, &next_state, terminated)?;
                self.training_error.push(td);
                epi_reward += reward;
                curr_state = next_state;
                if terminated {
                    break;
                }
            }

            rewards.push(epi_reward);
            self.reward_history.push(epi_reward);
            self.episode_lengths.push(action_counter);
            self.action_selection.update();
            debug!(
                episode,
                reward = epi_reward,
                steps = action_counter,
                epsilon = self.epsilon(),
                "episode finished"
            );
            if let Some(pb) = pb.as_mut() {
                pb.set_postfix(format!("reward={}", epi_reward));
                pb.update(1);
            }
        }

        info!(
            n_episodes,
            known_states = self.q_table.len(),
            mean_reward = rewards.iter().sum::<f64>() / rewards.len().max(1) as f64,
            "training finished"
        );
        Ok(rewards)
    }

    /// Greedy rollouts without learning, returns rewards and lengths per episode.
    pub fn evaluate<E: Env<S, A> + ?Sized>(
        &mut self,
        env: &mut E,
        n_episodes: usize,
    ) -> Result<(Vec<f64>, Vec<u64>)> {
        let mut reward_history: Vec<f64> = vec![];
        let mut episode_length: Vec<u64> = vec![];
        for _episode in 0..n_episodes {
            let mut action_counter: u64 = 0;
            let mut epi_reward: f64 = 0.0;
            let mut curr_state: S = env.reset();
            loop {
                action_counter += 1;
                let action = self.greedy(&curr_state)?;
                let (next_state, reward, terminated) = env.step(action)?;
                epi_reward += reward;
                curr_state = next_state;
                if terminated {
                    break;
                }
            }
            reward_history.push(epi_reward);
            episode_length.push(action_counter);
        }
        debug!(n_episodes, "evaluation finished");
        Ok((reward_history, episode_length))
    }

    /// Render every frame of one greedy episode.
    pub fn example<E: Env<S, A> + ?Sized>(&mut self, env: &mut E) -> Result<String> {
        let mut frames: Vec<String> = vec![];
        let mut epi_reward: f64 = 0.0;
        let mut steps: u64 = 0;
        let mut curr_state: S = env.reset();
        loop {
            steps += 1;
            frames.push(env.render());
            let action = self.greedy(&curr_state)?;
            let (next_state, reward, terminated) = env.step(action)?;
            frames.push(format!("action {:?}, step reward {}", action, reward));
            epi_reward += reward;
            curr_state = next_state;
            if terminated {
                break;
            }
        }
        frames.push(env.render());
        frames.push(format!("episode reward {}", epi_reward));
        frames.push(format!("terminated with {} steps", steps));
        Ok(frames.join("\n"))
    }

    /// Forget everything learned and restore the initial exploration rate.
    pub fn reset(&mut self) {
        self.q_table.clear();
        self.action_selection.reset();
        self.reward_history.clear();
        self.episode_lengths.clear();
        self.training_error.clear();
    }

    /// Best value known at `state`.
    pub fn value_of(&self, state: &S) -> f64 {
        self.q_table.max_value(state)
    }

    /// Greedy action at `state`, the first maximizer wins ties.
    pub fn policy_at(&self, state: &S) -> Result<A> {
        let action_space = self.q_table.action_space();
        let index = match self.q_table.row(state) {
            Some(row) => argmax(row),
            None => (!action_space.is_empty()).then_some(0),
        };
        index
            .and_then(|i| action_space.get(i))
            .ok_or(AgentError::EmptyActionSpace)
    }

    pub fn value_table(&self) -> IndexMap<S, f64> {
        self.q_table
            .iter()
            .map(|(state, _)| (state.clone(), self.value_of(state)))
            .collect()
    }

    pub fn policy_table(&self) -> Result<IndexMap<S, A>> {
        self.q_table
            .iter()
            .map(|(state, _)| Ok((state.clone(), self.policy_at(state)?)))
            .collect()
    }
}

impl<S: Hash + Eq + Clone + Debug + GridCell, A: Copy + PartialEq + Debug> QLearningAgent<S, A> {
    /// Per-cell maximum value over every stored state projected on that cell.
    /// Cells no stored state maps to hold `NaN`.
    pub fn value_grid(&self, height: usize, width: usize) -> Array2<f64> {
        let mut grid = Array2::from_elem((height, width), f64::NAN);
        for (state, _) in self.q_table.iter() {
            let (row, col) = state.cell();
            if row >= height || col >= width {
                continue;
            }
            let value = self.value_of(state);
            let cell = &mut grid[[row, col]];
            if cell.is_nan() || value > *cell {
                *cell = value;
            }
        }
        grid
    }

    pub fn render_value_grid(&self, height: usize, width: usize) -> String {
        let grid = self.value_grid(height, width);
        grid.rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|v| {
                        if v.is_nan() {
                            "0.00".to_string()
                        } else {
                            format!("{:.2}", v)
                        }
                    })
                    .collect::<Vec<String>>()
                    .join(" | ")
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
