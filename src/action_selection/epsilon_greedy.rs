use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt::Debug;

use super::{EnumEpsilonSchedule, EpsilonSchedule};
use crate::env::ActionSpace;
use crate::error::{AgentError, Result};
use crate::utils::argmax_all;

#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    exploration_decider: Uniform<f64>,
    initial_epsilon: f64,
    epsilon: f64,
    schedule: EnumEpsilonSchedule,
    rng: StdRng,
}

impl EpsilonGreedy {
    /// Without a seed the random source is drawn from OS entropy.
    pub fn new(epsilon: f64, schedule: EnumEpsilonSchedule, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            exploration_decider: Uniform::from(0.0..1.0),
            initial_epsilon: epsilon,
            epsilon,
            schedule,
            rng,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn should_explore(&mut self) -> bool {
        self.epsilon != 0.0 && self.exploration_decider.sample(&mut self.rng) < self.epsilon
    }

    /// `values[i]` is the value of the i-th action of `action_space`.
    pub fn select<A: Copy + PartialEq + Debug>(
        &mut self,
        values: &[f64],
        action_space: &ActionSpace<A>,
    ) -> Result<A> {
        if action_space.is_empty() {
            return Err(AgentError::EmptyActionSpace);
        }
        if self.should_explore() {
            action_space.sample(&mut self.rng)
        } else {
            self.exploit(values, action_space)
        }
    }

    /// Greedy choice, ties broken uniformly at random among all maximizers.
    pub fn exploit<A: Copy + PartialEq + Debug>(
        &mut self,
        values: &[f64],
        action_space: &ActionSpace<A>,
    ) -> Result<A> {
        let best = argmax_all(values);
        // an all-NaN row has no maximizer
        let index = match best.choose(&mut self.rng) {
            Some(index) => *index,
            None => return action_space.sample(&mut self.rng),
        };
        action_space
            .get(index)
            .ok_or_else(|| AgentError::InvalidAction(format!("index {}", index)))
    }

    /// Advance the exploration rate once an episode is over.
    pub fn update(&mut self) {
        self.epsilon = self.schedule.next_epsilon(self.epsilon);
    }

    pub fn reset(&mut self) {
        self.epsilon = self.initial_epsilon;
    }
}
