use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt::Debug;

use crate::error::{AgentError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpace<A> {
    actions: Vec<A>,
}

impl<A: Copy + PartialEq + Debug> ActionSpace<A> {
    pub fn new(actions: Vec<A>) -> Self {
        Self { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    pub fn get(&self, index: usize) -> Option<A> {
        self.actions.get(index).copied()
    }

    /// Position of `action` inside the space, which is also its column in the Q table.
    pub fn index_of(&self, action: A) -> Result<usize> {
        self.actions
            .iter()
            .position(|a| *a == action)
            .ok_or_else(|| AgentError::InvalidAction(format!("{:?}", action)))
    }

    pub fn contains(&self, action: A) -> bool {
        self.actions.contains(&action)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<A> {
        self.actions
            .choose(rng)
            .copied()
            .ok_or(AgentError::EmptyActionSpace)
    }
}
