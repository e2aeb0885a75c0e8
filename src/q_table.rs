use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::env::ActionSpace;
use crate::error::Result;

/// Action values per state, one dense row per visited state.
///
/// Rows are materialized with zeros on first access through the `*_or_default`
/// accessors; the plain readers never insert anything. Rows keep insertion
/// order, so reports built from the table are reproducible.
#[derive(Debug, Clone)]
pub struct QTable<S: Hash + Eq + Clone, A> {
    action_space: ActionSpace<A>,
    default: Vec<f64>,
    values: IndexMap<S, Vec<f64>, FxBuildHasher>,
}

impl<S: Hash + Eq + Clone, A: Copy + PartialEq + Debug> QTable<S, A> {
    pub fn new(action_space: ActionSpace<A>) -> Self {
        Self {
            default: vec![0.0; action_space.len()],
            action_space,
            values: IndexMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Table with a zero row for every given state.
    pub fn with_states(action_space: ActionSpace<A>, states: impl IntoIterator<Item = S>) -> Self {
        let mut table = Self::new(action_space);
        for state in states {
            table.values.insert(state, table.default.clone());
        }
        table
    }

    pub fn action_space(&self) -> &ActionSpace<A> {
        &self.action_space
    }

    pub fn get(&self, state: &S, action: A) -> Result<f64> {
        let index = self.action_space.index_of(action)?;
        Ok(self.values.get(state).map_or(0.0, |row| row[index]))
    }

    pub fn get_or_default(&mut self, state: &S, action: A) -> Result<f64> {
        let index = self.action_space.index_of(action)?;
        Ok(self.row_or_default(state)[index])
    }

    pub fn set(&mut self, state: &S, action: A, value: f64) -> Result<()> {
        let index = self.action_space.index_of(action)?;
        self.values
            .entry(state.clone())
            .or_insert_with(|| self.default.clone())[index] = value;
        Ok(())
    }

    pub fn row(&self, state: &S) -> Option<&[f64]> {
        self.values.get(state).map(Vec::as_slice)
    }

    pub fn row_or_default(&mut self, state: &S) -> &[f64] {
        self.values
            .entry(state.clone())
            .or_insert_with(|| self.default.clone())
    }

    /// Best stored value at `state`, 0.0 when nothing is known about it.
    pub fn max_value(&self, state: &S) -> f64 {
        let row = self.row(state).unwrap_or(self.default.as_slice());
        if row.is_empty() {
            0.0
        } else {
            crate::utils::max(row)
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &[f64])> {
        self.values.iter().map(|(s, row)| (s, row.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;

    type State = (usize, usize, usize, usize);

    fn table() -> QTable<State, i32> {
        QTable::new(ActionSpace::new(vec![1, 2, 3, 4]))
    }

    #[test]
    fn test_unseen_pairs_read_zero() {
        let mut q = table();
        let s = (0, 1, 2, 3);
        for a in 1..=4 {
            assert_eq!(q.get(&s, a).unwrap(), 0.0);
            assert_eq!(q.get_or_default(&s, a).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_get_does_not_materialize() {
        let q = table();
        q.get(&(0, 0, 0, 0), 1).unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn test_get_or_default_materializes_once() {
        let mut q = table();
        let s = (1, 1, 1, 1);
        q.get_or_default(&s, 2).unwrap();
        q.get_or_default(&s, 3).unwrap();
        assert_eq!(q.len(), 1);
        assert_eq!(q.row(&s), Some([0.0; 4].as_slice()));
    }

    #[test]
    fn test_set_then_get() {
        let mut q = table();
        let s = (0, 0, 1, 1);
        q.set(&s, 3, 1.25).unwrap();
        q.set(&s, 3, -7.5).unwrap();
        assert_eq!(q.get(&s, 3).unwrap(), -7.5);
        assert_eq!(q.get(&s, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_action_rejected() {
        let mut q = table();
        let s = (0, 0, 0, 0);
        assert!(matches!(q.get(&s, 9), Err(AgentError::InvalidAction(_))));
        assert!(matches!(
            q.set(&s, 0, 1.0),
            Err(AgentError::InvalidAction(_))
        ));
        assert!(matches!(
            q.get_or_default(&s, 5),
            Err(AgentError::InvalidAction(_))
        ));
        assert!(q.is_empty());
    }

    #[test]
    fn test_eager_and_lazy_read_the_same() {
        let states = vec![(0, 0, 0, 0), (0, 1, 1, 0), (1, 1, 0, 0)];
        let eager: QTable<State, i32> =
            QTable::with_states(ActionSpace::new(vec![1, 2, 3, 4]), states.clone());
        let lazy = table();
        assert_eq!(eager.len(), 3);
        for s in states.iter().chain([(2, 2, 2, 2)].iter()) {
            for a in 1..=4 {
                assert_eq!(eager.get(s, a).unwrap(), lazy.get(s, a).unwrap());
            }
            assert_eq!(eager.max_value(s), lazy.max_value(s));
        }
    }

    #[test]
    fn test_max_value() {
        let mut q = table();
        let s = (0, 0, 0, 0);
        q.set(&s, 1, -3.0).unwrap();
        q.set(&s, 2, -1.0).unwrap();
        assert_eq!(q.max_value(&s), 0.0);
        q.set(&s, 3, -2.0).unwrap();
        q.set(&s, 4, -0.5).unwrap();
        assert_eq!(q.max_value(&s), -0.5);
        assert_eq!(q.max_value(&(3, 3, 3, 3)), 0.0);
    }

    #[test]
    fn test_iter_keeps_insertion_order() {
        let mut q = table();
        q.set(&(2, 0, 0, 0), 1, 1.0).unwrap();
        q.set(&(0, 0, 0, 0), 1, 2.0).unwrap();
        q.set(&(1, 0, 0, 0), 1, 3.0).unwrap();
        let order: Vec<State> = q.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, vec![(2, 0, 0, 0), (0, 0, 0, 0), (1, 0, 0, 0)]);
    }

    #[test]
    fn test_clear() {
        let mut q = table();
        q.set(&(0, 0, 0, 0), 1, 1.0).unwrap();
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.get(&(0, 0, 0, 0), 1).unwrap(), 0.0);
    }
}
