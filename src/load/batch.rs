//! Fixed-size batching of actions

use super::action::{Action, Batch};

/// Collects actions and hands out full batches in input order
#[derive(Debug)]
pub struct BatchAccumulator {
    capacity: usize,
    pending: Batch,
}

impl BatchAccumulator {
    /// Create an accumulator emitting batches of `capacity` actions
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            pending: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Actions waiting for the batch to fill
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Add an action, returning the batch it completed, if any
    pub fn push(&mut self, action: Action) -> Option<Batch> {
        self.pending.push(action);
        if self.pending.len() >= self.capacity {
            Some(std::mem::replace(
                &mut self.pending,
                Vec::with_capacity(self.capacity),
            ))
        } else {
            None
        }
    }

    /// Take the remainder at end of input. Never returns an empty batch.
    pub fn finish(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn action(id: usize) -> Action {
        Action {
            id: id.to_string(),
            index: "test-batch".to_string(),
            doc_type: "default".to_string(),
            source: IndexMap::new(),
        }
    }

    fn ids(batch: &Batch) -> Vec<&str> {
        batch.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_emits_full_batches_in_order() {
        let mut acc = BatchAccumulator::new(2);

        assert!(acc.push(action(0)).is_none());
        let first = acc.push(action(1)).expect("batch should be full");
        assert_eq!(ids(&first), vec!["0", "1"]);

        assert!(acc.push(action(2)).is_none());
        let second = acc.push(action(3)).expect("batch should be full");
        assert_eq!(ids(&second), vec!["2", "3"]);
        assert_eq!(acc.pending(), 0);
    }

    #[test]
    fn test_finish_flushes_remainder() {
        let mut acc = BatchAccumulator::new(3);
        for i in 0..4 {
            acc.push(action(i));
        }

        let rest = acc.finish().expect("remainder expected");
        assert_eq!(ids(&rest), vec!["3"]);
        assert!(acc.finish().is_none());
    }

    #[test]
    fn test_finish_skips_empty_batch() {
        let mut acc = BatchAccumulator::new(2);
        assert!(acc.finish().is_none());

        acc.push(action(0));
        acc.push(action(1));
        assert!(acc.finish().is_none());
    }

    #[test]
    fn test_no_action_lost_at_boundaries() {
        let mut acc = BatchAccumulator::new(10);
        let mut seen = Vec::new();
        for i in 0..35 {
            if let Some(batch) = acc.push(action(i)) {
                assert_eq!(batch.len(), 10);
                seen.extend(batch.into_iter().map(|a| a.id));
            }
        }
        seen.extend(acc.finish().unwrap().into_iter().map(|a| a.id));

        let expected: Vec<String> = (0..35).map(|i| i.to_string()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut acc = BatchAccumulator::new(0);
        assert_eq!(acc.capacity(), 1);
        assert!(acc.push(action(0)).is_some());
    }
}
