use std::collections::VecDeque;

use intersection::Action;

/// One recorded step, with both observations already discretized.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transition {
    pub state_id: usize,
    pub action: Action,
    pub reward: f32,
    pub next_state_id: usize,
    pub done: bool,
}

/// Bounded FIFO of transitions. Sampling reads without removing, so the
/// buffer behaves as a sliding window over recent experience.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    capacity: usize,
    items: VecDeque<Transition>,
}

impl ReplayBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity, items: VecDeque::with_capacity(capacity) }
    }

    /// Appends `transition`, evicting the oldest entry once full.
    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(transition);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.items.iter()
    }

    /// Draws `count` distinct entries uniformly at random (partial
    /// Fisher-Yates over the indices). Returns fewer if the buffer is smaller.
    pub fn sample(&self, rng: &mut fastrand::Rng, count: usize) -> Vec<Transition> {
        let count = count.min(self.items.len());
        let mut indices: Vec<usize> = (0..self.items.len()).collect();
        for i in 0..count {
            let j = rng.usize(i..indices.len());
            indices.swap(i, j);
        }
        indices[..count].iter().map(|&i| self.items[i]).collect()
    }
}
