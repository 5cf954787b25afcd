use intersection::{Action, Observation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discretize::{state_id, TABLE_SIZE};
use crate::replay::{ReplayBuffer, Transition};
use crate::table::{TableError, ValueTable};

/// Hyper-parameters of [`TabularAgent`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub table_size: usize,
    pub discount: f32,
    pub epsilon_start: f32,
    pub epsilon_min: f32,
    pub epsilon_decay: f32,
    pub memory_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            table_size: TABLE_SIZE,
            discount: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            memory_capacity: 2000,
        }
    }
}

/// Epsilon-greedy tabular learner with a replay buffer and a periodically
/// synced target table.
///
/// `live` is overwritten by [`learn`](Self::learn); `stabilized` is a frozen
/// copy refreshed by [`sync_target`](Self::sync_target) and used only to
/// compute bootstrap targets.
pub struct TabularAgent {
    config: AgentConfig,
    live: ValueTable,
    stabilized: ValueTable,
    memory: ReplayBuffer,
    epsilon: f32,
    rng: fastrand::Rng,
}

impl TabularAgent {
    #[must_use]
    pub fn new(config: AgentConfig) -> Self {
        Self::with_rng(config, fastrand::Rng::new())
    }

    #[must_use]
    pub fn with_seed(config: AgentConfig, seed: u64) -> Self {
        Self::with_rng(config, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(config: AgentConfig, rng: fastrand::Rng) -> Self {
        let live = ValueTable::zeros(config.table_size, Action::COUNT);
        let stabilized = live.clone();
        Self {
            memory: ReplayBuffer::new(config.memory_capacity),
            epsilon: config.epsilon_start,
            config,
            live,
            stabilized,
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    #[must_use]
    pub fn live_table(&self) -> &ValueTable {
        &self.live
    }

    #[must_use]
    pub fn stabilized_table(&self) -> &ValueTable {
        &self.stabilized
    }

    #[must_use]
    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    /// Installs a previously persisted live table and syncs the target to it.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ShapeMismatch`] if `table` does not match this
    /// agent's table size and action count; the agent is left unchanged.
    pub fn load_table(&mut self, table: ValueTable) -> Result<(), TableError> {
        if (table.rows(), table.cols()) != (self.live.rows(), self.live.cols()) {
            return Err(TableError::ShapeMismatch {
                rows: self.live.rows(),
                cols: self.live.cols(),
                found_rows: table.rows(),
                found_cols: table.cols(),
            });
        }
        self.live = table;
        self.sync_target();
        Ok(())
    }

    #[must_use]
    pub fn state_id(&self, observation: &Observation) -> usize {
        state_id(observation, self.config.table_size)
    }

    /// Epsilon-greedy choice over the live table.
    pub fn select_action(&mut self, observation: &Observation) -> Action {
        if self.rng.f32() < self.epsilon {
            return Action::ALL[self.rng.usize(..Action::COUNT)];
        }
        self.greedy_action(observation)
    }

    /// Best action under the live table; Hold wins ties.
    #[must_use]
    pub fn greedy_action(&self, observation: &Observation) -> Action {
        let best = self.live.argmax(self.state_id(observation));
        Action::from_index(best).unwrap_or(Action::Hold)
    }

    /// Records `transition`. State ids at or beyond the table size are
    /// reduced modulo the table size, the same reduction [`state_id`] applies
    /// to hashes, so every remembered entry addresses a real row.
    pub fn remember(&mut self, mut transition: Transition) {
        let rows = self.live.rows();
        transition.state_id %= rows;
        transition.next_state_id %= rows;
        self.memory.push(transition);
    }

    /// Discretizes both observations and records the transition.
    pub fn observe(
        &mut self,
        observation: &Observation,
        action: Action,
        reward: f32,
        next_observation: &Observation,
        done: bool,
    ) {
        let transition = Transition {
            state_id: self.state_id(observation),
            action,
            reward,
            next_state_id: self.state_id(next_observation),
            done,
        };
        self.remember(transition);
    }

    /// Replays `batch_size` remembered transitions.
    ///
    /// Each sampled entry overwrites `live[state][action]` with its one-step
    /// target, bootstrapped from the stabilized table. Epsilon decays once per
    /// batch. With fewer than `batch_size` entries in memory nothing changes.
    ///
    /// Returns the number of table entries written.
    pub fn learn(&mut self, batch_size: usize) -> usize {
        if self.memory.len() < batch_size {
            return 0;
        }
        let batch = self.memory.sample(&mut self.rng, batch_size);
        for t in &batch {
            let target = if t.done {
                t.reward
            } else {
                t.reward + self.config.discount * self.stabilized.max(t.next_state_id)
            };
            self.live.set(t.state_id, t.action.index(), target);
        }
        self.decay_epsilon();
        debug!(updates = batch.len(), epsilon = self.epsilon, "replayed batch");
        batch.len()
    }

    /// Copies the live table into the stabilized table.
    pub fn sync_target(&mut self) {
        self.stabilized.copy_from(&self.live);
    }

    fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }
}
