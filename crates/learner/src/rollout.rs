use intersection::{Action, SimError};

use crate::agent::TabularAgent;
use crate::env::Env;

/// Totals for one completed episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeStats {
    pub steps: usize,
    pub total_reward: f32,
    pub actions: Vec<Action>,
    /// Table entries written by the end-of-episode replay, zero when not training.
    pub updates: usize,
}

impl EpisodeStats {
    #[must_use]
    pub fn mean_reward(&self) -> f32 {
        if self.steps == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let steps = self.steps as f32;
        self.total_reward / steps
    }
}

/// Runs one full episode without pacing or events.
///
/// With `batch_size = Some(n)` every transition is remembered and the episode
/// ends with the same replay, target sync and epsilon decay the controller
/// performs; with `None` the agent only acts.
///
/// # Errors
///
/// Propagates any invariant violation reported by the environment.
pub fn run_episode<E: Env>(
    env: &mut E,
    agent: &mut TabularAgent,
    batch_size: Option<usize>,
) -> Result<EpisodeStats, SimError> {
    let mut observation = env.reset()?;
    let mut stats = EpisodeStats { steps: 0, total_reward: 0.0, actions: Vec::new(), updates: 0 };

    loop {
        let action = agent.select_action(&observation);
        let outcome = env.step(action)?;
        if batch_size.is_some() {
            agent.observe(&observation, action, outcome.reward, &outcome.observation, outcome.done);
        }
        stats.steps += 1;
        stats.total_reward += outcome.reward;
        stats.actions.push(action);
        observation = outcome.observation;
        if outcome.done {
            break;
        }
    }

    if let Some(batch) = batch_size {
        stats.updates = agent.learn(batch.min(agent.memory().len()));
        agent.sync_target();
    }
    Ok(stats)
}
