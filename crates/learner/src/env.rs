use intersection::{Action, IntersectionEnvironment, Observation, SimError, StepOutcome};
use intersection::OBSERVATION_SIZE;

/// Reinforcement learning environment trait.
///
/// Inspired by classic frameworks like OpenAI Gym, this trait defines the core
/// interface an environment must provide for the tabular learner. Each call to
/// [`step`] advances the simulation by one discrete action and returns the new
/// observation, the reward and whether the episode has terminated.
///
/// [`step`]: Env::step
pub trait Env {
    /// Advance the environment by one action.
    ///
    /// # Errors
    ///
    /// Returns an error when the environment detects a broken invariant.
    fn step(&mut self, action: Action) -> Result<StepOutcome, SimError>;

    /// Reset the environment to the start of a new episode and return the
    /// initial observation.
    ///
    /// # Errors
    ///
    /// Returns an error when the fresh state breaks an invariant.
    fn reset(&mut self) -> Result<Observation, SimError>;

    /// Size of the observation vector.
    fn observation_size(&self) -> usize;

    /// Number of discrete actions.
    fn action_count(&self) -> usize;
}

impl Env for IntersectionEnvironment {
    fn step(&mut self, action: Action) -> Result<StepOutcome, SimError> {
        IntersectionEnvironment::step(self, action)
    }

    fn reset(&mut self) -> Result<Observation, SimError> {
        IntersectionEnvironment::reset(self)
    }

    fn observation_size(&self) -> usize {
        OBSERVATION_SIZE
    }

    fn action_count(&self) -> usize {
        Action::COUNT
    }
}
