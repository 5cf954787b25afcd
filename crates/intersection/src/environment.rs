use tracing::trace;

use crate::error::SimError;
use crate::queue::{ArrivalSource, QueueModel};
use crate::types::{
    Action, Direction, LightPhase, Lights, Observation, QueueState, EPISODE_LENGTH, QUEUE_CAP,
};

/// Side information returned with every step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepInfo {
    /// Vehicles waiting after this step.
    pub waiting_time: u32,
    /// Vehicles passed since the environment was constructed.
    pub cars_passed: u64,
    pub queues: QueueState,
    pub lights: Lights,
}

/// Result of [`IntersectionEnvironment::step`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f32,
    pub done: bool,
    pub info: StepInfo,
}

/// A single four-way intersection run as a fixed-length episodic MDP.
///
/// `total_waiting_time` and `cars_passed` accumulate over the whole life of
/// the environment; [`reset`](Self::reset) only starts a new episode.
pub struct IntersectionEnvironment {
    queues: QueueModel,
    phase: LightPhase,
    step_count: u32,
    episode_count: u64,
    total_waiting_time: u64,
    cars_passed: u64,
    action_history: Vec<Action>,
    reward_history: Vec<f32>,
}

impl IntersectionEnvironment {
    /// Empty queues, North/South green, no episode started yet.
    #[must_use]
    pub fn new(arrivals: Box<dyn ArrivalSource>) -> Self {
        Self {
            queues: QueueModel::new(arrivals),
            phase: LightPhase::NorthSouthGreen,
            step_count: 0,
            episode_count: 0,
            total_waiting_time: 0,
            cars_passed: 0,
            action_history: Vec::with_capacity(EPISODE_LENGTH as usize),
            reward_history: Vec::with_capacity(EPISODE_LENGTH as usize),
        }
    }

    /// Seeds the current queue lengths, in [`Direction::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::QueueOutOfRange`] if any length exceeds the cap.
    pub fn with_queues(mut self, lengths: [u8; 4]) -> Result<Self, SimError> {
        for d in Direction::ALL {
            let length = lengths[d.index()];
            if length > QUEUE_CAP {
                return Err(SimError::QueueOutOfRange { direction: d, length: i32::from(length) });
            }
        }
        self.queues.set_queues(QueueState::from_array(lengths));
        Ok(self)
    }

    /// Starts a new episode: empty queues, North/South green, step counter
    /// zeroed, then one queue update (arrivals followed by departures on the
    /// green approaches). Vehicles released here count toward `cars_passed`;
    /// the lifetime counters are otherwise left untouched.
    ///
    /// # Errors
    ///
    /// Propagates an invariant violation detected on the fresh state.
    pub fn reset(&mut self) -> Result<Observation, SimError> {
        self.queues.clear();
        self.phase = LightPhase::NorthSouthGreen;
        self.step_count = 0;
        self.episode_count += 1;
        self.action_history.clear();
        self.reward_history.clear();
        self.queues.arrive();
        let departed = self.queues.depart(self.phase);
        self.cars_passed += u64::from(departed);

        let observation = self.observation();
        observation.validate()?;
        Ok(observation)
    }

    /// Applies `action`, then arrivals, then departures, and scores the step.
    ///
    /// The reward is the negated number of vehicles still waiting, so an
    /// episode's return is the negated waiting time it accumulated.
    ///
    /// # Errors
    ///
    /// Returns an error if the post-step state breaks the queue bounds or the
    /// paired-phase invariant.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome, SimError> {
        self.step_count += 1;

        if action == Action::Switch {
            self.phase = self.phase.flipped();
        }
        self.action_history.push(action);

        self.queues.arrive();
        let departed = self.queues.depart(self.phase);
        self.cars_passed += u64::from(departed);

        let waiting_time = self.queues.total_waiting();
        self.total_waiting_time += u64::from(waiting_time);
        #[allow(clippy::cast_precision_loss)]
        let reward = -(waiting_time as f32);
        self.reward_history.push(reward);

        let done = self.step_count >= EPISODE_LENGTH;

        let observation = self.observation();
        observation.validate()?;

        trace!(
            episode = self.episode_count,
            step = self.step_count,
            %action,
            waiting_time,
            departed,
            "intersection step"
        );

        Ok(StepOutcome {
            observation,
            reward,
            done,
            info: StepInfo {
                waiting_time,
                cars_passed: self.cars_passed,
                queues: self.queues.queues(),
                lights: self.phase.lights(),
            },
        })
    }

    #[must_use]
    pub fn observation(&self) -> Observation {
        Observation::new(&self.queues.queues(), self.phase)
    }

    #[must_use]
    pub fn queues(&self) -> QueueState {
        self.queues.queues()
    }

    #[must_use]
    pub fn phase(&self) -> LightPhase {
        self.phase
    }

    #[must_use]
    pub fn lights(&self) -> Lights {
        self.phase.lights()
    }

    #[must_use]
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    #[must_use]
    pub fn episode_count(&self) -> u64 {
        self.episode_count
    }

    #[must_use]
    pub fn total_waiting_time(&self) -> u64 {
        self.total_waiting_time
    }

    #[must_use]
    pub fn cars_passed(&self) -> u64 {
        self.cars_passed
    }

    /// Actions taken in the current episode.
    #[must_use]
    pub fn action_history(&self) -> &[Action] {
        &self.action_history
    }

    /// Rewards received in the current episode.
    #[must_use]
    pub fn reward_history(&self) -> &[f32] {
        &self.reward_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::FixedArrivals;

    fn quiet() -> IntersectionEnvironment {
        IntersectionEnvironment::new(Box::new(FixedArrivals(0)))
    }

    #[test]
    fn switch_flips_all_four_lights() {
        let mut env = quiet();
        env.reset().unwrap();
        assert_eq!(env.lights().to_array(), [1, 1, 0, 0]);
        let out = env.step(Action::Switch).unwrap();
        assert_eq!(out.info.lights.to_array(), [0, 0, 1, 1]);
        let out = env.step(Action::Hold).unwrap();
        assert_eq!(out.info.lights.to_array(), [0, 0, 1, 1]);
        let out = env.step(Action::Switch).unwrap();
        assert_eq!(out.info.lights.to_array(), [1, 1, 0, 0]);
    }

    #[test]
    fn reset_keeps_lifetime_counters() {
        let mut env = IntersectionEnvironment::new(Box::new(FixedArrivals(1)));
        env.reset().unwrap();
        for _ in 0..5 {
            env.step(Action::Hold).unwrap();
        }
        let waited = env.total_waiting_time();
        let passed = env.cars_passed();
        assert!(waited > 0);
        assert!(passed > 0);

        env.reset().unwrap();
        assert_eq!(env.step_count(), 0);
        assert_eq!(env.episode_count(), 2);
        assert!(env.action_history().is_empty());
        assert!(env.reward_history().is_empty());
        assert_eq!(env.total_waiting_time(), waited);
        // The green pair drains the single arrival it just received.
        assert_eq!(env.cars_passed(), passed + 2);
        assert_eq!(env.queues().to_array(), [0, 0, 1, 1]);
        assert_eq!(env.phase(), LightPhase::NorthSouthGreen);
    }

    #[test]
    fn reset_runs_one_full_queue_update() {
        let mut env = IntersectionEnvironment::new(Box::new(FixedArrivals(3)));
        let obs = env.reset().unwrap();
        assert_eq!(env.queues().to_array(), [1, 1, 3, 3]);
        assert_eq!(env.cars_passed(), 4);
        assert_eq!(env.total_waiting_time(), 0);
        assert_eq!(obs.values(), &[1, 1, 3, 3, 1, 1, 0, 0]);
    }

    #[test]
    fn with_queues_rejects_values_over_cap() {
        let err = quiet().with_queues([0, 11, 0, 0]).err().unwrap();
        assert_eq!(err, SimError::QueueOutOfRange { direction: Direction::South, length: 11 });
        assert!(quiet().with_queues([10, 10, 10, 10]).is_ok());
    }

    #[test]
    fn histories_track_the_episode() {
        let mut env = quiet().with_queues([4, 0, 2, 0]).unwrap();
        env.step(Action::Hold).unwrap();
        env.step(Action::Switch).unwrap();
        assert_eq!(env.action_history(), &[Action::Hold, Action::Switch]);
        assert_eq!(env.reward_history(), &[-4.0, -2.0]);
    }
}
