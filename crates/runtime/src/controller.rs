//! # Simulation Controller
//!
//! Owns the environment, the agent, the table store and the event sink, and
//! is the only place any of them is mutated. Control commands arrive on a
//! channel and are applied between ticks, so a reset can never race with a
//! step in flight.
//!
//! Each iteration of [`SimulationController::run`]:
//!
//! 1.  drains pending commands,
//! 2.  executes at most one simulation step (when a run is active),
//! 3.  waits out the pacing interval, queueing any command that arrives
//!     meanwhile.
//!
//! Stop is cooperative: the run flag is only consulted at the top of an
//! iteration, never mid-step.

use intersection::{IntersectionEnvironment, Observation, SimError};
use learner::TabularAgent;
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::command::Command;
use crate::config::RuntimeConfig;
use crate::events::{round_to, EpisodeSummary, Event, EventSink, StepEvent};
use crate::store::{load_table, save_table, TableStore};

/// Builds a fresh environment for `reset_simulation`.
pub type EnvFactory = Box<dyn FnMut() -> IntersectionEnvironment + Send>;

pub struct SimulationController {
    config: RuntimeConfig,
    env: IntersectionEnvironment,
    make_env: EnvFactory,
    agent: TabularAgent,
    store: Box<dyn TableStore>,
    sink: Box<dyn EventSink>,
    commands: Receiver<Command>,
    pending: VecDeque<Command>,
    /// Observation the next step acts on; `None` until an episode starts.
    state: Option<Observation>,
    episode_rewards: Vec<f32>,
    episodes_completed: u64,
    running: bool,
    training: bool,
    shutdown: bool,
    commands_closed: bool,
}

impl SimulationController {
    /// Creates the controller and loads the persisted live table into `agent`,
    /// falling back to a fresh table when none is usable.
    pub fn new(
        config: RuntimeConfig,
        mut make_env: EnvFactory,
        mut agent: TabularAgent,
        store: Box<dyn TableStore>,
        sink: Box<dyn EventSink>,
        commands: Receiver<Command>,
    ) -> Self {
        let table = load_table(
            store.as_ref(),
            &config.table_name,
            agent.live_table().rows(),
            agent.live_table().cols(),
        );
        if let Err(e) = agent.load_table(table) {
            warn!("Persisted table rejected: {e}. Keeping a fresh table.");
        }
        let env = make_env();
        Self {
            config,
            env,
            make_env,
            agent,
            store,
            sink,
            commands,
            pending: VecDeque::new(),
            state: None,
            episode_rewards: Vec::new(),
            episodes_completed: 0,
            running: false,
            training: false,
            shutdown: false,
            commands_closed: false,
        }
    }

    #[must_use]
    pub fn env(&self) -> &IntersectionEnvironment {
        &self.env
    }

    #[must_use]
    pub fn agent(&self) -> &TabularAgent {
        &self.agent
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn is_training(&self) -> bool {
        self.training
    }

    #[must_use]
    pub fn episodes_completed(&self) -> u64 {
        self.episodes_completed
    }

    /// Drives the loop until shutdown, or until the command channel closes
    /// while no run is active.
    pub fn run(&mut self) {
        info!("Controller loop started (tick = {:?}).", self.config.tick());
        loop {
            self.drain_commands();
            if self.shutdown || (self.commands_closed && !self.running) {
                break;
            }
            if self.running {
                if let Err(e) = self.tick() {
                    error!("Simulation aborted: {e}");
                    self.running = false;
                }
            }
            self.wait_for_next_tick();
        }
        info!("Simulation stopped after {} completed episodes.", self.episodes_completed);
    }

    /// Applies one control command.
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::StartSimulation { training } => self.start(training),
            Command::StopSimulation => self.stop("stop requested"),
            Command::Disconnect => self.stop("peer disconnected"),
            Command::ResetSimulation => self.reset(),
            Command::ToggleTraining { training } => {
                self.training = training;
                info!("Training mode set to {training}.");
                self.sink.emit(Event::TrainingStatus { training });
            }
            Command::Shutdown => {
                self.running = false;
                self.shutdown = true;
            }
        }
    }

    /// Executes one act/step/record cycle if a run is active.
    ///
    /// # Errors
    ///
    /// Returns the environment's invariant violation; the caller is expected
    /// to abort the run.
    pub fn tick(&mut self) -> Result<(), SimError> {
        if !self.running {
            return Ok(());
        }
        let state = match self.state {
            Some(state) => state,
            None => self.begin_episode()?,
        };

        let action = self.agent.select_action(&state);
        let outcome = self.env.step(action)?;
        self.episode_rewards.push(outcome.reward);

        if self.training {
            self.agent.observe(&state, action, outcome.reward, &outcome.observation, outcome.done);
        }

        self.sink.emit(Event::UpdateUi(StepEvent {
            episode: self.env.episode_count(),
            step: self.env.step_count(),
            action,
            reward: round_to(outcome.reward, 2),
            waiting_time: outcome.info.waiting_time,
            cars_passed: outcome.info.cars_passed,
            queues: outcome.info.queues,
            lights: outcome.info.lights,
            epsilon: round_to(self.agent.epsilon(), 4),
            training: self.training,
        }));

        self.state = Some(outcome.observation);
        if outcome.done {
            self.finish_episode()?;
        }
        Ok(())
    }

    fn start(&mut self, training: bool) {
        self.training = training;
        if self.running {
            debug!("Start ignored: a run is already active.");
            return;
        }
        match self.begin_episode() {
            Ok(_) => {
                self.running = true;
                info!("Simulation started (training = {training}).");
            }
            Err(e) => error!("Could not start simulation: {e}"),
        }
    }

    fn stop(&mut self, reason: &str) {
        if !self.running {
            debug!("Stop ignored ({reason}): nothing is running.");
            return;
        }
        self.running = false;
        info!("Simulation stopping: {reason}.");
    }

    fn reset(&mut self) {
        self.running = false;
        self.env = (self.make_env)();
        self.state = None;
        self.episode_rewards.clear();
        info!("Simulation reset with a fresh environment.");
        self.sink.emit(Event::SimulationReset);
    }

    fn begin_episode(&mut self) -> Result<Observation, SimError> {
        let state = self.env.reset()?;
        self.state = Some(state);
        self.episode_rewards.clear();
        Ok(state)
    }

    fn finish_episode(&mut self) -> Result<(), SimError> {
        #[allow(clippy::cast_precision_loss)]
        let avg_reward = if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f32>() / self.episode_rewards.len() as f32
        };
        let episode = self.env.episode_count();
        self.sink.emit(Event::EpisodeSummary(EpisodeSummary {
            episode,
            avg_reward: round_to(avg_reward, 2),
            total_waiting_time: self.env.total_waiting_time(),
            cars_passed: self.env.cars_passed(),
            action_history: self.env.action_history().to_vec(),
        }));

        if self.training {
            let batch = self.config.batch_size.min(self.agent.memory().len());
            let updates = self.agent.learn(batch);
            self.agent.sync_target();
            if let Err(e) =
                save_table(self.store.as_mut(), &self.config.table_name, self.agent.live_table())
            {
                warn!("Failed to persist value table: {e}. Will retry next episode.");
            }
            debug!(episode, updates, "Episode learning update applied.");
        }

        self.episodes_completed += 1;
        info!(
            episode,
            avg_reward,
            epsilon = self.agent.epsilon(),
            "Episode complete."
        );

        if self
            .config
            .max_episodes
            .is_some_and(|limit| self.episodes_completed >= limit)
        {
            info!("Episode limit of {} reached.", self.episodes_completed);
            self.running = false;
            // The environment stays at the last completed step.
            self.state = None;
            return Ok(());
        }

        self.begin_episode()?;
        Ok(())
    }

    fn drain_commands(&mut self) {
        while let Some(command) = self.pending.pop_front() {
            self.handle(command);
        }
        loop {
            match self.commands.try_recv() {
                Ok(command) => self.handle(command),
                Err(std::sync::mpsc::TryRecvError::Empty) => break,
                Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                    self.commands_closed = true;
                    break;
                }
            }
        }
    }

    /// The loop's only suspension point. An idle controller blocks until the
    /// next command; an active one sleeps out the tick, queueing commands.
    /// A queued shutdown cuts the wait short.
    fn wait_for_next_tick(&mut self) {
        if self.shutdown || (self.commands_closed && !self.running) {
            return;
        }
        if !self.running {
            match self.commands.recv() {
                Ok(command) => self.pending.push_back(command),
                Err(_) => self.commands_closed = true,
            }
            return;
        }
        let Some(deadline) = Instant::now().checked_add(self.config.tick()) else {
            // Pacing beyond the clock's range: wait for the next command instead.
            match self.commands.recv() {
                Ok(command) => self.pending.push_back(command),
                Err(_) => {
                    self.commands_closed = true;
                    std::thread::sleep(self.config.tick());
                }
            }
            return;
        };
        while !self.commands_closed {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            match self.commands.recv_timeout(remaining) {
                Ok(command) => {
                    let shutting_down = command == Command::Shutdown;
                    self.pending.push_back(command);
                    if shutting_down {
                        return;
                    }
                }
                Err(RecvTimeoutError::Timeout) => return,
                Err(RecvTimeoutError::Disconnected) => self.commands_closed = true,
            }
        }
        std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
    }
}
