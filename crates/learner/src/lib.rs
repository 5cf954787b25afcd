#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Learner
//!
//! The tabular reinforcement learning half of the crossroads workspace.
//!
//! -   [`Env`] is the gym-style environment trait, implemented here for
//!     [`intersection::IntersectionEnvironment`].
//! -   [`discretize`] hashes an 8-value observation into one of
//!     [`TABLE_SIZE`] rows with a fixed FNV-1a function.
//! -   [`TabularAgent`] selects actions epsilon-greedily, remembers
//!     [`Transition`]s in a bounded [`ReplayBuffer`], and replays them into a
//!     live [`ValueTable`] bootstrapped from a periodically synced copy.
//! -   [`run_episode`] drives one complete episode for batch training and
//!     benchmarks.

pub mod agent;
pub mod discretize;
pub mod env;
pub mod replay;
pub mod rollout;
pub mod table;

pub use agent::{AgentConfig, TabularAgent};
pub use discretize::{state_hash, state_id, TABLE_SIZE};
pub use env::Env;
pub use replay::{ReplayBuffer, Transition};
pub use rollout::{run_episode, EpisodeStats};
pub use table::{TableError, ValueTable, TABLE_MAGIC};
