#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Crossroads Runtime
//!
//! The control loop that ties the [`intersection`] environment to the
//! [`learner`] agent: it paces steps, records training transitions, runs the
//! end-of-episode replay, persists the value table and publishes progress
//! [`Event`]s to an [`EventSink`].
//!
//! All mutable simulation state is owned by one [`SimulationController`];
//! the outside world talks to it only through [`Command`]s on a channel.

pub mod command;
pub mod config;
pub mod controller;
pub mod events;
pub mod store;

pub use command::Command;
pub use config::{RuntimeConfig, DEFAULT_TABLE_NAME};
pub use controller::{EnvFactory, SimulationController};
pub use events::{round_to, ChannelSink, EpisodeSummary, Event, EventSink, JsonLinesSink, StepEvent};
pub use store::{
    load_table, save_table, try_load_table, FsTableStore, MemoryStore, StoreError, TableStore,
};
