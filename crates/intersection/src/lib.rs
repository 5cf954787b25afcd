#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Intersection
//!
//! The environment half of the crossroads workspace: a single four-way
//! intersection whose approaches queue vehicles while a binary light phase
//! decides which pair may drive.
//!
//! ## Key Components
//!
//! -   **Types:** [`Direction`], [`Action`], [`LightPhase`] and the
//!     8-integer [`Observation`] live in the [`types`] module.
//! -   **Queues:** [`QueueModel`] in the [`queue`] module applies random
//!     arrivals and capped departures. Arrivals come from an
//!     [`ArrivalSource`], so tests can swap in [`FixedArrivals`] or
//!     [`ScriptedArrivals`] for the weighted production draw.
//! -   **Environment:** [`IntersectionEnvironment`] wraps the queues and the
//!     phase into fixed 50-step episodes with `reset`/`step`.
//!
//! ## Usage
//!
//! ```rust
//! use intersection::{Action, IntersectionEnvironment, WeightedArrivals};
//!
//! let mut env = IntersectionEnvironment::new(Box::new(WeightedArrivals::with_seed(1)));
//! let _obs = env.reset()?;
//! let outcome = env.step(Action::Switch)?;
//! assert!(outcome.reward <= 0.0);
//! # Ok::<(), intersection::SimError>(())
//! ```

pub mod environment;
pub mod error;
pub mod queue;
pub mod types;

pub use environment::{IntersectionEnvironment, StepInfo, StepOutcome};
pub use error::SimError;
pub use queue::{ArrivalSource, FixedArrivals, QueueModel, ScriptedArrivals, WeightedArrivals};
pub use types::{
    Action, Direction, LightPhase, Lights, Observation, PerDirection, QueueState, EPISODE_LENGTH,
    MAX_DEPARTURES, OBSERVATION_SIZE, QUEUE_CAP,
};
