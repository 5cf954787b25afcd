//! # Crossroads: Learning a Traffic Light
//!
//! Crossroads trains a tabular Q-learning agent to run the lights of a single
//! four-way intersection, and streams what it is doing to whatever UI is
//! listening.
//!
//! ## Overview
//!
//! Vehicles queue on four approaches. Each step the agent either keeps the
//! current light phase or switches it. Green approaches clear up to two cars
//! each, and the reward is the negated number of cars still waiting. The
//! episodes are fixed at 50 steps. The learned value table is persisted after
//! every training episode, so a restarted process picks up where it left off.
//!
//! ## Project Architecture
//!
//! ### The Crates
//!
//! -   **`crossroads`:** The crate you are currently viewing. It serves as the
//!     documentation entry point and the executable: it parses the command
//!     line, reads JSON commands from stdin, and writes JSON events to stdout.
//! -   **[`intersection`]:** The environment. Queue dynamics, the light
//!     phase and the 8-integer observation.
//! -   **[`learner`]:** The agent. State discretization, the value table and
//!     its blob format, the replay buffer and epsilon-greedy control.
//! -   **[`runtime`]:** The controller loop. Command handling, pacing, event
//!     emission and table persistence.
//!
//! ## Getting Started
//!
//! Run `crossroads --autostart --train --tick-ms 0 --max-episodes 200` to
//! train headless, or start it bare and send
//! `{"command": "start_simulation", "training": true}` on stdin. The
//! [`runtime::Command`] and [`runtime::Event`] docs describe the full wire
//! vocabulary.

pub use intersection;
pub use learner;
pub use runtime;
