//! # Crossroads Application Wiring
//!
//! Builds the controller's collaborators from the command line and hands the
//! main thread to [`SimulationController::run`]:
//!
//! -   a filesystem [`FsTableStore`] under `--models-dir`,
//! -   a [`JsonLinesSink`] on stdout,
//! -   a command channel fed by [`crate::input`] from stdin,
//! -   an environment factory producing weighted-arrival intersections.
//!
//! With `--seed` every fresh environment gets its own seed derived from the
//! base seed, so repeated resets do not replay identical traffic.

use anyhow::Result;
use intersection::{IntersectionEnvironment, WeightedArrivals};
use learner::{AgentConfig, TabularAgent};
use runtime::{
    Command, EnvFactory, FsTableStore, JsonLinesSink, RuntimeConfig, SimulationController,
};
use std::io;
use std::sync::mpsc;

use crate::{input, Args};

/// Run the controller until shutdown or until stdin closes with no active run.
///
/// # Errors
///
/// Returns an error if the command pump cannot be started or the initial
/// autostart command cannot be queued.
pub fn run(args: &Args) -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let config = RuntimeConfig {
        models_dir: args.models_dir.clone(),
        tick_ms: args.tick_ms,
        batch_size: args.batch_size,
        max_episodes: args.max_episodes,
        ..RuntimeConfig::default()
    };
    tracing::info!("Runtime configuration: {config:?}");

    let agent = match args.seed {
        Some(seed) => TabularAgent::with_seed(AgentConfig::default(), seed),
        None => TabularAgent::new(AgentConfig::default()),
    };

    let (command_tx, command_rx) = mpsc::channel();
    if args.autostart {
        command_tx.send(Command::StartSimulation { training: args.train })?;
    }
    let _pump = input::start(io::BufReader::new(io::stdin()), command_tx)?;

    let store = FsTableStore::new(&config.models_dir);
    let sink = JsonLinesSink::new(io::stdout());
    let mut controller = SimulationController::new(
        config,
        env_factory(args.seed),
        agent,
        Box::new(store),
        Box::new(sink),
        command_rx,
    );
    controller.run();
    Ok(())
}

fn env_factory(seed: Option<u64>) -> EnvFactory {
    let mut generation = 0_u64;
    Box::new(move || {
        generation += 1;
        let arrivals = match seed {
            Some(seed) => WeightedArrivals::with_seed(seed.wrapping_add(generation)),
            None => WeightedArrivals::new(),
        };
        IntersectionEnvironment::new(Box::new(arrivals))
    })
}
