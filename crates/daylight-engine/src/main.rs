//! Daylight engine binary.
//!
//! Connects to the driving simulator and runs the day/night weather cycle
//! until interrupted with Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `daylight-config.yaml` (or defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to the simulator (TCP bridge or headless world)
//! 4. Place the spectator camera
//! 5. Fetch the world's weather and bind a controller to it
//! 6. Run the cycle loop until Ctrl-C or the tick limit
//! 7. Log the result

mod bridge;
mod error;

use std::path::Path;

use daylight_core::config::{ConfigSource, DEFAULT_CONFIG_FILE, DaylightConfig, SimulatorBackend};
use daylight_core::runner::{self, ConsoleStatus, CycleEndReason, CycleResult};
use daylight_core::simulator::{self, HeadlessWorld, Simulator};
use daylight_core::{SimulatedClock, WeatherController};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::bridge::BridgeSimulator;
use crate::error::EngineError;

/// Application entry point for the Daylight engine.
///
/// # Errors
///
/// Returns an error if configuration, the simulator connection, or any
/// simulator call fails. Ctrl-C is a clean exit.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so this comes first.
    let (config, source) = DaylightConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?;

    // 2. Initialize structured logging on stderr; stdout carries the status line.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("daylight-engine starting");
    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "Configuration loaded"),
        ConfigSource::Defaults => info!("Config file not found, using defaults"),
    }
    info!(
        backend = ?config.simulator.backend,
        address = %config.simulator.address(),
        connect_timeout_ms = config.simulator.connect_timeout_ms,
        update_interval_ms = config.cycle.update_interval_ms,
        "Simulator settings"
    );

    // 3. Connect and run.
    let result = match config.simulator.backend {
        SimulatorBackend::Bridge => {
            let sim = BridgeSimulator::connect(
                &config.simulator.host,
                config.simulator.port,
                config.simulator.timeout(),
            )
            .await?;
            drive(sim, &config).await?
        }
        SimulatorBackend::Headless => {
            let sim = HeadlessWorld::new(config.simulator.headless_delta_seconds).realtime();
            drive(sim, &config).await?
        }
    };

    // 7. Log results.
    runner::log_cycle_end(&result);
    info!("daylight-engine shutdown complete");

    Ok(())
}

/// Place the spectator, bind the controller to the world's weather, and run
/// the cycle until interrupted.
async fn drive<S: Simulator>(
    mut simulator: S,
    config: &DaylightConfig,
) -> Result<CycleResult, EngineError> {
    // 4. Place the spectator camera.
    if config.spectator.enabled {
        simulator::place_spectator(
            &mut simulator,
            config.spectator.location(),
            config.spectator.rotation(),
        )
        .await?;
    }

    // 5. Bind a controller to the world's current weather.
    let mut weather = simulator.world_weather().await?;
    let clock = SimulatedClock::starting_at(config.cycle.start_hour);
    let mut controller = WeatherController::with_clock(&mut weather, clock);
    let mut status = ConsoleStatus::new();

    // 6. Run until Ctrl-C or the tick limit.
    let result = runner::run_cycle(
        &mut simulator,
        &mut controller,
        &config.cycle,
        &mut status,
        interrupt(),
    )
    .await?;

    match result.end_reason {
        CycleEndReason::Interrupted => println!("\nSimulation interrupted by user"),
        CycleEndReason::MaxTicksReached => println!(),
    }

    Ok(result)
}

/// Resolve on Ctrl-C.
///
/// If the signal handler cannot be installed the future never resolves and
/// the loop runs until the tick limit or a simulator error.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
