//! The cooperative polling loop that keeps the simulator's weather in step
//! with the simulated clock.
//!
//! Each iteration:
//!
//! 1. waits for the next simulator frame,
//! 2. ticks the [`WeatherController`] by the frame's `delta_seconds`,
//! 3. pushes the mutated weather record back to the simulator,
//! 4. reports the tick to a [`StatusSink`],
//! 5. sleeps for the configured update interval.
//!
//! A shutdown future (Ctrl-C in the engine binary) is raced against every
//! await point. When it resolves the loop ends cleanly; the interrupt is a
//! normal end reason, not an error. Simulator failures are not retried.

use std::future::Future;
use std::io::Write as _;

use daylight_types::WeatherParameters;
use tracing::{debug, info, warn};

use crate::config::CycleConfig;
use crate::simulator::{Simulator, SimulatorError};
use crate::weather::WeatherController;

/// Errors that can occur during the cycle run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A simulator call failed.
    #[error("simulator error: {source}")]
    Simulator {
        /// The underlying simulator error.
        #[from]
        source: SimulatorError,
    },
}

/// Reason the cycle loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEndReason {
    /// The shutdown signal fired.
    Interrupted,
    /// The configured `max_ticks` limit was reached.
    MaxTicksReached,
}

/// Result of a cycle run.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleResult {
    /// Why the loop stopped.
    pub end_reason: CycleEndReason,
    /// Number of ticks that completed (weather pushed to the simulator).
    pub total_ticks: u64,
    /// Simulated hour when the loop stopped.
    pub final_hours: f64,
}

/// Receives every completed tick.
pub trait StatusSink {
    /// Called after the weather for tick number `tick` (1-based) has been
    /// pushed to the simulator.
    fn on_tick(&mut self, tick: u64, controller: &WeatherController<'_, WeatherParameters>);
}

/// A status sink that discards every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStatus;

impl StatusSink for NoOpStatus {
    fn on_tick(&mut self, _tick: u64, _controller: &WeatherController<'_, WeatherParameters>) {}
}

/// Overwrites a single console line with the sun position and clock.
///
/// Output looks like `Sun(alt: 42.10, azm: 37.50) Time: 08:30`.
#[derive(Debug, Default)]
pub struct ConsoleStatus {
    /// Set after the first failed write so the failure is logged once.
    write_failed: bool,
}

impl ConsoleStatus {
    /// Create a console status line.
    pub const fn new() -> Self {
        Self {
            write_failed: false,
        }
    }
}

impl StatusSink for ConsoleStatus {
    fn on_tick(&mut self, _tick: u64, controller: &WeatherController<'_, WeatherParameters>) {
        let mut stdout = std::io::stdout().lock();
        let written = write!(stdout, "\r{controller}").and_then(|()| stdout.flush());
        if let Err(e) = written {
            if !self.write_failed {
                warn!(error = %e, "failed to write status line");
            }
            self.write_failed = true;
        }
    }
}

/// Run the cycle loop until `shutdown` resolves or `max_ticks` is reached.
///
/// # Arguments
///
/// * `simulator` - The simulator session to read frames from and push
///   weather to.
/// * `controller` - The weather controller, already bound to the weather
///   record that gets pushed each tick.
/// * `config` - Loop pacing and bounds.
/// * `status` - Receives each completed tick.
/// * `shutdown` - Resolves when the loop should stop.
///
/// # Errors
///
/// Returns [`RunnerError::Simulator`] as soon as any simulator call fails.
pub async fn run_cycle<S, F>(
    simulator: &mut S,
    controller: &mut WeatherController<'_, WeatherParameters>,
    config: &CycleConfig,
    status: &mut dyn StatusSink,
    shutdown: F,
) -> Result<CycleResult, RunnerError>
where
    S: Simulator,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut total_ticks: u64 = 0;
    let interval = config.update_interval();

    info!(
        start_hour = controller.simulation_hours(),
        update_interval_ms = config.update_interval_ms,
        max_ticks = config.max_ticks,
        "Weather cycle starting"
    );

    let end_reason = 'cycle: loop {
        let step = async {
            let timestamp = simulator.wait_for_tick().await?;
            controller.tick(timestamp.delta_seconds);
            simulator.set_world_weather(controller.weather()).await?;
            Ok::<_, SimulatorError>(timestamp)
        };

        let timestamp = tokio::select! {
            biased;
            () = &mut shutdown => break 'cycle CycleEndReason::Interrupted,
            step = step => step?,
        };

        total_ticks = total_ticks.saturating_add(1);
        status.on_tick(total_ticks, controller);
        debug!(
            frame = timestamp.frame,
            delta_seconds = timestamp.delta_seconds,
            hours = controller.simulation_hours(),
            "tick applied"
        );

        if config.max_ticks > 0 && total_ticks >= config.max_ticks {
            break 'cycle CycleEndReason::MaxTicksReached;
        }

        if !interval.is_zero() {
            tokio::select! {
                biased;
                () = &mut shutdown => break 'cycle CycleEndReason::Interrupted,
                () = tokio::time::sleep(interval) => {}
            }
        }
    };

    Ok(CycleResult {
        end_reason,
        total_ticks,
        final_hours: controller.simulation_hours(),
    })
}

/// Log the end of a cycle run.
pub fn log_cycle_end(result: &CycleResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_hours = result.final_hours,
        "Weather cycle ended"
    );
    if result.total_ticks == 0 {
        warn!("Weather cycle ended with no ticks applied");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::future;

    use daylight_types::{Timestamp, Transform};

    use super::*;
    use crate::simulator::HeadlessWorld;
    use crate::weather::{DAY_FOG_DENSITY, NIGHT_FOG_DENSITY};

    fn unpaced(max_ticks: u64) -> CycleConfig {
        CycleConfig {
            update_interval_ms: 0,
            start_hour: 0.0,
            max_ticks,
        }
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut world = HeadlessWorld::new(1.0);
        let mut weather = world.world_weather().await.unwrap();
        let mut controller = WeatherController::new(&mut weather);

        let result = run_cycle(
            &mut world,
            &mut controller,
            &unpaced(5),
            &mut NoOpStatus,
            future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, CycleEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(world.frame(), 5);
        assert_eq!(world.weather_updates(), 5);
    }

    #[tokio::test]
    async fn sunrise_weather_reaches_the_simulator() {
        let start = WeatherParameters {
            cloudiness: 90.0,
            ..WeatherParameters::default()
        };
        let mut world = HeadlessWorld::new(36.0).with_weather(start);
        let mut weather = world.world_weather().await.unwrap();
        let mut controller = WeatherController::new(&mut weather);

        let result = run_cycle(
            &mut world,
            &mut controller,
            &unpaced(1),
            &mut NoOpStatus,
            future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(result.final_hours, 6.0);
        let pushed = world.weather();
        assert_eq!(pushed.sun_azimuth_angle, 0.0);
        assert!(pushed.sun_altitude_angle.abs() < 1e-9);
        assert_eq!(pushed.fog_density, DAY_FOG_DENSITY);
        assert_eq!(pushed.cloudiness, 0.0);
    }

    #[tokio::test]
    async fn ready_shutdown_stops_before_first_tick() {
        let mut world = HeadlessWorld::new(1.0);
        let mut weather = WeatherParameters::default();
        let mut controller = WeatherController::new(&mut weather);

        let result = run_cycle(
            &mut world,
            &mut controller,
            &unpaced(0),
            &mut NoOpStatus,
            future::ready(()),
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, CycleEndReason::Interrupted);
        assert_eq!(result.total_ticks, 0);
        assert_eq!(world.weather_updates(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_the_update_sleep() {
        let mut world = HeadlessWorld::new(6.0);
        let mut weather = WeatherParameters::default();
        let mut controller = WeatherController::new(&mut weather);
        let config = CycleConfig {
            update_interval_ms: 100,
            start_hour: 0.0,
            max_ticks: 0,
        };

        // Ticks land at t = 0, 100, 200, 300 ms; the shutdown fires mid-sleep.
        let shutdown = tokio::time::sleep(std::time::Duration::from_millis(350));
        let result = run_cycle(&mut world, &mut controller, &config, &mut NoOpStatus, shutdown)
            .await
            .unwrap();

        assert_eq!(result.end_reason, CycleEndReason::Interrupted);
        assert_eq!(result.total_ticks, 4);
        // 4 ticks of 6 s -> 4 h, still night
        assert_eq!(result.final_hours, 4.0);
        assert_eq!(world.weather().fog_density, NIGHT_FOG_DENSITY);
    }

    #[tokio::test]
    async fn status_sink_sees_every_tick() {
        struct Recorder {
            ticks: Vec<u64>,
            lines: Vec<String>,
        }
        impl StatusSink for Recorder {
            fn on_tick(&mut self, tick: u64, controller: &WeatherController<'_, WeatherParameters>) {
                self.ticks.push(tick);
                self.lines.push(controller.to_string());
            }
        }

        let mut world = HeadlessWorld::new(36.0);
        let mut weather = WeatherParameters::default();
        let mut controller = WeatherController::new(&mut weather);
        let mut recorder = Recorder {
            ticks: Vec::new(),
            lines: Vec::new(),
        };

        let _ = run_cycle(
            &mut world,
            &mut controller,
            &unpaced(2),
            &mut recorder,
            future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(recorder.ticks, vec![1, 2]);
        assert_eq!(
            recorder.lines.first().map(String::as_str),
            Some("Sun(alt: 0.00, azm: 0.00) Time: 06:00")
        );
        assert_eq!(
            recorder.lines.get(1).map(String::as_str),
            Some("Sun(alt: 70.00, azm: 90.00) Time: 12:00")
        );
    }

    /// A simulator whose frames fail after a set number of successes.
    struct FailingSimulator {
        frames_left: u32,
    }

    impl Simulator for FailingSimulator {
        async fn world_weather(&mut self) -> Result<WeatherParameters, SimulatorError> {
            Ok(WeatherParameters::default())
        }

        async fn set_world_weather(&mut self, _weather: &WeatherParameters) -> Result<(), SimulatorError> {
            Ok(())
        }

        async fn spectator_transform(&mut self) -> Result<Transform, SimulatorError> {
            Ok(Transform::default())
        }

        async fn set_spectator_transform(&mut self, _transform: &Transform) -> Result<(), SimulatorError> {
            Ok(())
        }

        async fn wait_for_tick(&mut self) -> Result<Timestamp, SimulatorError> {
            if self.frames_left == 0 {
                return Err(SimulatorError::Closed);
            }
            self.frames_left = self.frames_left.saturating_sub(1);
            Ok(Timestamp {
                delta_seconds: 1.0,
                ..Timestamp::default()
            })
        }
    }

    #[tokio::test]
    async fn simulator_failure_propagates() {
        let mut sim = FailingSimulator { frames_left: 2 };
        let mut weather = WeatherParameters::default();
        let mut controller = WeatherController::new(&mut weather);

        let result = run_cycle(
            &mut sim,
            &mut controller,
            &unpaced(0),
            &mut NoOpStatus,
            future::pending(),
        )
        .await;

        assert!(matches!(
            result,
            Err(RunnerError::Simulator {
                source: SimulatorError::Closed
            })
        ));
    }
}
