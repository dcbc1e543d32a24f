//! End-to-end day/night cycle runs against the in-process headless world.
//!
//! These drive the public API only: config, headless simulator, controller,
//! and runner, the same way the engine binary wires them together.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::future;

use daylight_core::config::{CycleConfig, DaylightConfig};
use daylight_core::runner::{self, CycleEndReason, NoOpStatus, StatusSink};
use daylight_core::simulator::{self, HeadlessWorld};
use daylight_core::sun::{self, NIGHT_ALTITUDE};
use daylight_core::weather::{DAY_FOG_DENSITY, NIGHT_FOG_DENSITY};
use daylight_core::{SimulatedClock, Simulator, WeatherController};
use daylight_types::WeatherParameters;

/// Records the simulated hour and the pushed fog/altitude of every tick.
#[derive(Default)]
struct Trace {
    samples: Vec<(f64, f64, f64)>,
}

impl StatusSink for Trace {
    fn on_tick(&mut self, _tick: u64, controller: &WeatherController<'_, WeatherParameters>) {
        let weather = controller.weather();
        self.samples.push((
            controller.simulation_hours(),
            weather.fog_density,
            weather.sun_altitude_angle,
        ));
    }
}

fn unpaced(max_ticks: u64) -> CycleConfig {
    CycleConfig {
        update_interval_ms: 0,
        start_hour: 0.0,
        max_ticks,
    }
}

#[tokio::test]
async fn full_day_returns_to_midnight() {
    // 12 frames of 12 s = 144 s = one simulated day.
    let mut world = HeadlessWorld::new(12.0);
    let mut weather = world.world_weather().await.unwrap();
    let mut controller = WeatherController::new(&mut weather);
    let mut trace = Trace::default();

    let result = runner::run_cycle(
        &mut world,
        &mut controller,
        &unpaced(12),
        &mut trace,
        future::pending(),
    )
    .await
    .unwrap();

    assert_eq!(result.end_reason, CycleEndReason::MaxTicksReached);
    assert_eq!(result.final_hours, 0.0);
    assert_eq!(trace.samples.len(), 12);
    assert_eq!(world.weather().fog_density, NIGHT_FOG_DENSITY);
    assert_eq!(world.weather().sun_altitude_angle, NIGHT_ALTITUDE);
}

#[tokio::test]
async fn fog_and_altitude_follow_daylight_all_day() {
    let mut world = HeadlessWorld::new(1.5);
    let mut weather = WeatherParameters::default();
    let mut controller = WeatherController::new(&mut weather);
    let mut trace = Trace::default();

    // 96 frames of 1.5 s = 144 s.
    let _ = runner::run_cycle(
        &mut world,
        &mut controller,
        &unpaced(96),
        &mut trace,
        future::pending(),
    )
    .await
    .unwrap();

    for (hours, fog, altitude) in trace.samples {
        assert!((0.0..24.0).contains(&hours), "hours = {hours}");
        if sun::is_daytime(hours) {
            assert_eq!(fog, DAY_FOG_DENSITY, "hour {hours}");
            assert!((-70.0..=70.0).contains(&altitude), "hour {hours}");
        } else {
            assert_eq!(fog, NIGHT_FOG_DENSITY, "hour {hours}");
            assert_eq!(altitude, NIGHT_ALTITUDE, "hour {hours}");
        }
    }
}

#[tokio::test]
async fn configured_start_hour_and_spectator_are_applied() {
    let config = DaylightConfig::parse(
        "cycle:\n  start_hour: 11.0\n  update_interval_ms: 0\n  max_ticks: 1\nspectator:\n  z: 120.0\n",
    )
    .unwrap();

    let mut world = HeadlessWorld::new(6.0);
    simulator::place_spectator(&mut world, config.spectator.location(), config.spectator.rotation())
        .await
        .unwrap();
    assert_eq!(world.spectator().location.z, 120.0);
    assert_eq!(world.spectator().rotation.pitch, -60.0);

    let mut weather = world.world_weather().await.unwrap();
    let clock = SimulatedClock::starting_at(config.cycle.start_hour);
    let mut controller = WeatherController::with_clock(&mut weather, clock);

    let result = runner::run_cycle(
        &mut world,
        &mut controller,
        &config.cycle,
        &mut NoOpStatus,
        future::pending(),
    )
    .await
    .unwrap();

    // 11:00 + 6 s (one hour) = noon
    assert_eq!(result.final_hours, 12.0);
    assert!((world.weather().sun_altitude_angle - 70.0).abs() < 1e-9);
}
