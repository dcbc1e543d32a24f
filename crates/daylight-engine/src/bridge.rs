//! TCP session with a running driving simulator.
//!
//! The simulator side exposes a line-oriented JSON bridge: each request is
//! one JSON object terminated by `\n`, and each is answered by exactly one
//! JSON line.
//!
//! ```text
//! -> {"method":"wait_for_tick","params":null}
//! <- {"result":{"frame":812,"elapsed_seconds":40.6,"delta_seconds":0.05,"platform_timestamp":1712.3}}
//! -> {"method":"set_weather","params":{"cloudiness":0.0, ...}}
//! <- {"result":null}
//! <- {"error":"world not loaded"}
//! ```
//!
//! Connecting and every request share one timeout. There is no retry or
//! reconnection: any failure ends the session.

use std::time::Duration;

use daylight_core::{Simulator, SimulatorError};
use daylight_types::{Timestamp, Transform, WeatherParameters};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info};

/// Bridge method names.
mod method {
    pub const GET_WEATHER: &str = "get_weather";
    pub const SET_WEATHER: &str = "set_weather";
    pub const GET_SPECTATOR_TRANSFORM: &str = "get_spectator_transform";
    pub const SET_SPECTATOR_TRANSFORM: &str = "set_spectator_transform";
    pub const WAIT_FOR_TICK: &str = "wait_for_tick";
}

/// One request line.
#[derive(Debug, Serialize)]
struct Request<'a, P: Serialize> {
    method: &'a str,
    params: Option<&'a P>,
}

/// One response line: either `result` or `error` is meaningful.
#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

/// A simulator session over the JSON line bridge.
#[derive(Debug)]
pub struct BridgeSimulator {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    timeout: Duration,
    line: String,
}

impl BridgeSimulator {
    /// Connect to the bridge at `host:port` within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulatorError::Timeout`] if the connection is not
    /// established in time, or [`SimulatorError::Connect`] if it is refused.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, SimulatorError> {
        let address = format!("{host}:{port}");
        info!(address = %address, timeout_ms = timeout.as_millis(), "Connecting to simulator");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(&address))
            .await
            .map_err(|_elapsed| SimulatorError::Timeout {
                operation: "connect".to_owned(),
                timeout_ms: millis(timeout),
            })?
            .map_err(|source| SimulatorError::Connect {
                address: address.clone(),
                source,
            })?;
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();
        info!(address = %address, "Simulator connected");
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            timeout,
            line: String::new(),
        })
    }

    /// Send one request and decode its result, bounded by the session timeout.
    async fn call<P, R>(&mut self, method: &str, params: Option<&P>) -> Result<R, SimulatorError>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let timeout = self.timeout;
        let response = tokio::time::timeout(timeout, self.exchange(method, params))
            .await
            .map_err(|_elapsed| SimulatorError::Timeout {
                operation: method.to_owned(),
                timeout_ms: millis(timeout),
            })??;

        if let Some(message) = response.error {
            return Err(SimulatorError::Remote {
                method: method.to_owned(),
                message,
            });
        }
        serde_json::from_value(response.result).map_err(|e| SimulatorError::Protocol {
            message: format!("bad result for {method}: {e}"),
        })
    }

    /// Write a request line and read the response line.
    async fn exchange<P>(&mut self, method: &str, params: Option<&P>) -> Result<Response, SimulatorError>
    where
        P: Serialize + Sync,
    {
        let request = Request { method, params };
        let mut payload = serde_json::to_vec(&request).map_err(|e| SimulatorError::Protocol {
            message: format!("failed to encode {method}: {e}"),
        })?;
        payload.push(b'\n');

        debug!(method, bytes = payload.len(), "bridge request");
        self.writer.write_all(&payload).await?;
        self.writer.flush().await?;

        self.line.clear();
        let read = self.reader.read_line(&mut self.line).await?;
        if read == 0 {
            return Err(SimulatorError::Closed);
        }
        debug!(method, bytes = read, "bridge response");

        serde_json::from_str(self.line.trim_end()).map_err(|e| SimulatorError::Protocol {
            message: format!("malformed response to {method}: {e}"),
        })
    }
}

/// Convert a timeout to whole milliseconds for error reporting.
fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

impl Simulator for BridgeSimulator {
    async fn world_weather(&mut self) -> Result<WeatherParameters, SimulatorError> {
        self.call::<(), _>(method::GET_WEATHER, None).await
    }

    async fn set_world_weather(&mut self, weather: &WeatherParameters) -> Result<(), SimulatorError> {
        self.call(method::SET_WEATHER, Some(weather)).await
    }

    async fn spectator_transform(&mut self) -> Result<Transform, SimulatorError> {
        self.call::<(), _>(method::GET_SPECTATOR_TRANSFORM, None).await
    }

    async fn set_spectator_transform(&mut self, transform: &Transform) -> Result<(), SimulatorError> {
        self.call(method::SET_SPECTATOR_TRANSFORM, Some(transform)).await
    }

    async fn wait_for_tick(&mut self) -> Result<Timestamp, SimulatorError> {
        self.call::<(), _>(method::WAIT_FOR_TICK, None).await
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use serde_json::{Value, json};
    use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Serve one connection, answering each request line with `respond`.
    /// Returns every request the server received.
    async fn serve<F>(respond: F) -> (u16, JoinHandle<Vec<Value>>)
    where
        F: Fn(&Value) -> Option<Value> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();
            let mut seen = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                let request: Value = serde_json::from_str(&line).unwrap();
                let reply = respond(&request);
                seen.push(request);
                let Some(reply) = reply else { break };
                let mut out = serde_json::to_vec(&reply).unwrap();
                out.push(b'\n');
                write_half.write_all(&out).await.unwrap();
            }
            seen
        });
        (port, handle)
    }

    #[tokio::test]
    async fn fetches_weather_and_pushes_it_back() {
        let (port, server) = serve(|request| match request["method"].as_str() {
            Some("get_weather") => Some(json!({"result": {"cloudiness": 75.0, "fog_density": 5.0}})),
            Some("set_weather") => Some(json!({"result": null})),
            _ => Some(json!({"error": "unexpected"})),
        })
        .await;

        let mut sim = BridgeSimulator::connect("127.0.0.1", port, TEST_TIMEOUT).await.unwrap();
        let mut weather = sim.world_weather().await.unwrap();
        assert_eq!(weather.cloudiness, 75.0);
        assert_eq!(weather.fog_density, 5.0);

        weather.sun_altitude_angle = 42.0;
        sim.set_world_weather(&weather).await.unwrap();
        drop(sim);

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0]["method"], "get_weather");
        assert_eq!(seen[0]["params"], Value::Null);
        assert_eq!(seen[1]["method"], "set_weather");
        assert_eq!(seen[1]["params"]["sun_altitude_angle"], 42.0);
    }

    #[tokio::test]
    async fn wait_for_tick_decodes_timestamp() {
        let (port, _server) = serve(|_| {
            Some(json!({"result": {
                "frame": 812,
                "elapsed_seconds": 40.6,
                "delta_seconds": 0.05,
                "platform_timestamp": 1712.3
            }}))
        })
        .await;

        let mut sim = BridgeSimulator::connect("127.0.0.1", port, TEST_TIMEOUT).await.unwrap();
        let timestamp = sim.wait_for_tick().await.unwrap();
        assert_eq!(timestamp.frame, 812);
        assert_eq!(timestamp.delta_seconds, 0.05);
    }

    #[tokio::test]
    async fn spectator_transform_round_trips() {
        let (port, server) = serve(|request| match request["method"].as_str() {
            Some("get_spectator_transform") => Some(json!({"result": {
                "location": {"x": 3.0, "y": 4.0, "z": 5.0},
                "rotation": {"pitch": 0.0, "yaw": 180.0, "roll": 0.0}
            }})),
            _ => Some(json!({"result": null})),
        })
        .await;

        let mut sim = BridgeSimulator::connect("127.0.0.1", port, TEST_TIMEOUT).await.unwrap();
        let placed = daylight_core::simulator::place_spectator(
            &mut sim,
            daylight_types::Location::new(0.0, 0.0, 50.0),
            daylight_types::Rotation::new(-60.0, 0.0, 0.0),
        )
        .await
        .unwrap();
        assert_eq!(placed.location.z, 50.0);
        drop(sim);

        let seen = server.await.unwrap();
        assert_eq!(seen[1]["method"], "set_spectator_transform");
        assert_eq!(seen[1]["params"]["rotation"]["pitch"], -60.0);
    }

    #[tokio::test]
    async fn remote_error_is_surfaced() {
        let (port, _server) = serve(|_| Some(json!({"error": "world not loaded"}))).await;

        let mut sim = BridgeSimulator::connect("127.0.0.1", port, TEST_TIMEOUT).await.unwrap();
        let err = sim.world_weather().await.unwrap_err();
        match err {
            SimulatorError::Remote { method, message } => {
                assert_eq!(method, "get_weather");
                assert_eq!(message, "world not loaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_result_is_a_protocol_error() {
        let (port, _server) = serve(|_| Some(json!({"result": "sunny"}))).await;

        let mut sim = BridgeSimulator::connect("127.0.0.1", port, TEST_TIMEOUT).await.unwrap();
        let err = sim.wait_for_tick().await.unwrap_err();
        assert!(matches!(err, SimulatorError::Protocol { .. }), "{err}");
    }

    #[tokio::test]
    async fn closed_connection_is_reported() {
        // Reply to nothing: the server hangs up after the first request.
        let (port, _server) = serve(|_| None).await;

        let mut sim = BridgeSimulator::connect("127.0.0.1", port, TEST_TIMEOUT).await.unwrap();
        let err = sim.wait_for_tick().await.unwrap_err();
        assert!(matches!(err, SimulatorError::Closed), "{err}");
    }

    #[tokio::test]
    async fn silent_simulator_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept and hold the connection open without ever answering.
        let _server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(stream);
        });

        let mut sim = BridgeSimulator::connect("127.0.0.1", port, Duration::from_millis(100))
            .await
            .unwrap();
        let err = sim.wait_for_tick().await.unwrap_err();
        match err {
            SimulatorError::Timeout { operation, timeout_ms } => {
                assert_eq!(operation, "wait_for_tick");
                assert_eq!(timeout_ms, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = BridgeSimulator::connect("127.0.0.1", port, TEST_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, SimulatorError::Connect { .. }), "{err}");
    }
}
