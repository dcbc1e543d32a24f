//! Frame timing reported by the simulator.

use serde::{Deserialize, Serialize};

/// Timing information for one simulator frame.
///
/// Returned by the blocking "wait for next tick" call. The day/night cycle
/// only consumes [`delta_seconds`](Self::delta_seconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timestamp {
    /// Frame number since the simulator started.
    pub frame: u64,
    /// Simulated seconds since the episode started.
    pub elapsed_seconds: f64,
    /// Simulated seconds since the previous frame.
    pub delta_seconds: f64,
    /// Wall-clock time of the frame on the simulator host, in seconds.
    pub platform_timestamp: f64,
}
