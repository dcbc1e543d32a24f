//! Position and orientation of actors in the simulated world.

use serde::{Deserialize, Serialize};

/// A point in world space, in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Forward axis.
    pub x: f64,
    /// Right axis.
    pub y: f64,
    /// Up axis.
    pub z: f64,
}

impl Location {
    /// Create a location from its three coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// An orientation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotation {
    /// Rotation about the right axis; negative looks down.
    pub pitch: f64,
    /// Rotation about the up axis.
    pub yaw: f64,
    /// Rotation about the forward axis.
    pub roll: f64,
}

impl Rotation {
    /// Create a rotation from pitch, yaw, and roll.
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Location plus rotation, as used for the spectator camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Where the actor is.
    pub location: Location,
    /// Which way the actor faces.
    pub rotation: Rotation,
}

impl Transform {
    /// Create a transform from a location and rotation.
    pub const fn new(location: Location, rotation: Rotation) -> Self {
        Self { location, rotation }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn transform_round_trips_through_json() {
        let transform = Transform::new(Location::new(0.0, 0.0, 50.0), Rotation::new(-60.0, 0.0, 0.0));
        let json = serde_json::to_string(&transform).unwrap();
        let back: Transform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, transform);
    }

    #[test]
    fn missing_rotation_defaults_to_zero() {
        let json = r#"{"location": {"x": 1.0, "y": 2.0, "z": 3.0}}"#;
        let transform: Transform = serde_json::from_str(json).unwrap();
        assert_eq!(transform.location, Location::new(1.0, 2.0, 3.0));
        assert_eq!(transform.rotation, Rotation::default());
    }
}
