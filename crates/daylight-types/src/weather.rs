//! Atmospheric parameters of the simulated world.

use serde::{Deserialize, Serialize};

/// The full weather record of a simulator world.
///
/// The day/night cycle only writes the sun angles, cloudiness, and fog
/// density. Every other field is carried through untouched so that pushing
/// the record back to the simulator does not reset rain, wind, or wetness
/// that something else configured.
///
/// Missing fields deserialize to their [`Default`] value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherParameters {
    /// Cloud cover, 0 (clear) to 100 (overcast).
    pub cloudiness: f64,
    /// Rain intensity, 0 to 100.
    pub precipitation: f64,
    /// Puddle coverage on the road, 0 to 100.
    pub precipitation_deposits: f64,
    /// Wind strength, 0 to 100.
    pub wind_intensity: f64,
    /// Horizontal sun angle in degrees.
    pub sun_azimuth_angle: f64,
    /// Vertical sun angle in degrees; negative values are below the horizon.
    pub sun_altitude_angle: f64,
    /// Fog concentration, 0 to 100.
    pub fog_density: f64,
    /// Distance in meters at which fog starts.
    pub fog_distance: f64,
    /// Fog density falloff with altitude.
    pub fog_falloff: f64,
    /// Surface wetness, 0 to 100.
    pub wetness: f64,
    /// Light scattering intensity of the fog.
    pub scattering_intensity: f64,
    /// Mie scattering scale (large particles such as pollution).
    pub mie_scattering_scale: f64,
    /// Rayleigh scattering scale (small particles such as air molecules).
    pub rayleigh_scattering_scale: f64,
    /// Dust storm strength, 0 to 100.
    pub dust_storm: f64,
}

impl Default for WeatherParameters {
    fn default() -> Self {
        Self {
            cloudiness: 0.0,
            precipitation: 0.0,
            precipitation_deposits: 0.0,
            wind_intensity: 0.0,
            sun_azimuth_angle: 0.0,
            sun_altitude_angle: 0.0,
            fog_density: 0.0,
            fog_distance: 0.0,
            fog_falloff: 0.0,
            wetness: 0.0,
            scattering_intensity: 0.0,
            mie_scattering_scale: 0.0,
            rayleigh_scattering_scale: 0.0331,
            dust_storm: 0.0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{"cloudiness": 80.0, "fog_density": 10.0}"#;
        let weather: WeatherParameters = serde_json::from_str(json).unwrap();
        assert_eq!(weather.cloudiness, 80.0);
        assert_eq!(weather.fog_density, 10.0);
        assert_eq!(weather.precipitation, 0.0);
        assert_eq!(weather.rayleigh_scattering_scale, 0.0331);
    }

    #[test]
    fn serializes_with_snake_case_field_names() {
        let weather = WeatherParameters {
            sun_altitude_angle: 45.0,
            ..WeatherParameters::default()
        };
        let value = serde_json::to_value(&weather).unwrap();
        assert_eq!(value["sun_altitude_angle"], 45.0);
        assert!(value.get("sun_azimuth_angle").is_some());
    }
}
