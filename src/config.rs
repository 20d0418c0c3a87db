//! Locomotion tunables, loadable from TOML.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::AnimationSet;

/// Tunables for one locomotion controller.
///
/// Every field has a default, so a TOML file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Rate at which the character turns to face its movement direction.
    pub rotation_interp_speed: f32,
    /// Base rate of the continuous movement-angle smoothing.
    pub continuous_rotation_speed: f32,

    /// Look yaw rate in degrees per second at full stick.
    pub base_turn_rate: f32,
    pub base_look_up_rate: f32,
    pub pitch_limit: f32,

    /// Minimum upward velocity applied when a jump starts.
    pub jump_impulse: f32,
    /// Seconds in Jump before the fall clip starts if no apex was seen.
    pub apex_timeout: f32,
    /// Landing hands over to Idle this many seconds before its clip ends.
    pub landing_lead_time: f32,

    pub input_deadzone: f32,
    pub angle_snap_threshold: f32,
    pub angle_settle_threshold: f32,
    pub angle_catch_up_gain: f32,
    pub min_move_intensity: f32,

    pub clips: AnimationSet,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 200.0,
            run_speed: 600.0,
            rotation_interp_speed: 13.0,
            continuous_rotation_speed: 8.0,

            base_turn_rate: 45.0,
            base_look_up_rate: 45.0,
            pitch_limit: 89.0,

            jump_impulse: 300.0,
            apex_timeout: 1.0,
            landing_lead_time: 0.05,

            input_deadzone: 0.01,
            angle_snap_threshold: 0.4,
            angle_settle_threshold: 1.5,
            angle_catch_up_gain: 1.05,
            min_move_intensity: 0.1,

            clips: AnimationSet::default(),
        }
    }
}

impl LocomotionConfig {
    /// Defaults rescaled for worlds measured in meters, like avian3d scenes.
    /// The plain defaults use centimeters.
    pub fn meters() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 6.0,
            jump_impulse: 5.0,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClipId;

    #[test]
    fn empty_config_uses_defaults() {
        let config = LocomotionConfig::from_toml_str("").unwrap();
        assert_eq!(config, LocomotionConfig::default());
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let toml = r#"
            walk_speed = 3.0
            run_speed = 7.5
            apex_timeout = 0.75

            [clips]
            idle = "idle_loop"
            landing = "land"
        "#;
        let config = LocomotionConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.walk_speed, 3.0);
        assert_eq!(config.run_speed, 7.5);
        assert_eq!(config.apex_timeout, 0.75);
        assert_eq!(config.rotation_interp_speed, 13.0);
        assert_eq!(config.clips.idle, Some(ClipId::from("idle_loop")));
        assert_eq!(config.clips.landing, Some(ClipId::from("land")));
        assert!(config.clips.walk.is_none());
    }

    #[test]
    fn meters_only_rescales_distances() {
        let meters = LocomotionConfig::meters();
        let default = LocomotionConfig::default();
        assert_eq!(meters.walk_speed * 100.0, default.walk_speed);
        assert_eq!(meters.run_speed * 100.0, default.run_speed);
        assert!(meters.jump_impulse < 10.0);
        assert_eq!(meters.apex_timeout, default.apex_timeout);
        assert_eq!(meters.rotation_interp_speed, default.rotation_interp_speed);
    }

    #[test]
    fn bad_types_are_rejected() {
        assert!(LocomotionConfig::from_toml_str("walk_speed = \"fast\"").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("does/not/exist/locomotion.toml");
        let err = LocomotionConfig::from_file(path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("locomotion.toml"));
    }
}
