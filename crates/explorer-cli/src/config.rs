//! Configuration – reads `~/.explorer/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use explorer_perception::MapperConfig;
use explorer_runtime::NavigationConfig;
use explorer_types::ExplorerError;
use serde::{Deserialize, Serialize};

/// Loop pacing and simulated-device settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Control-loop frequency.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f32,

    /// Resolution of the simulated cameras.
    #[serde(default = "default_camera_width")]
    pub camera_width: u32,
    #[serde(default = "default_camera_height")]
    pub camera_height: u32,

    /// Wheel separation of the simulated differential base, in metres.
    #[serde(default = "default_track_width")]
    pub track_width: f32,
}

fn default_tick_hz() -> f32 {
    10.0
}
fn default_camera_width() -> u32 {
    640
}
fn default_camera_height() -> u32 {
    480
}
fn default_track_width() -> f32 {
    0.3
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            camera_width: default_camera_width(),
            camera_height: default_camera_height(),
            track_width: default_track_width(),
        }
    }
}

impl RuntimeConfig {
    /// Time between ticks.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::Config`] when `tick_hz` is not positive or so small
    /// that the period does not fit a [`Duration`].
    pub fn tick_period(&self) -> Result<Duration, ExplorerError> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(ExplorerError::Config(format!(
                "runtime.tick_hz must be positive, got {}",
                self.tick_hz
            )));
        }
        Duration::try_from_secs_f32(1.0 / self.tick_hz).map_err(|e| {
            ExplorerError::Config(format!("runtime.tick_hz {} is out of range: {e}", self.tick_hz))
        })
    }
}

/// Persisted configuration stored in `~/.explorer/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mapper: MapperConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Config {
    /// # Errors
    ///
    /// [`ExplorerError::Config`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ExplorerError> {
        self.mapper.validate()?;
        self.navigation.validate()?;
        self.runtime.tick_period()?;
        if !(self.runtime.track_width.is_finite() && self.runtime.track_width > 0.0) {
            return Err(ExplorerError::Config(format!(
                "runtime.track_width must be positive, got {}",
                self.runtime.track_width
            )));
        }
        if self.runtime.camera_width == 0 || self.runtime.camera_height == 0 {
            return Err(ExplorerError::Config(
                "runtime camera resolution must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Return the path to `~/.explorer/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".explorer").join("config.toml")
}

/// Load the effective config: the file at `path` (defaults when absent)
/// with environment overrides applied.  The flag tells whether the file
/// existed.
pub fn load(path: &Path) -> Result<(Config, bool), String> {
    let loaded = load_from(path)?;
    let found = loaded.is_some();
    let mut cfg = loaded.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok((cfg, found))
}

/// Load the config file at `path`.  Returns `None` if it does not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    toml::from_str(&raw)
        .map(Some)
        .map_err(|e| format!("Failed to parse config at {}: {}", path.display(), e))
}

/// Apply `EXPLORER_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `EXPLORER_ARRIVAL_THRESHOLD` | `navigation.arrival_threshold` |
/// | `EXPLORER_FORWARD_SPEED` | `navigation.forward_speed` |
/// | `EXPLORER_TICK_HZ` | `runtime.tick_hz` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("EXPLORER_ARRIVAL_THRESHOLD")
        && let Ok(t) = v.trim().parse::<f32>()
    {
        cfg.navigation.arrival_threshold = t;
    }
    if let Ok(v) = std::env::var("EXPLORER_FORWARD_SPEED")
        && let Ok(s) = v.trim().parse::<f32>()
    {
        cfg.navigation.forward_speed = s;
    }
    if let Ok(v) = std::env::var("EXPLORER_TICK_HZ")
        && let Ok(hz) = v.trim().parse::<f32>()
    {
        cfg.runtime.tick_hz = hz;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_perception::mapper::OutputFrame;
    use explorer_runtime::SteeringLaw;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn config_path_points_to_explorer_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".explorer"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn empty_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let cfg = load_from(&write(&dir, "")).unwrap().unwrap();
        assert_eq!(cfg.mapper, MapperConfig::default());
        assert!((cfg.navigation.arrival_threshold - 0.2).abs() < 1e-6);
        assert!((cfg.navigation.forward_speed - 0.1).abs() < 1e-6);
        assert!((cfg.runtime.tick_hz - 10.0).abs() < 1e-6);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn sections_are_parsed() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write(
            &dir,
            r#"
            [mapper]
            assumed_depth = 3.5
            vertical_scale = 0.5
            frame = "world"

            [navigation]
            forward_speed = 0.25
            steering = { law = "straight_line" }

            [runtime]
            tick_hz = 20.0
            "#,
        );
        let cfg = load_from(&path).unwrap().unwrap();
        assert!((cfg.mapper.assumed_depth - 3.5).abs() < 1e-6);
        assert_eq!(cfg.mapper.vertical_scale, Some(0.5));
        assert_eq!(cfg.mapper.frame, OutputFrame::World);
        assert!((cfg.navigation.forward_speed - 0.25).abs() < 1e-6);
        assert_eq!(cfg.navigation.steering, SteeringLaw::StraightLine);
        assert!((cfg.runtime.tick_hz - 20.0).abs() < 1e-6);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let err = load_from(&write(&dir, "[navigation\nforward_speed = ")).unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.mapper.assumed_depth = 0.0;
        assert!(matches!(cfg.validate(), Err(ExplorerError::Config(_))));

        let mut cfg = Config::default();
        cfg.runtime.tick_hz = 0.0;
        assert!(matches!(cfg.validate(), Err(ExplorerError::Config(m)) if m.contains("tick_hz")));

        let mut cfg = Config::default();
        cfg.navigation.forward_speed = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.runtime.track_width = 0.0;
        assert!(matches!(cfg.validate(), Err(ExplorerError::Config(m)) if m.contains("track_width")));
    }

    #[test]
    fn tiny_tick_rate_is_rejected_not_a_panic() {
        let mut cfg = Config::default();
        cfg.runtime.tick_hz = 1e-20;
        assert!(matches!(cfg.validate(), Err(ExplorerError::Config(m)) if m.contains("out of range")));
        assert!(cfg.runtime.tick_period().is_err());
    }

    #[test]
    fn tick_period_follows_rate() {
        let runtime = RuntimeConfig {
            tick_hz: 20.0,
            ..RuntimeConfig::default()
        };
        let period = runtime.tick_period().unwrap();
        assert!((period.as_secs_f64() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn apply_env_overrides_changes_navigation() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe {
            std::env::set_var("EXPLORER_ARRIVAL_THRESHOLD", "0.5");
            std::env::set_var("EXPLORER_FORWARD_SPEED", "0.3");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.navigation.arrival_threshold - 0.5).abs() < 1e-6);
        assert!((cfg.navigation.forward_speed - 0.3).abs() < 1e-6);
        unsafe {
            std::env::remove_var("EXPLORER_ARRIVAL_THRESHOLD");
            std::env::remove_var("EXPLORER_FORWARD_SPEED");
        }
    }

    #[test]
    fn load_falls_back_to_defaults_and_applies_overrides() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let missing = dir.path().join("missing.toml");

        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("EXPLORER_TICK_HZ", "fast") };
        let (cfg, found) = load(&missing).unwrap();
        assert!(!found);
        assert!((cfg.runtime.tick_hz - 10.0).abs() < 1e-6);

        unsafe { std::env::set_var("EXPLORER_TICK_HZ", "25") };
        let (cfg, _) = load(&missing).unwrap();
        assert!((cfg.runtime.tick_hz - 25.0).abs() < 1e-6);
        unsafe { std::env::remove_var("EXPLORER_TICK_HZ") };
    }
}
