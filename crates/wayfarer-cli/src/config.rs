//! Configuration Vault – reads/writes `~/.wayfarer/config.toml`.
//!
//! The file holds the mission parameters under `[mission]` and the simulated
//! hardware under `[sim]`.  Every field is optional; missing fields take
//! their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use wayfarer_types::MissionConfig;

/// One scripted range reading for the simulated scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimReading {
    /// Commanded servo angle, servo offset included.
    pub angle: i32,
    pub distance: i32,
}

/// Simulated hardware settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Classifier call (1-based) on which the simulated camera "sees" the
    /// hazard label.  `None` means the road stays clear.
    pub hazard_frame: Option<u32>,
    /// Spend real time on drive primitives instead of only recording them.
    pub realtime: bool,
    /// Range readings returned by the simulated scanner; every other angle
    /// reads as "no echo".
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub readings: Vec<SimReading>,
}

/// Persisted CLI configuration stored in `~/.wayfarer/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mission: MissionConfig,
    pub sim: SimConfig,
}

/// Return the path to `~/.wayfarer/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".wayfarer").join("config.toml")
}

/// Load the config from `path`, falling back to defaults when the file does
/// not exist.  Environment overrides are applied either way.
pub fn load_or_default(path: &Path) -> Result<Config, String> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does
/// not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| format!("Failed to parse config at {}: {}", path.display(), e))?;
    Ok(Some(cfg))
}

/// Apply `WAYFARER_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `WAYFARER_GRID_SIZE` | `mission.grid_size` |
/// | `WAYFARER_HAZARD_LABEL` | `mission.perception.hazard_label` |
/// | `WAYFARER_COOLDOWN_MS` | `mission.drive.hazard_cooldown_ms` |
/// | `WAYFARER_SIM_HAZARD_FRAME` | `sim.hazard_frame` |
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("WAYFARER_GRID_SIZE")
        && let Ok(size) = v.trim().parse::<u32>()
    {
        cfg.mission.grid_size = size;
    }
    if let Ok(v) = std::env::var("WAYFARER_HAZARD_LABEL") {
        cfg.mission.perception.hazard_label = v;
    }
    if let Ok(v) = std::env::var("WAYFARER_COOLDOWN_MS")
        && let Ok(ms) = v.trim().parse::<u64>()
    {
        cfg.mission.drive.hazard_cooldown_ms = ms;
    }
    if let Ok(v) = std::env::var("WAYFARER_SIM_HAZARD_FRAME")
        && let Ok(frame) = v.trim().parse::<u32>()
    {
        cfg.sim.hazard_frame = Some(frame);
    }
}

/// Save the config to a specific path, creating parent directories.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_types::{GridCell, Heading};

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.mission.grid_size, 11);
        assert_eq!(loaded.mission.perception.hazard_label, "stop sign");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("mission.toml");
        std::fs::write(
            &path,
            r#"
[mission]
grid_size = 5
start = { x = 2, y = 0 }

[mission.drive]
initial_heading = "east"

[sim]
hazard_frame = 4
readings = [{ angle = -5, distance = 25 }]
"#,
        )
        .expect("write");

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.mission.grid_size, 5);
        assert_eq!(cfg.mission.start(), GridCell::new(2, 0));
        assert_eq!(cfg.mission.goal(), GridCell::new(4, 4));
        assert_eq!(cfg.mission.drive.initial_heading, Heading::East);
        assert_eq!(cfg.mission.drive.forward_speed, 8);
        assert_eq!(cfg.sim.hazard_frame, Some(4));
        assert_eq!(
            cfg.sim.readings,
            vec![SimReading {
                angle: -5,
                distance: 25
            }]
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[mission\ngrid_size = ").expect("write");
        let err = load_from(&path).unwrap_err();
        assert!(err.contains("Failed to parse config"));
    }

    #[test]
    fn config_path_points_to_wayfarer_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".wayfarer"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    // All environment-variable cases share one test so that parallel test
    // threads never observe each other's variables.
    #[test]
    fn apply_env_overrides_updates_mission_and_sim() {
        // SAFETY: no other test in this crate reads these variables.
        unsafe {
            std::env::set_var("WAYFARER_GRID_SIZE", "7");
            std::env::set_var("WAYFARER_HAZARD_LABEL", "yield sign");
            std::env::set_var("WAYFARER_COOLDOWN_MS", "not-a-number");
            std::env::set_var("WAYFARER_SIM_HAZARD_FRAME", "12");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        unsafe {
            std::env::remove_var("WAYFARER_GRID_SIZE");
            std::env::remove_var("WAYFARER_HAZARD_LABEL");
            std::env::remove_var("WAYFARER_COOLDOWN_MS");
            std::env::remove_var("WAYFARER_SIM_HAZARD_FRAME");
        }

        assert_eq!(cfg.mission.grid_size, 7);
        assert_eq!(cfg.mission.goal(), GridCell::new(6, 6));
        assert_eq!(cfg.mission.perception.hazard_label, "yield sign");
        assert_eq!(cfg.mission.drive.hazard_cooldown_ms, 3000);
        assert_eq!(cfg.sim.hazard_frame, Some(12));
    }
}
