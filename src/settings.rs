//! Settings with persistence
//!
//! Settings are saved to `~/.config/sonance/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sonance_audio::{AudioConfig, ServiceRole};
use sonance_core::TimeConfig;
use tracing::{info, warn};

/// All settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub run: RunSettings,
    pub time: TimeConfig,
    pub audio: AudioConfig,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sonance"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from a specific file, or return defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        // Create config directory if it doesn't exist
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let path = dir.join("settings.toml");
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// How the binary runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Play sounds locally, or only produce messages for clients
    pub role: ServiceRole,
    /// Never open an output device
    pub headless: bool,
    /// Simulated frames spent at each walkthrough station
    pub frames_per_station: u32,
    /// Write the effective settings back to disk on exit
    pub save_on_exit: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            role: ServiceRole::Client,
            headless: false,
            frames_per_station: 30,
            save_on_exit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [run]
            role = "server"

            [audio]
            master_volume = 0.5

            [audio.steal]
            steal_max = 2
            "#,
        )
        .unwrap();

        assert_eq!(settings.run.role, ServiceRole::Server);
        assert_eq!(settings.run.frames_per_station, 30);
        assert!((settings.audio.master_volume - 0.5).abs() < f32::EPSILON);
        assert_eq!(settings.audio.steal.steal_max, 2);
        assert!((settings.audio.steal.steal_length - 0.8).abs() < f32::EPSILON);
        assert!((settings.audio.classifier.sky_factor - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn defaults_survive_toml() {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        let settings: Settings = toml::from_str(&text).unwrap();
        assert_eq!(settings.run.role, ServiceRole::Client);
        assert_eq!(settings.audio.probe.floor_offset, 128.0);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/sonance/settings.toml"));
        assert!(!settings.run.headless);
    }
}
