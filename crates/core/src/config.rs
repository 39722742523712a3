use daw_timeline::{SnapMode, TimelinePosition, TimelineSettings, TimelineSpan};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid time signature {beats}/{note_value}")]
    InvalidTimeSignature { beats: u32, note_value: u32 },

    #[error("Tempo must be positive, got {0}")]
    InvalidTempo(f64),

    #[error("Horizontal scale must be positive, got {0}")]
    InvalidScale(f64),

    #[error("No config directory on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// A zero grid turns snapping off.
    pub grid: TimelineSpan,
    pub mode: SnapMode,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            grid: TimelineSpan::beats(1),
            mode: SnapMode::Round,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub timeline: TimelineSettings,
    pub snap: SnapConfig,
}

impl EditorConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("daw").join("timeline.toml"))
    }

    /// Loads the user config, falling back to defaults when it is missing or
    /// unusable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Ignoring config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ts = self.timeline.time_signature;
        if !ts.is_valid() {
            return Err(ConfigError::InvalidTimeSignature {
                beats: ts.beats,
                note_value: ts.note_value,
            });
        }
        if !(self.timeline.tempo > 0.0) {
            return Err(ConfigError::InvalidTempo(self.timeline.tempo));
        }
        if !(self.timeline.horizontal_scale > 0.0) {
            return Err(ConfigError::InvalidScale(self.timeline.horizontal_scale));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Snaps a position to the configured grid.
    pub fn snap(&self, pos: TimelinePosition) -> TimelinePosition {
        pos.snapped(self.snap.grid, self.snap.mode, &self.timeline)
    }

    /// Converts a pointer offset to a snapped timeline position.
    pub fn position_at_margin(&self, margin: f64) -> TimelinePosition {
        self.snap(TimelinePosition::from_margin(margin, &self.timeline))
    }
}
