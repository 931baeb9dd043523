use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sonance_core::SourceChannel;

/// Longest ray the prober casts: the diagonal of the largest possible level.
pub const MAX_TRACE_LENGTH: f32 = 1.732_050_8 * 2.0 * 16384.0;

/// Audio configuration. Maps to the `[audio]` table of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume multiplier (0.0–1.0).
    pub master_volume: f32,
    /// Sound effects volume multiplier (0.0–1.0).
    pub sfx_volume: f32,
    /// Voice/dialogue volume multiplier (0.0–1.0).
    pub voice_volume: f32,
    /// How often the acoustic space may be re-classified, in Hz.
    pub classify_hz: f32,
    /// Directory sound asset paths are resolved against.
    pub asset_root: PathBuf,
    pub steal: StealConfig,
    pub probe: ProbeConfig,
    pub classifier: ClassifierConfig,
    pub attenuation: AttenuationConfig,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            voice_volume: 1.0,
            classify_hz: 10.0,
            asset_root: PathBuf::from("assets"),
            steal: StealConfig::default(),
            probe: ProbeConfig::default(),
            classifier: ClassifierConfig::default(),
            attenuation: AttenuationConfig::default(),
        }
    }
}

impl AudioConfig {
    /// Effective SFX volume (master * sfx).
    pub fn effective_sfx_volume(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    /// Effective voice volume (master * voice).
    pub fn effective_voice_volume(&self) -> f32 {
        self.master_volume * self.voice_volume
    }

    /// Volume multiplier applied to everything played on `channel`.
    pub fn channel_volume(&self, channel: SourceChannel) -> f32 {
        if channel.is_voice() {
            self.effective_voice_volume()
        } else {
            self.effective_sfx_volume()
        }
    }
}

/// Channel stealing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StealConfig {
    /// Number of stealable sounds allowed per (entity, channel) before the
    /// oldest are stopped to make room.
    pub steal_max: usize,
    /// Weapon sounds longer than this many seconds are stolen.
    pub steal_length: f32,
}

impl Default for StealConfig {
    fn default() -> Self {
        Self {
            steal_max: 1,
            steal_length: 0.8,
        }
    }
}

/// Geometry probe parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum length of every probe ray.
    pub max_trace_length: f32,
    /// Height above the floor the horizontal ring is cast from.
    pub floor_offset: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_trace_length: MAX_TRACE_LENGTH,
            floor_offset: 128.0,
        }
    }
}

/// Room classification thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Sky visibility above which the space counts as outdoors.
    pub sky_factor: f32,
    /// Long/short ratio above which a space is no longer boxy.
    pub room_ratio: f32,
    /// Long/short ratio at or above which a wide space is a tunnel.
    pub tunnel_ratio: f32,
    /// Elongated spaces at most this wide are halls.
    pub hall_width: f32,
    /// Width and depth are clamped to at least this before ratio math.
    pub min_length: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sky_factor: 0.7,
            room_ratio: 2.5,
            tunnel_ratio: 4.0,
            hall_width: 96.0,
            min_length: 1.0,
        }
    }
}

/// Soundlevel to distance conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttenuationConfig {
    /// Loudness (dB) that plays at unit gain at `reference_distance`.
    pub reference_db: f32,
    /// Distance at which `reference_db` is measured.
    pub reference_distance: f32,
    /// Gain below which a sound counts as inaudible.
    pub cutoff_gain: f32,
    /// Falloff range used for sounds that do not attenuate.
    pub max_distance: f32,
}

impl Default for AttenuationConfig {
    fn default() -> Self {
        Self {
            reference_db: 60.0,
            reference_distance: 36.0,
            cutoff_gain: 0.05,
            max_distance: MAX_TRACE_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_volumes() {
        let config = AudioConfig::default();
        assert_eq!(config.master_volume, 1.0);
        assert_eq!(config.sfx_volume, 1.0);
        assert_eq!(config.voice_volume, 1.0);
        assert_eq!(config.steal.steal_max, 1);
        assert!((config.steal.steal_length - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn effective_volumes() {
        let config = AudioConfig {
            master_volume: 0.5,
            sfx_volume: 1.0,
            voice_volume: 0.6,
            ..Default::default()
        };
        assert!((config.effective_sfx_volume() - 0.5).abs() < f32::EPSILON);
        assert!((config.effective_voice_volume() - 0.3).abs() < f32::EPSILON);
        assert!((config.channel_volume(SourceChannel::Voice2) - 0.3).abs() < f32::EPSILON);
        assert!((config.channel_volume(SourceChannel::Weapon) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn max_trace_length_matches_level_diagonal() {
        assert!((MAX_TRACE_LENGTH - 56755.84).abs() < 0.5);
    }
}
