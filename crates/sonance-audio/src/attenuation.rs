//! Soundlevel to distance conversion.
//!
//! A soundlevel is the loudness in dB at the reference distance. Gain falls off
//! inversely with distance; the max audible distance is where it drops under the
//! configured cutoff gain.

use sonance_core::Soundlevel;

use crate::config::AttenuationConfig;

/// Distance multiplier for a soundlevel. Zero means no distance falloff.
pub fn dist_mult(level: Soundlevel, config: &AttenuationConfig) -> f32 {
    if level.is_none() {
        return 0.0;
    }
    10f32.powf((config.reference_db - level.decibels()) / 20.0) / config.reference_distance
}

/// Linear gain (0.0–1.0) of a sound with `level` heard from `distance` units away.
pub fn dist_gain(level: Soundlevel, distance: f32, config: &AttenuationConfig) -> f32 {
    let mult = dist_mult(level, config);
    if mult <= 0.0 {
        return 1.0;
    }
    let scaled = distance.max(0.0) * mult;
    if scaled <= 1.0 {
        1.0
    } else {
        1.0 / scaled
    }
}

/// Falloff range handed to the backend for a new channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FalloffRange {
    /// Full volume inside this distance
    pub min_distance: f32,
    /// Silent beyond this distance
    pub max_distance: f32,
}

impl FalloffRange {
    /// Compute the falloff range for a soundlevel.
    pub fn from_soundlevel(level: Soundlevel, config: &AttenuationConfig) -> Self {
        let mult = dist_mult(level, config);
        if mult <= 0.0 {
            return Self {
                min_distance: config.max_distance,
                max_distance: config.max_distance,
            };
        }

        let max_distance = (1.0 / (mult * config.cutoff_gain)).min(config.max_distance);
        let min_distance = (1.0 / mult).min(max_distance);
        Self {
            min_distance,
            max_distance,
        }
    }
}
