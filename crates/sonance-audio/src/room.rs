use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;

/// Acoustic category of the space around the listener.
///
/// Consumed by whatever picks the reverb preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Room,
    Hall,
    Tunnel,
    OpenSpace,
}

impl RoomType {
    pub fn name(self) -> &'static str {
        match self {
            RoomType::Room => "room",
            RoomType::Hall => "hall",
            RoomType::Tunnel => "tunnel",
            RoomType::OpenSpace => "open space",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps probed dimensions to a [`RoomType`].
#[derive(Debug, Clone, Default)]
pub struct RoomClassifier {
    config: ClassifierConfig,
}

impl RoomClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify a space from its width/depth (x, y) and sky visibility.
    ///
    /// Rules are checked in order and the first match wins:
    /// mostly open sky is an open space; an elongated space is a hall when
    /// narrow and a tunnel when very elongated; anything else is a room.
    pub fn classify(&self, size: Vec3, sky_visibility: f32) -> RoomType {
        let cfg = &self.config;
        let mut long = size.x.max(cfg.min_length);
        let mut short = size.y.max(cfg.min_length);
        if short > long {
            std::mem::swap(&mut long, &mut short);
        }
        let ratio = long / short;

        if sky_visibility > cfg.sky_factor {
            return RoomType::OpenSpace;
        }

        if ratio > cfg.room_ratio {
            if short <= cfg.hall_width {
                return RoomType::Hall;
            }
            if ratio >= cfg.tunnel_ratio {
                return RoomType::Tunnel;
            }
        }

        RoomType::Room
    }
}

/// Classify with the default thresholds.
pub fn classify(size: Vec3, sky_visibility: f32) -> RoomType {
    RoomClassifier::default().classify(size, sky_visibility)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: f32, depth: f32) -> Vec3 {
        Vec3::new(width, depth, 128.0)
    }

    #[test]
    fn boxy_space_is_a_room() {
        assert_eq!(classify(size(50.0, 50.0), 0.0), RoomType::Room);
    }

    #[test]
    fn narrow_elongated_space_is_a_hall() {
        assert_eq!(classify(size(400.0, 50.0), 0.0), RoomType::Hall);
        // Orientation does not matter.
        assert_eq!(classify(size(50.0, 400.0), 0.0), RoomType::Hall);
    }

    #[test]
    fn wide_moderately_elongated_space_is_a_room() {
        assert_eq!(classify(size(400.0, 150.0), 0.0), RoomType::Room);
    }

    #[test]
    fn wide_very_elongated_space_is_a_tunnel() {
        assert_eq!(classify(size(1200.0, 200.0), 0.0), RoomType::Tunnel);
        // Exactly the tunnel ratio counts.
        assert_eq!(classify(size(800.0, 200.0), 0.0), RoomType::Tunnel);
    }

    #[test]
    fn mostly_sky_is_open_space() {
        assert_eq!(classify(size(500.0, 100.0), 0.9), RoomType::OpenSpace);
    }

    #[test]
    fn sky_threshold_is_exclusive() {
        assert_eq!(classify(size(50.0, 50.0), 0.7), RoomType::Room);
        assert_eq!(classify(size(50.0, 50.0), 0.71), RoomType::OpenSpace);
    }

    #[test]
    fn room_ratio_is_exclusive() {
        assert_eq!(classify(size(240.0, 96.0), 0.0), RoomType::Room);
        assert_eq!(classify(size(241.0, 96.0), 0.0), RoomType::Hall);
    }

    #[test]
    fn degenerate_sizes_clamp_to_one() {
        assert_eq!(classify(Vec3::ZERO, 0.0), RoomType::Room);
        assert_eq!(classify(size(3.0, -10.0), 0.0), RoomType::Hall);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = RoomClassifier::default();
        let s = size(612.0, 97.0);
        let first = classifier.classify(s, 0.3);
        for _ in 0..10 {
            assert_eq!(classifier.classify(s, 0.3), first);
        }
    }

    #[test]
    fn custom_thresholds() {
        let classifier = RoomClassifier::new(ClassifierConfig {
            hall_width: 200.0,
            ..Default::default()
        });
        assert_eq!(classifier.classify(size(600.0, 150.0), 0.0), RoomType::Hall);
    }

    #[test]
    fn min_length_bounds_the_short_side() {
        assert_eq!(classify(size(100.0, 10.0), 0.0), RoomType::Hall);
        let classifier = RoomClassifier::new(ClassifierConfig {
            min_length: 50.0,
            ..Default::default()
        });
        assert_eq!(classifier.classify(size(100.0, 10.0), 0.0), RoomType::Room);
    }
}
