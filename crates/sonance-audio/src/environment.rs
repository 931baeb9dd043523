//! Tracks which kind of space the listener is in.

use glam::{Quat, Vec3};
use sonance_core::{Cadence, SceneTracer};
use tracing::debug;

use crate::config::AudioConfig;
use crate::probe::{GeometryProber, SpaceSample};
use crate::room::{RoomClassifier, RoomType};

/// Last known listener pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioListenerState {
    pub origin: Vec3,
    pub rotation: Quat,
    pub underwater: bool,
}

impl Default for AudioListenerState {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            underwater: false,
        }
    }
}

/// Outcome of one classification.
#[derive(Debug, Clone, PartialEq)]
pub struct AcousticSpace {
    pub room_type: RoomType,
    /// Mean reflectivity of the surrounding walls
    pub reflectivity: f32,
    /// Floor area in square feet
    pub space_size: f32,
    pub sky_visibility: f32,
    pub underwater: bool,
    pub sample: SpaceSample,
}

/// Re-classifies the listener's surroundings at a throttled rate.
///
/// Probing costs two dozen ray casts, so it only runs when the cadence allows
/// and the listener moved or changed underwater state since the last probe.
#[derive(Debug, Clone)]
pub struct AcousticEnvironment {
    prober: GeometryProber,
    classifier: RoomClassifier,
    cadence: Cadence,
    listener: AudioListenerState,
    last_sampled: Option<(Vec3, bool)>,
    current: Option<AcousticSpace>,
}

impl AcousticEnvironment {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            prober: GeometryProber::new(config.probe.clone()),
            classifier: RoomClassifier::new(config.classifier.clone()),
            cadence: Cadence::from_hz(config.classify_hz),
            listener: AudioListenerState::default(),
            last_sampled: None,
            current: None,
        }
    }

    pub fn listener(&self) -> &AudioListenerState {
        &self.listener
    }

    pub fn set_listener(&mut self, origin: Vec3, rotation: Quat) {
        self.listener.origin = origin;
        self.listener.rotation = rotation;
    }

    pub fn set_underwater(&mut self, underwater: bool) {
        self.listener.underwater = underwater;
    }

    /// The most recent classification, if any has run.
    pub fn current(&self) -> Option<&AcousticSpace> {
        self.current.as_ref()
    }

    /// Probe again on the next update even if nothing changed.
    pub fn invalidate(&mut self) {
        self.last_sampled = None;
        self.cadence.reset();
    }

    /// Advance by `dt` seconds; returns the new classification when one ran.
    pub fn update(&mut self, tracer: &dyn SceneTracer, dt: f32) -> Option<AcousticSpace> {
        if !self.cadence.tick(dt) {
            return None;
        }

        let key = (self.listener.origin, self.listener.underwater);
        if self.last_sampled == Some(key) {
            return None;
        }
        self.last_sampled = Some(key);

        let sample = self.prober.sample(tracer, self.listener.origin);
        let room_type = self.classifier.classify(sample.size, sample.sky_visibility);
        let space = AcousticSpace {
            room_type,
            reflectivity: sample.reflectivity,
            space_size: sample.space_size(),
            sky_visibility: sample.sky_visibility,
            underwater: self.listener.underwater,
            sample,
        };

        if self.current.as_ref().map(|c| c.room_type) != Some(room_type) {
            debug!(
                room = %room_type,
                width = space.sample.width(),
                depth = space.sample.depth(),
                sky = space.sky_visibility,
                "acoustic space changed"
            );
        }
        self.current = Some(space.clone());
        Some(space)
    }
}
