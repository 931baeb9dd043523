//! Core types used throughout Sonance
//!
//! The engine uses a Z-up, right-handed convention: +X is forward, +Y is left
//! and +Z is up.

use std::fmt;

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Index of an entity in the engine's entity list.
///
/// Non-positive values are sentinels: `0` is the world itself, `-1` asks for the
/// local player and `-2` addresses a UI panel (no entity at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityIndex(pub i32);

impl EntityIndex {
    /// Sounds emitted by the world (static geometry, ambient emitters)
    pub const WORLD: EntityIndex = EntityIndex(0);
    /// Placeholder resolved to the connected local player at emission time
    pub const LOCAL_PLAYER: EntityIndex = EntityIndex(-1);
    /// Used for the local player when no server connection exists
    pub const UI_PANEL: EntityIndex = EntityIndex(-2);

    /// Raw index value
    pub fn get(self) -> i32 {
        self.0
    }

    /// Whether this is the world sentinel
    pub fn is_world(self) -> bool {
        self == Self::WORLD
    }

    /// Whether this index can refer to a real, positioned entity
    pub fn is_spatial(self) -> bool {
        self.0 > 0
    }

    /// Speaker indices only count when they are real entities; anything else
    /// means "no speaker".
    pub fn speaker(index: i32) -> Option<EntityIndex> {
        (index > 0).then_some(EntityIndex(index))
    }
}

impl fmt::Display for EntityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::WORLD => write!(f, "world"),
            Self::LOCAL_PLAYER => write!(f, "local-player"),
            Self::UI_PANEL => write!(f, "ui-panel"),
            Self(index) => write!(f, "#{index}"),
        }
    }
}

/// Position and orientation of an entity or listener
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a transform from pitch/yaw/roll angles in degrees.
    ///
    /// Yaw turns about +Z, positive pitch looks down, roll banks about the
    /// forward axis.
    pub fn from_angles(position: Vec3, pitch: f32, yaw: f32, roll: f32) -> Self {
        let rotation = Quat::from_euler(
            EulerRot::ZYX,
            yaw.to_radians(),
            pitch.to_radians(),
            roll.to_radians(),
        );
        Self::from_position_rotation(position, rotation)
    }

    /// Get the forward direction (positive X in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the right direction (negative Y in local space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Y
    }

    /// Get the up direction (positive Z in local space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Translate by the given offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Interpolate between two transforms
    pub fn lerp(a: &Transform, b: &Transform, t: f32) -> Transform {
        Transform {
            position: a.position.lerp(b.position, t),
            rotation: a.rotation.slerp(b.rotation, t),
        }
    }
}
