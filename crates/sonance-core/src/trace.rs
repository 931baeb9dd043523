//! Scene ray-trace contract
//!
//! The acoustic prober only needs "what does a ray from here hit first" plus the
//! audio properties of the surface it hit. Any world representation can provide
//! that by implementing [`SceneTracer`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Audio-relevant properties of a surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceProps {
    /// Fraction of incident sound energy reflected (0.0–1.0)
    pub reflectivity: f32,
    /// Surface is open sky rather than solid geometry
    pub sky: bool,
}

impl Default for SurfaceProps {
    fn default() -> Self {
        Self {
            reflectivity: 0.5,
            sky: false,
        }
    }
}

impl SurfaceProps {
    pub const SKY: SurfaceProps = SurfaceProps {
        reflectivity: 0.0,
        sky: true,
    };

    pub fn solid(reflectivity: f32) -> Self {
        Self {
            reflectivity: reflectivity.clamp(0.0, 1.0),
            sky: false,
        }
    }
}

/// First hit of a traced ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    /// Distance from the ray origin to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Properties of the surface that was hit
    pub surface: SurfaceProps,
}

/// Casts rays against static world geometry
pub trait SceneTracer {
    /// Trace from `origin` along the normalized `direction` up to `max_distance`.
    ///
    /// Returns `None` when nothing is hit within range.
    fn trace_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<TraceHit>;
}
