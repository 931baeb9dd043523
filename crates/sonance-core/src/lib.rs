//! Sonance Core - Core types and utilities for the Sonance sound system
//!
//! This crate provides the foundational types shared by every other crate:
//! - Mathematical primitives (re-exported from glam)
//! - Entity indices with the world / local-player / UI-panel sentinels
//! - Logical sound channels, emission flags, and soundlevels
//! - Transforms in the engine's Z-up coordinate convention
//! - The simulation clock and fixed-rate cadence used to throttle work
//! - The scene-trace contract consumed by the acoustic prober

pub mod sound;
pub mod time;
pub mod trace;
pub mod types;

pub use glam::{EulerRot, Quat, Vec3};
pub use sound::{SoundFlags, Soundlevel, SourceChannel, SourceChannelError, PITCH_NORM};
pub use time::{Cadence, SimClock, TimeConfig};
pub use trace::{SceneTracer, SurfaceProps, TraceHit};
pub use types::{EntityIndex, Transform};
