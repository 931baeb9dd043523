//! Fixtures shared by the unit tests.

use std::collections::HashMap;

use glam::Vec3;
use sonance_core::{EntityIndex, SceneTracer, SourceChannel, SurfaceProps, TraceHit, Transform};

use crate::registry::{SoundEntity, Spatialization};

/// An axis-aligned box the rays are traced from the inside of.
pub struct BoxRoom {
    pub min: Vec3,
    pub max: Vec3,
    pub walls: SurfaceProps,
    /// `None` leaves the top open: upward rays escape and miss.
    pub ceiling: Option<SurfaceProps>,
}

impl BoxRoom {
    /// A closed room of the given interior size with its floor centered on the origin.
    pub fn new(width: f32, depth: f32, height: f32) -> Self {
        Self {
            min: Vec3::new(-width / 2.0, -depth / 2.0, 0.0),
            max: Vec3::new(width / 2.0, depth / 2.0, height),
            walls: SurfaceProps::solid(0.5),
            ceiling: Some(SurfaceProps::solid(0.5)),
        }
    }

    pub fn with_walls(mut self, walls: SurfaceProps) -> Self {
        self.walls = walls;
        self
    }

    pub fn with_ceiling(mut self, ceiling: Option<SurfaceProps>) -> Self {
        self.ceiling = ceiling;
        self
    }
}

impl SceneTracer for BoxRoom {
    fn trace_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<TraceHit> {
        let dir = direction.normalize_or_zero();
        let mut exit = f32::INFINITY;
        let mut exit_axis = 0;
        for axis in 0..3 {
            let d = dir[axis];
            if d.abs() < 1e-6 {
                continue;
            }
            let bound = if d > 0.0 { self.max[axis] } else { self.min[axis] };
            let t = (bound - origin[axis]) / d;
            if t >= 0.0 && t < exit {
                exit = t;
                exit_axis = axis;
            }
        }
        if !exit.is_finite() || exit > max_distance {
            return None;
        }

        let surface = if exit_axis == 2 && dir.z > 0.0 {
            self.ceiling?
        } else {
            self.walls
        };
        Some(TraceHit {
            distance: exit,
            point: origin + dir * exit,
            surface,
        })
    }
}

/// Nothing to hit in any direction.
pub struct Void;

impl SceneTracer for Void {
    fn trace_ray(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<TraceHit> {
        None
    }
}

/// An entity with a position and a fixed audibility answer.
#[derive(Debug, Clone)]
pub struct TestEntity {
    pub transform: Transform,
    pub audible: bool,
}

impl TestEntity {
    pub fn at(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            audible: true,
        }
    }

    pub fn inaudible(mut self) -> Self {
        self.audible = false;
        self
    }
}

impl SoundEntity for TestEntity {
    fn transform(&self) -> Transform {
        self.transform
    }

    fn sound_spatialization(&self, _channel: SourceChannel, info: &mut Spatialization) -> bool {
        info.origin = self.transform.position;
        self.audible
    }
}

pub type TestEntities = HashMap<EntityIndex, TestEntity>;
