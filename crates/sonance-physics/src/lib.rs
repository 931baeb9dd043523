//! Sonance Physics - Static collision world using rapier3d
//!
//! Holds the level geometry the acoustic prober traces against. Every collider
//! carries [`SurfaceProps`] describing how it reflects sound and whether it is
//! open sky.

use std::collections::HashMap;

use glam::Vec3;
use nalgebra::Unit;
use rapier3d::prelude::*;
use tracing::debug;

use sonance_core::{SceneTracer, SurfaceProps, TraceHit};

/// The static world containing all level geometry
pub struct PhysicsWorld {
    /// Rigid body storage (colliders are parentless, but queries need the set)
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,

    /// Audio surface properties per collider
    surfaces: HashMap<ColliderHandle, SurfaceProps>,
    /// Used when a collider has no registered surface
    default_surface: SurfaceProps,

    /// Island manager (needed to remove colliders)
    island_manager: IslandManager,
    /// Query pipeline for raycasts
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self::with_default_surface(SurfaceProps::default())
    }

    /// Create an empty world with the surface used for unregistered colliders
    pub fn with_default_surface(default_surface: SurfaceProps) -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            surfaces: HashMap::new(),
            default_surface,
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Add a static collider (ground, walls, etc.) with its audio surface
    pub fn add_static_collider(&mut self, collider: Collider, surface: SurfaceProps) -> ColliderHandle {
        let handle = self.collider_set.insert(collider);
        self.surfaces.insert(handle, surface);
        // Static geometry changes rarely; keep queries current on every insert.
        self.query_pipeline.update(&self.collider_set);
        handle
    }

    /// Remove a collider
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, true);
        self.surfaces.remove(&handle);
        self.query_pipeline.update(&self.collider_set);
    }

    /// Get a collider by handle
    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    /// Audio surface of a collider
    pub fn surface(&self, handle: ColliderHandle) -> SurfaceProps {
        self.surfaces
            .get(&handle)
            .copied()
            .unwrap_or(self.default_surface)
    }

    /// Replace the audio surface of an existing collider
    pub fn set_surface(&mut self, handle: ColliderHandle, surface: SurfaceProps) {
        if self.collider_set.contains(handle) {
            self.surfaces.insert(handle, surface);
        }
    }

    /// Cast a ray and get detailed hit information
    pub fn raycast_detailed(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(&self.rigid_body_set, &self.collider_set, &ray, max_distance, true, filter)
            .map(|(handle, intersection)| RaycastHit {
                collider: handle,
                distance: intersection.time_of_impact,
                point: origin + direction * intersection.time_of_impact,
                normal: Vec3::new(
                    intersection.normal.x,
                    intersection.normal.y,
                    intersection.normal.z,
                ),
            })
    }

    /// Create a ground plane collider at height `z`
    pub fn create_ground(&mut self, z: f32, surface: SurfaceProps) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 0.0, 1.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, 0.0, z])
            .build();
        self.add_static_collider(ground, surface)
    }

    /// Create a static box collider
    pub fn create_static_box(&mut self, half_extents: Vec3, position: Vec3, surface: SurfaceProps) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .build();
        self.add_static_collider(collider, surface)
    }

    /// Build a closed box enclosure: four walls and a ceiling around an interior
    /// of `interior` size whose floor centre sits at `floor_center`.
    ///
    /// The floor itself is expected to come from the ground plane.
    pub fn create_enclosure(
        &mut self,
        floor_center: Vec3,
        interior: Vec3,
        wall_thickness: f32,
        walls: SurfaceProps,
        ceiling: SurfaceProps,
    ) -> Vec<ColliderHandle> {
        let half = interior * 0.5;
        let t = wall_thickness * 0.5;
        let mid_z = floor_center.z + half.z;

        let mut handles = Vec::with_capacity(5);
        // +X / -X walls span the full outer depth so corners are sealed
        for sign in [1.0f32, -1.0] {
            handles.push(self.create_static_box(
                Vec3::new(t, half.y + wall_thickness, half.z),
                Vec3::new(floor_center.x + sign * (half.x + t), floor_center.y, mid_z),
                walls,
            ));
        }
        for sign in [1.0f32, -1.0] {
            handles.push(self.create_static_box(
                Vec3::new(half.x, t, half.z),
                Vec3::new(floor_center.x, floor_center.y + sign * (half.y + t), mid_z),
                walls,
            ));
        }
        handles.push(self.create_static_box(
            Vec3::new(half.x + wall_thickness, half.y + wall_thickness, t),
            Vec3::new(floor_center.x, floor_center.y, floor_center.z + interior.z + t),
            ceiling,
        ));

        debug!(
            "Built enclosure at {:?} ({} x {} x {})",
            floor_center, interior.x, interior.y, interior.z
        );
        handles
    }

    /// Number of colliders in the world
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTracer for PhysicsWorld {
    fn trace_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<TraceHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        self.raycast_detailed(origin, direction, max_distance, QueryFilter::only_fixed())
            .map(|hit| TraceHit {
                distance: hit.distance,
                point: hit.point,
                surface: self.surface(hit.collider),
            })
    }
}

/// Detailed raycast hit information
#[derive(Debug, Clone)]
pub struct RaycastHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal at hit point
    pub normal: Vec3,
}
