//! Demo scene for the walkthrough
//!
//! A flat ground under a skybox with three sealed stations (a room, a narrow
//! hall and a wide tunnel) and an open field. The listener visits each one in
//! turn while a few entities make noise around it.

use std::collections::HashMap;

use glam::Vec3;
use sonance_audio::{RoomType, SoundEntity, Spatialization};
use sonance_core::{EntityIndex, SourceChannel, SurfaceProps, Transform};
use sonance_physics::PhysicsWorld;
use tracing::info;

pub const PLAYER: EntityIndex = EntityIndex(1);
pub const GUARD: EntityIndex = EntityIndex(2);
pub const RADIO: EntityIndex = EntityIndex(3);

/// Height of the listener's ears above the floor
const EAR_HEIGHT: f32 = 64.0;
const WALL_THICKNESS: f32 = 16.0;
const SKY_HEIGHT: f32 = 4000.0;

/// A place the listener stops at
#[derive(Debug, Clone)]
pub struct Station {
    pub name: &'static str,
    pub listener: Vec3,
    pub expected: RoomType,
}

/// An entity that can be heard
#[derive(Debug, Clone)]
pub struct SceneEntity {
    pub name: &'static str,
    pub transform: Transform,
    pub audible: bool,
}

impl SoundEntity for SceneEntity {
    fn transform(&self) -> Transform {
        self.transform
    }

    fn sound_spatialization(&self, channel: SourceChannel, info: &mut Spatialization) -> bool {
        info.origin = self.transform.position;
        // Voices carry from the head, not the feet.
        if channel.is_voice() {
            info.origin.z += EAR_HEIGHT;
        }
        self.audible
    }
}

/// Level geometry plus the entities living in it
pub struct DemoScene {
    pub world: PhysicsWorld,
    pub entities: HashMap<EntityIndex, SceneEntity>,
    pub stations: Vec<Station>,
}

impl DemoScene {
    pub fn build() -> Self {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0, SurfaceProps::solid(0.3));
        world.create_static_box(
            Vec3::new(100_000.0, 100_000.0, 8.0),
            Vec3::new(0.0, 0.0, SKY_HEIGHT + 8.0),
            SurfaceProps::SKY,
        );

        let concrete = SurfaceProps::solid(0.7);
        let plaster = SurfaceProps::solid(0.4);
        let mut stations = Vec::new();

        let mut enclose = |name, center: Vec3, interior: Vec3, walls, expected| {
            world.create_enclosure(center, interior, WALL_THICKNESS, walls, plaster);
            stations.push(Station {
                name,
                listener: center + Vec3::Z * EAR_HEIGHT,
                expected,
            });
        };
        enclose(
            "office",
            Vec3::ZERO,
            Vec3::new(400.0, 400.0, 256.0),
            plaster,
            RoomType::Room,
        );
        enclose(
            "service corridor",
            Vec3::new(5000.0, 0.0, 0.0),
            Vec3::new(1200.0, 80.0, 200.0),
            concrete,
            RoomType::Hall,
        );
        enclose(
            "rail tunnel",
            Vec3::new(12_000.0, 0.0, 0.0),
            Vec3::new(4000.0, 250.0, 300.0),
            concrete,
            RoomType::Tunnel,
        );
        stations.push(Station {
            name: "courtyard",
            listener: Vec3::new(30_000.0, 0.0, EAR_HEIGHT),
            expected: RoomType::OpenSpace,
        });

        let mut entities = HashMap::new();
        for (index, name) in [(PLAYER, "player"), (GUARD, "guard"), (RADIO, "radio")] {
            entities.insert(
                index,
                SceneEntity {
                    name,
                    transform: Transform::default(),
                    audible: true,
                },
            );
        }

        info!(
            colliders = world.collider_count(),
            stations = stations.len(),
            "demo scene built"
        );

        Self {
            world,
            entities,
            stations,
        }
    }

    /// Place an entity, spawning it if it is not in the scene
    pub fn place(&mut self, index: EntityIndex, name: &'static str, position: Vec3) {
        self.entities
            .entry(index)
            .or_insert_with(|| SceneEntity {
                name,
                transform: Transform::default(),
                audible: true,
            })
            .transform = Transform::from_position(position);
    }

    pub fn despawn(&mut self, index: EntityIndex) -> Option<SceneEntity> {
        self.entities.remove(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonance_audio::{GeometryProber, RoomClassifier};

    #[test]
    fn every_station_classifies_as_expected() {
        let scene = DemoScene::build();
        let prober = GeometryProber::default();
        let classifier = RoomClassifier::default();

        for station in &scene.stations {
            let sample = prober.sample(&scene.world, station.listener);
            let room = classifier.classify(sample.size, sample.sky_visibility);
            assert_eq!(
                room, station.expected,
                "{} classified as {room} ({:?}, sky {})",
                station.name, sample.size, sample.sky_visibility
            );
        }
    }

    #[test]
    fn stations_are_sealed_except_the_courtyard() {
        let scene = DemoScene::build();
        let prober = GeometryProber::default();
        for station in &scene.stations {
            let sample = prober.sample(&scene.world, station.listener);
            if station.expected == RoomType::OpenSpace {
                assert!(sample.sky_visibility > 0.9);
            } else {
                assert_eq!(sample.sky_visibility, 0.0, "{}", station.name);
            }
        }
    }

    #[test]
    fn place_moves_and_spawns() {
        let mut scene = DemoScene::build();
        scene.place(GUARD, "guard", Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.entities[&GUARD].transform.position, Vec3::new(1.0, 2.0, 3.0));

        scene.place(EntityIndex(50), "crate", Vec3::ONE);
        assert!(scene.entities.contains_key(&EntityIndex(50)));
        assert!(scene.despawn(EntityIndex(50)).is_some());
    }
}
