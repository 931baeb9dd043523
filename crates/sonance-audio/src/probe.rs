//! Geometry probing around the listener.
//!
//! The prober estimates the shape of the space the listener stands in by
//! casting a fixed ray pattern: one ray to find the floor, a horizontal ring of
//! twelve rays to find the walls, and eleven mostly-upward rays to measure how
//! much open sky is visible.

use glam::{Quat, Vec3};
use sonance_core::SceneTracer;

use crate::config::ProbeConfig;

/// Rays in the horizontal ring, 30° apart.
pub const RING_RAYS: usize = 12;
const HALF_RING: usize = RING_RAYS / 2;
const QUARTER_RING: usize = RING_RAYS / 4;

/// Upward probe directions, unnormalized. +X forward, +Y left, +Z up.
const SKY_DIRECTIONS: [[f32; 3]; 11] = [
    [0.0, 0.0, 1.0],
    // steep diagonals
    [1.0, 0.0, 2.0],
    [-1.0, 0.0, 2.0],
    [0.0, 1.0, 2.0],
    [0.0, -1.0, 2.0],
    // up, forward, to the sides
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    // shallow forward diagonals
    [2.0, 2.0, 1.0],
    [2.0, -2.0, 1.0],
    // steep back diagonals
    [-1.0, 1.0, 2.0],
    [-1.0, -1.0, 2.0],
];

/// Result of one probe of the surrounding geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceSample {
    /// Where the ring was cast from
    pub probe_origin: Vec3,
    /// Hit distance of each ring ray, full trace length on a miss
    pub distances: [f32; RING_RAYS],
    /// Estimated width (long axis), depth (perpendicular axis) and height
    pub size: Vec3,
    /// Mean reflectivity of the surfaces the ring hit
    pub reflectivity: f32,
    /// Fraction of the upward rays that reached sky (0.0–1.0)
    pub sky_visibility: f32,
}

impl SpaceSample {
    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn depth(&self) -> f32 {
        self.size.y
    }

    pub fn height(&self) -> f32 {
        self.size.z
    }

    /// Floor area in square feet (12 units per foot).
    pub fn space_size(&self) -> f32 {
        (self.width() / 12.0) * (self.depth() / 12.0)
    }
}

/// Casts the probe pattern against a [`SceneTracer`].
#[derive(Debug, Clone, Default)]
pub struct GeometryProber {
    config: ProbeConfig,
}

impl GeometryProber {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe the space around `listener`.
    pub fn sample(&self, tracer: &dyn SceneTracer, listener: Vec3) -> SpaceSample {
        let max = self.config.max_trace_length;

        let (probe_origin, floor_distance) = match tracer.trace_ray(listener, -Vec3::Z, max) {
            Some(hit) => (
                hit.point + Vec3::Z * self.config.floor_offset,
                hit.distance.clamp(0.0, max),
            ),
            None => (listener, max),
        };

        let mut distances = [max; RING_RAYS];
        let mut reflectivity_sum = 0.0;
        for (i, distance) in distances.iter_mut().enumerate() {
            if let Some(hit) = tracer.trace_ray(probe_origin, ring_direction(i), max) {
                *distance = hit.distance.clamp(0.0, max);
                reflectivity_sum += hit.surface.reflectivity;
            }
        }
        let reflectivity = reflectivity_sum / RING_RAYS as f32;

        let long_axis = longest_pair(&distances);
        let width = window_length(&distances, long_axis);
        let depth = window_length(&distances, (long_axis + QUARTER_RING) % RING_RAYS);

        let mut sky_hits = 0;
        let mut ceiling_distance = max;
        for (i, raw) in SKY_DIRECTIONS.iter().enumerate() {
            let direction = Vec3::from_array(*raw).normalize();
            let hit = tracer.trace_ray(listener, direction, max);
            if i == 0 {
                ceiling_distance = hit.map_or(max, |h| h.distance.clamp(0.0, max));
            }
            if hit.is_some_and(|h| h.surface.sky) {
                sky_hits += 1;
            }
        }
        let height = (floor_distance + ceiling_distance).min(max);

        SpaceSample {
            probe_origin,
            distances,
            size: Vec3::new(width, depth, height),
            reflectivity,
            sky_visibility: sky_hits as f32 / SKY_DIRECTIONS.len() as f32,
        }
    }
}

/// Direction of ring ray `i`: +Y rotated `i * 30°` about +Z.
fn ring_direction(i: usize) -> Vec3 {
    let yaw = (i as f32 * 360.0 / RING_RAYS as f32).to_radians();
    Quat::from_rotation_z(yaw) * Vec3::Y
}

fn pair_length(distances: &[f32; RING_RAYS], i: usize) -> f32 {
    distances[i % RING_RAYS] + distances[(i + HALF_RING) % RING_RAYS]
}

/// Index of the opposite pair with the greatest combined length. Ties keep the
/// lowest index.
fn longest_pair(distances: &[f32; RING_RAYS]) -> usize {
    (1..HALF_RING).fold(0, |best, i| {
        if pair_length(distances, i) > pair_length(distances, best) {
            i
        } else {
            best
        }
    })
}

/// Mean length of the three pairs centered on `axis`.
fn window_length(distances: &[f32; RING_RAYS], axis: usize) -> f32 {
    let before = pair_length(distances, axis + RING_RAYS - 1);
    let center = pair_length(distances, axis);
    let after = pair_length(distances, axis + 1);
    (before + center + after) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BoxRoom, Void};
    use sonance_core::SurfaceProps;

    fn prober() -> GeometryProber {
        GeometryProber::default()
    }

    #[test]
    fn ring_starts_at_plus_y_and_turns_counterclockwise() {
        assert!((ring_direction(0) - Vec3::Y).length() < 1e-5);
        assert!((ring_direction(3) - -Vec3::X).length() < 1e-5);
        assert!((ring_direction(6) - -Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn probe_origin_is_raised_above_the_floor() {
        let room = BoxRoom::new(400.0, 400.0, 256.0);
        let sample = prober().sample(&room, Vec3::new(0.0, 0.0, 64.0));
        assert!((sample.probe_origin.z - 128.0).abs() < 1e-3);
        assert!((sample.height() - 256.0).abs() < 1e-2);
    }

    #[test]
    fn square_room_dimensions() {
        let room = BoxRoom::new(400.0, 400.0, 256.0);
        let sample = prober().sample(&room, Vec3::new(0.0, 0.0, 64.0));
        // Axis-aligned pair and its neighbours on the diagonal-ish rays.
        assert!(sample.width() >= 400.0 - 1e-2);
        assert!(sample.depth() >= 400.0 - 1e-2);
        assert!((sample.width() - sample.depth()).abs() < 1.0);
        assert_eq!(sample.sky_visibility, 0.0);
    }

    #[test]
    fn corridor_long_axis_is_width() {
        let room = BoxRoom::new(80.0, 1200.0, 200.0);
        let sample = prober().sample(&room, Vec3::new(0.0, 0.0, 64.0));
        assert!(sample.width() > 400.0, "{:?}", sample.size);
        assert!(sample.depth() < 100.0, "{:?}", sample.size);
        // Ring ray 0 runs down the corridor.
        assert!((sample.distances[0] - 600.0).abs() < 1e-2);
    }

    #[test]
    fn distances_stay_within_trace_length() {
        let config = ProbeConfig {
            max_trace_length: 500.0,
            ..Default::default()
        };
        let room = BoxRoom::new(2000.0, 300.0, 200.0);
        let sample = GeometryProber::new(config).sample(&room, Vec3::new(0.0, 0.0, 64.0));
        for d in sample.distances {
            assert!((0.0..=500.0).contains(&d), "{d}");
        }
    }

    #[test]
    fn misses_read_as_full_trace_length() {
        let sample = prober().sample(&Void, Vec3::ZERO);
        let max = ProbeConfig::default().max_trace_length;
        assert!(sample.distances.iter().all(|&d| d == max));
        assert_eq!(sample.probe_origin, Vec3::ZERO);
        assert_eq!(sample.reflectivity, 0.0);
        assert_eq!(sample.sky_visibility, 0.0);
    }

    #[test]
    fn reflectivity_is_the_mean_of_ring_hits() {
        let room = BoxRoom::new(400.0, 400.0, 256.0).with_walls(SurfaceProps::solid(0.8));
        let sample = prober().sample(&room, Vec3::new(0.0, 0.0, 64.0));
        assert!((sample.reflectivity - 0.8).abs() < 1e-5);
    }

    #[test]
    fn sky_visibility_counts_sky_hits() {
        let room = BoxRoom::new(400.0, 400.0, 256.0).with_ceiling(Some(SurfaceProps::SKY));
        let sample = prober().sample(&room, Vec3::new(0.0, 0.0, 64.0));
        // Shallow rays still reach the walls first.
        assert!(sample.sky_visibility > 0.0 && sample.sky_visibility < 1.0);

        let open = BoxRoom::new(40_000.0, 40_000.0, 1000.0).with_ceiling(Some(SurfaceProps::SKY));
        let sample = prober().sample(&open, Vec3::new(0.0, 0.0, 64.0));
        assert!((sample.sky_visibility - 1.0).abs() < 1e-6);
    }

    #[test]
    fn space_size_is_square_feet() {
        let room = BoxRoom::new(240.0, 240.0, 256.0);
        let sample = prober().sample(&room, Vec3::new(0.0, 0.0, 64.0));
        let expected = (sample.width() / 12.0) * (sample.depth() / 12.0);
        assert!((sample.space_size() - expected).abs() < 1e-3);
        assert!(sample.space_size() >= 400.0 - 1.0);
    }
}
