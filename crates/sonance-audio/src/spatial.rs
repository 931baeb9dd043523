use glam::Vec3;
use sonance_core::Transform;

/// A vector in the backend's coordinate space.
///
/// The engine is Z-up while the backend is Y-up and right-handed, so every
/// position or direction crossing into the backend is remapped as
/// `(x, y, z) -> (x, z, -y)`. Wrapping the result in its own type keeps engine
/// and backend vectors from being mixed up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackendVector(pub Vec3);

impl BackendVector {
    pub const ZERO: BackendVector = BackendVector(Vec3::ZERO);

    /// Remap an engine-space vector into backend space
    pub fn from_engine(v: Vec3) -> Self {
        Self(Vec3::new(v.x, v.z, -v.y))
    }

    /// Inverse of [`BackendVector::from_engine`]
    pub fn to_engine(self) -> Vec3 {
        Vec3::new(self.0.x, -self.0.z, self.0.y)
    }
}

/// Listener state for spatial audio calculations, in backend space.
#[derive(Debug, Clone)]
pub struct Listener {
    pub position: BackendVector,
    pub forward: BackendVector,
    pub up: BackendVector,
}

impl Default for Listener {
    fn default() -> Self {
        Self {
            position: BackendVector::ZERO,
            forward: BackendVector(-Vec3::Z),
            up: BackendVector(Vec3::Y),
        }
    }
}

impl Listener {
    /// Listener pose for an engine-space transform
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: BackendVector::from_engine(transform.position),
            forward: BackendVector::from_engine(transform.forward()),
            up: BackendVector::from_engine(transform.up()),
        }
    }
}

/// Parameters computed for a sound emitter relative to the listener.
#[derive(Debug, Clone, Copy)]
pub struct SpatialParams {
    /// Volume attenuation factor (0.0–1.0).
    pub volume: f64,
    /// Stereo panning (-1.0 = full left, 0.0 = center, 1.0 = full right).
    pub panning: f64,
}

/// Compute spatial audio parameters for an emitter position relative to a listener.
///
/// Uses inverse-distance attenuation: full volume inside `min_distance`, falling
/// off as `min_distance / distance` and silent beyond `max_distance`.
/// Panning is derived from the angle between the listener's right vector and the
/// direction to the emitter.
pub fn compute_spatial(
    listener: &Listener,
    emitter_pos: BackendVector,
    min_distance: f32,
    max_distance: f32,
) -> SpatialParams {
    let to_emitter = emitter_pos.0 - listener.position.0;
    let distance = to_emitter.length();

    if distance < f32::EPSILON {
        return SpatialParams {
            volume: 1.0,
            panning: 0.0,
        };
    }

    let volume = if distance > max_distance {
        0.0
    } else if distance <= min_distance {
        1.0
    } else {
        (min_distance.max(f32::EPSILON) / distance) as f64
    };

    // Panning based on angle to listener's right vector.
    let right = listener.forward.0.cross(listener.up.0).normalize_or_zero();
    let direction = to_emitter / distance;
    let panning = direction.dot(right) as f64;

    SpatialParams {
        volume: volume.clamp(0.0, 1.0),
        panning: panning.clamp(-1.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32, z: f32) -> BackendVector {
        BackendVector(Vec3::new(x, y, z))
    }

    #[test]
    fn engine_to_backend_remap() {
        let v = BackendVector::from_engine(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(v.0, Vec3::new(1.0, 3.0, -2.0));
        assert_eq!(v.to_engine(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn engine_up_becomes_backend_up() {
        let listener = Listener::from_transform(&Transform::default());
        assert!((listener.up.0 - Vec3::Y).length() < 1e-6);
        // Engine forward (+X) stays +X.
        assert!((listener.forward.0 - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn emitter_at_listener() {
        let listener = Listener::default();
        let params = compute_spatial(&listener, BackendVector::ZERO, 1.0, 100.0);
        assert!((params.volume - 1.0).abs() < 0.01);
        assert!(params.panning.abs() < 0.01);
    }

    #[test]
    fn emitter_to_the_right() {
        let listener = Listener::default();
        let params = compute_spatial(&listener, at(5.0, 0.0, 0.0), 1.0, 100.0);
        assert!(params.panning > 0.5, "should pan right: {}", params.panning);
        assert!(params.volume < 1.0, "should attenuate");
    }

    #[test]
    fn engine_right_pans_right() {
        let transform = Transform::default();
        let listener = Listener::from_transform(&transform);
        let emitter = BackendVector::from_engine(transform.right() * 10.0);
        let params = compute_spatial(&listener, emitter, 1.0, 100.0);
        assert!(params.panning > 0.9, "should pan right: {}", params.panning);
    }

    #[test]
    fn emitter_to_the_left() {
        let listener = Listener::default();
        let params = compute_spatial(&listener, at(-5.0, 0.0, 0.0), 1.0, 100.0);
        assert!(params.panning < -0.5, "should pan left: {}", params.panning);
    }

    #[test]
    fn inside_min_distance_is_full_volume() {
        let listener = Listener::default();
        let params = compute_spatial(&listener, at(0.0, 0.0, -150.0), 200.0, 4000.0);
        assert!((params.volume - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn beyond_max_distance_is_silent() {
        let listener = Listener::default();
        let params = compute_spatial(&listener, at(0.0, 0.0, -101.0), 1.0, 100.0);
        assert_eq!(params.volume, 0.0);
    }

    #[test]
    fn attenuation_increases_with_distance() {
        let listener = Listener::default();
        let near = compute_spatial(&listener, at(0.0, 0.0, -2.0), 1.0, 100.0);
        let far = compute_spatial(&listener, at(0.0, 0.0, -10.0), 1.0, 100.0);
        assert!(near.volume > far.volume);
    }
}
