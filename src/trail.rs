use std::collections::VecDeque;

use glam::{Vec2, Vec3};

use crate::camera::CameraRig;
use crate::world::{ObjectId, ObjectKind, World};

/// Maximum number of live trail markers.
pub const TRAIL_CAPACITY: usize = 10;

/// NDC depth at which pointer positions are unprojected.
const UNPROJECT_DEPTH: f32 = 0.5;
const MARKER_SCALE: f32 = 0.15;
const MARKER_COLOR: Vec3 = Vec3::new(0.6, 0.85, 1.0);
/// A ray steeper than this toward the z = 0 plane is treated as parallel.
const PARALLEL_EPSILON: f32 = 1e-4;

/// Converts device pixel coordinates into normalized device coordinates.
///
/// Y is inverted: screen Y grows downward, device Y grows upward.
pub fn screen_to_ndc(screen: Vec2, viewport: (u32, u32)) -> Vec2 {
    let width = viewport.0.max(1) as f32;
    let height = viewport.1.max(1) as f32;
    Vec2::new(
        screen.x / width * 2.0 - 1.0,
        -(screen.y / height * 2.0 - 1.0),
    )
}

/// Bounded FIFO trail of glowing markers following the pointer.
#[derive(Debug, Default)]
pub struct PointerTrail {
    markers: VecDeque<ObjectId>,
}

impl PointerTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Handle of the oldest live marker.
    pub fn oldest(&self) -> Option<ObjectId> {
        self.markers.front().copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.markers.contains(&id)
    }

    /// Projects a pointer position onto the z = 0 plane and drops a marker
    /// there, evicting the oldest marker past capacity.
    ///
    /// Returns the world point, or `None` when the pointer ray runs
    /// parallel to the plane or only meets it behind the camera.
    pub fn record(
        &mut self,
        world: &World,
        camera: &CameraRig,
        screen: Vec2,
        viewport: (u32, u32),
    ) -> Option<Vec3> {
        let point = project_to_plane(camera, screen_to_ndc(screen, viewport))?;

        let id = world.add(ObjectKind::TrailMarker, |object| {
            object.position = point;
            object.scale = Vec3::splat(MARKER_SCALE);
            object.color = MARKER_COLOR;
        });
        self.markers.push_back(id);
        if self.markers.len() > TRAIL_CAPACITY {
            if let Some(oldest) = self.markers.pop_front() {
                world.remove(oldest);
            }
        }
        Some(point)
    }
}

/// Intersects the camera ray through `ndc` with the z = 0 plane.
///
/// The similar-triangles distance `-camera.z / dir.z` is undefined for a
/// parallel ray and negative when the plane lies behind the camera; both
/// cases yield `None` instead of a bogus point.
fn project_to_plane(camera: &CameraRig, ndc: Vec2) -> Option<Vec3> {
    let target = camera.unproject_ndc(ndc, UNPROJECT_DEPTH)?;
    let dir = (target - camera.position).normalize_or_zero();
    if dir.z.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let distance = -camera.position.z / dir.z;
    if !distance.is_finite() || distance < 0.0 {
        return None;
    }
    Some(camera.position + dir * distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const VIEWPORT: (u32, u32) = (800, 600);

    fn test_camera() -> CameraRig {
        CameraRig {
            position: Vec3::new(0.0, 0.0, 30.0),
            ..CameraRig::new(800.0 / 600.0)
        }
    }

    #[test]
    fn ndc_conversion_inverts_y() {
        let ndc = screen_to_ndc(Vec2::new(0.0, 0.0), VIEWPORT);
        assert_eq!(ndc, Vec2::new(-1.0, 1.0));
        let ndc = screen_to_ndc(Vec2::new(800.0, 600.0), VIEWPORT);
        assert_eq!(ndc, Vec2::new(1.0, -1.0));
        let ndc = screen_to_ndc(Vec2::new(400.0, 300.0), VIEWPORT);
        assert!(ndc.abs().max_element() < 1e-6);
    }

    #[test]
    fn markers_land_on_the_z_zero_plane() {
        let world = World::new();
        let mut trail = PointerTrail::new();
        let point = trail
            .record(&world, &test_camera(), Vec2::new(400.0, 300.0), VIEWPORT)
            .unwrap();
        assert!(point.z.abs() < 1e-3);
        assert_eq!(world.count(ObjectKind::TrailMarker), 1);
    }

    #[test]
    fn trail_is_bounded_with_fifo_eviction() {
        let world = World::new();
        let camera = test_camera();
        let mut trail = PointerTrail::new();

        for step in 0..TRAIL_CAPACITY {
            trail.record(&world, &camera, Vec2::new(step as f32 * 10.0, 300.0), VIEWPORT);
        }
        let first = trail.oldest().unwrap();
        assert_eq!(trail.len(), TRAIL_CAPACITY);

        trail.record(&world, &camera, Vec2::new(700.0, 300.0), VIEWPORT);
        assert_eq!(trail.len(), TRAIL_CAPACITY);
        assert!(!trail.contains(first));
        assert!(!world.contains(first));
        assert_eq!(world.count(ObjectKind::TrailMarker), TRAIL_CAPACITY);
    }

    #[test]
    fn parallel_ray_adds_no_marker() {
        // Camera pitched straight up: every pointer ray is parallel to the
        // z = 0 plane.
        let camera = CameraRig {
            position: Vec3::new(0.0, 0.0, 30.0),
            rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
            ..CameraRig::new(1.0)
        };
        let world = World::new();
        let mut trail = PointerTrail::new();
        let result = trail.record(&world, &camera, Vec2::new(400.0, 400.0), (800, 800));
        assert!(result.is_none());
        assert!(trail.is_empty());
        assert!(world.is_empty());
    }

    #[test]
    fn intersection_behind_the_camera_adds_no_marker() {
        // Yawed far enough that the left-edge ray points away from the
        // z = 0 plane; its only intersection is on the ray's backward
        // extension and must not spawn a mirrored marker.
        let camera = CameraRig {
            position: Vec3::new(0.0, 0.0, 45.0),
            rotation: Vec3::new(0.0, 1.2, 0.0),
            ..CameraRig::new(1.0)
        };
        let world = World::new();
        let mut trail = PointerTrail::new();
        let result = trail.record(&world, &camera, Vec2::new(0.0, 400.0), (800, 800));
        assert!(result.is_none());
        assert!(trail.is_empty());
        assert!(world.is_empty());
    }
}
