use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::world::{ObjectId, World};

/// How far the camera dollies along Z per unit of scroll offset.
const CAMERA_DOLLY_PER_OFFSET: f32 = -0.01;
/// Horizontal drift and yaw per unit of scroll offset.
const CAMERA_DRIFT_PER_OFFSET: f32 = -0.0002;
/// Parallax shift of the decorative mesh per unit of scroll delta.
const PARALLAX_PER_DELTA: f32 = 0.03;
/// Rotation added to each link cube on every scroll invocation.
const SCROLL_CUBE_SPIN: Vec3 = Vec3::new(0.0, 0.01, 0.01);
/// Rotation added to the decorative mesh on every scroll invocation.
const SCROLL_DECOR_SPIN: Vec3 = Vec3::new(0.05, 0.0, 0.0);

/// World-space ray used for hit-testing and trail projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Camera pose plus projection parameters.
///
/// Rotation is stored in radians so the scroll mapping constants apply
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub rotation: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
}

impl CameraRig {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov_degrees: 75.0,
            aspect,
        }
    }

    /// Updates the projection aspect ratio from viewport dimensions.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Combined view-projection matrix for the current pose.
    pub fn view_proj(&self) -> Mat4 {
        let rotation = Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x);
        let forward = (rotation * Vec3::NEG_Z.extend(0.0)).truncate();
        let up = (rotation * Vec3::Y.extend(0.0)).truncate();
        let target = if forward.length_squared() > f32::EPSILON {
            self.position + forward.normalize()
        } else {
            self.position + Vec3::NEG_Z
        };
        let view = Mat4::look_at_rh(self.position, target, up);
        let projection =
            Mat4::perspective_rh_gl(self.fov_degrees.to_radians(), self.aspect.max(0.01), 0.1, 1000.0);
        projection * view
    }

    /// Maps a normalized-device-coordinate point (with NDC depth in -1..1)
    /// back into world space through the inverse camera transform.
    pub fn unproject_ndc(&self, ndc: Vec2, depth: f32) -> Option<Vec3> {
        let inverse = self.view_proj().inverse();
        let world = inverse * Vec4::new(ndc.x, ndc.y, depth, 1.0);
        if world.w.abs() <= f32::EPSILON {
            return None;
        }
        Some(world.truncate() / world.w)
    }

    /// Builds the world-space ray passing through the given screen point.
    pub fn ray_through(&self, ndc: Vec2) -> Option<Ray> {
        let point = self.unproject_ndc(ndc, 0.5)?;
        let dir = point - self.position;
        if dir.length_squared() <= f32::EPSILON {
            return None;
        }
        Some(Ray {
            origin: self.position,
            dir: dir.normalize(),
        })
    }
}

/// Maps the page scroll offset onto the camera pose and the decorative
/// mesh parallax.
///
/// The offset convention follows a web page scroll: zero at the top,
/// growing negative while scrolling down.  Parallax is proportional to the
/// delta since the previous invocation, not the absolute offset.  The
/// fixed per-call spin constants are scroll-event-rate-coupled on purpose.
#[derive(Debug, Default)]
pub struct ScrollMapper {
    last_offset: f32,
}

impl ScrollMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last offset seen by `apply`.
    pub fn last_offset(&self) -> f32 {
        self.last_offset
    }

    /// Applies the scroll mapping for the given absolute offset.
    pub fn apply(
        &mut self,
        world: &World,
        camera: &mut CameraRig,
        decor: ObjectId,
        cubes: &[ObjectId],
        offset: f32,
    ) {
        camera.position.z = offset * CAMERA_DOLLY_PER_OFFSET;
        camera.position.x = offset * CAMERA_DRIFT_PER_OFFSET;
        camera.rotation.y = offset * CAMERA_DRIFT_PER_OFFSET;

        let delta = self.last_offset - offset;
        world.update(decor, |object| {
            object.position.x -= delta * PARALLAX_PER_DELTA;
            object.rotation += SCROLL_DECOR_SPIN;
        });
        for &cube in cubes {
            world.update(cube, |object| object.rotation += SCROLL_CUBE_SPIN);
        }
        self.last_offset = offset;
    }
}
