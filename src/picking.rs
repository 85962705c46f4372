use log::info;

use crate::camera::Ray;
use crate::world::{ObjectId, ObjectKind, World, WorldObject};

/// Side effect fired when a link cube is activated.
///
/// The windowed binary opens the system browser; tests record the URL.
pub trait Navigator {
    fn navigate(&self, url: &str);
}

/// Intersection between a ray and a world object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub object: ObjectId,
    pub distance: f32,
}

/// Registered clickable object with its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTarget {
    pub object: ObjectId,
    pub name: String,
    pub url: String,
}

/// The set of interactive targets, checked independently against each
/// click's hit list.
#[derive(Debug, Default)]
pub struct LinkRegistry {
    targets: Vec<LinkTarget>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, object: ObjectId, name: impl Into<String>, url: impl Into<String>) {
        self.targets.push(LinkTarget {
            object,
            name: name.into(),
            url: url.into(),
        });
    }

    pub fn targets(&self) -> &[LinkTarget] {
        &self.targets
    }

    /// Casts the click ray into the world and fires navigation for every
    /// registered target present in the hit list.  Returns how many fired.
    pub fn dispatch(&self, world: &World, ray: &Ray, navigator: &dyn Navigator) -> usize {
        let hits = raycast(world, ray);
        let mut fired = 0;
        for target in &self.targets {
            if hits.iter().any(|hit| hit.object == target.object) {
                info!("link '{}' activated -> {}", target.name, target.url);
                navigator.navigate(&target.url);
                fired += 1;
            }
        }
        fired
    }
}

/// Intersects the ray with every solid object, nearest hit first.
pub fn raycast(world: &World, ray: &Ray) -> Vec<RayHit> {
    let mut hits: Vec<RayHit> = world
        .snapshot()
        .iter()
        .filter(|object| object.kind != ObjectKind::Light)
        .filter_map(|object| {
            intersect_unit_cube(object, ray).map(|distance| RayHit {
                object: object.id,
                distance,
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Slab test against the unit cube `[-0.5, 0.5]^3` in the object's local
/// frame.  The local ray direction is left unnormalized so the returned
/// parameter measures world-space distance along the input ray.
fn intersect_unit_cube(object: &WorldObject, ray: &Ray) -> Option<f32> {
    let inverse = object.model_matrix().inverse();
    let origin = inverse.transform_point3(ray.origin);
    let dir = inverse.transform_vector3(ray.dir);

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < 1e-8 {
            if !(-0.5..=0.5).contains(&o) {
                return None;
            }
        } else {
            let t0 = (-0.5 - o) / d;
            let t1 = (0.5 - o) / d;
            let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            t_enter = t_enter.max(near);
            t_exit = t_exit.min(far);
            if t_enter > t_exit {
                return None;
            }
        }
    }
    if t_exit < 0.0 {
        return None;
    }
    Some(t_enter.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::cell::RefCell;

    struct RecordingNavigator {
        visited: RefCell<Vec<String>>,
    }

    impl RecordingNavigator {
        fn new() -> Self {
            Self {
                visited: RefCell::new(Vec::new()),
            }
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, url: &str) {
            self.visited.borrow_mut().push(url.to_string());
        }
    }

    fn cube_at(world: &World, position: Vec3, scale: f32) -> ObjectId {
        world.add(ObjectKind::LinkCube, |object| {
            object.position = position;
            object.scale = Vec3::splat(scale);
        })
    }

    fn forward_ray() -> Ray {
        Ray {
            origin: Vec3::ZERO,
            dir: Vec3::NEG_Z,
        }
    }

    #[test]
    fn ray_hits_cube_in_front() {
        let world = World::new();
        let cube = cube_at(&world, Vec3::new(0.0, 0.0, -10.0), 2.0);
        let hits = raycast(&world, &forward_ray());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].object, cube);
        assert!((hits[0].distance - 9.0).abs() < 1e-4);
    }

    #[test]
    fn hits_are_ordered_nearest_first() {
        let world = World::new();
        let far = cube_at(&world, Vec3::new(0.0, 0.0, -20.0), 2.0);
        let near = cube_at(&world, Vec3::new(0.0, 0.0, -5.0), 2.0);
        let hits = raycast(&world, &forward_ray());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object, near);
        assert_eq!(hits[1].object, far);
    }

    #[test]
    fn cube_behind_the_origin_is_missed() {
        let world = World::new();
        cube_at(&world, Vec3::new(0.0, 0.0, 10.0), 2.0);
        assert!(raycast(&world, &forward_ray()).is_empty());
    }

    #[test]
    fn rotated_cube_is_tested_in_local_space() {
        let world = World::new();
        let cube = world.add(ObjectKind::LinkCube, |object| {
            object.position = Vec3::new(0.0, 0.0, -10.0);
            object.rotation = Vec3::new(0.0, std::f32::consts::FRAC_PI_4, 0.0);
            object.scale = Vec3::splat(2.0);
        });
        let hits = raycast(&world, &forward_ray());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].object, cube);
    }

    #[test]
    fn only_the_intersected_target_navigates() {
        let world = World::new();
        let hit_cube = cube_at(&world, Vec3::new(0.0, 0.0, -12.0), 2.0);
        let missed_cube = cube_at(&world, Vec3::new(50.0, 0.0, -12.0), 2.0);

        let mut links = LinkRegistry::new();
        links.register(hit_cube, "a", "https://example.dev/a");
        links.register(missed_cube, "b", "https://example.dev/b");

        let navigator = RecordingNavigator::new();
        let fired = links.dispatch(&world, &forward_ray(), &navigator);
        assert_eq!(fired, 1);
        assert_eq!(
            navigator.visited.into_inner(),
            vec!["https://example.dev/a".to_string()]
        );
    }

    #[test]
    fn star_in_the_way_does_not_block_the_link() {
        let world = World::new();
        world.add(ObjectKind::Star, |object| {
            object.position = Vec3::new(0.0, 0.0, -3.0);
            object.scale = Vec3::splat(0.25);
        });
        let cube = cube_at(&world, Vec3::new(0.0, 0.0, -12.0), 2.0);

        let mut links = LinkRegistry::new();
        links.register(cube, "link", "https://example.dev");
        let navigator = RecordingNavigator::new();
        assert_eq!(links.dispatch(&world, &forward_ray(), &navigator), 1);
    }
}
