use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{Mat4, Vec3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Role of an object inside the world registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Star,
    LinkCube,
    Decor,
    TrailMarker,
    Light,
}

/// Stable handle to a registered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

/// Renderable object tracked by the world registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub position: Vec3,
    /// Euler angles in radians, applied Z * Y * X.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Vec3,
    pub opacity: f32,
    pub intensity: f32,
}

impl WorldObject {
    /// Local-to-world transform of the object.
    pub fn model_matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        let rotation = Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x);
        let scale = Mat4::from_scale(self.scale);
        translation * rotation * scale
    }
}

/// Thread-safe registry shared between the animation logic and the renderer.
#[derive(Debug, Default)]
pub struct World {
    objects: Arc<RwLock<Vec<WorldObject>>>,
    next_id: Arc<AtomicU64>,
}

impl Clone for World {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new object and returns its handle.
    pub fn add(&self, kind: ObjectKind, configure: impl FnOnce(&mut WorldObject)) -> ObjectId {
        let id = ObjectId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut object = WorldObject {
            id,
            kind,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Vec3::ONE,
            opacity: 1.0,
            intensity: 1.0,
        };
        configure(&mut object);
        object.id = id;
        self.objects.write().push(object);
        id
    }

    /// Removes the object, returning whether it was present.
    pub fn remove(&self, id: ObjectId) -> bool {
        let mut guard = self.objects.write();
        let before = guard.len();
        guard.retain(|object| object.id != id);
        guard.len() != before
    }

    /// Returns whether the object is registered.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.read().iter().any(|object| object.id == id)
    }

    /// Returns a clone of the requested object.
    pub fn get(&self, id: ObjectId) -> Option<WorldObject> {
        self.objects
            .read()
            .iter()
            .find(|object| object.id == id)
            .cloned()
    }

    /// Applies a mutation to the requested object.
    pub fn update<F, R>(&self, id: ObjectId, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut WorldObject) -> R,
    {
        let mut guard = self.objects.write();
        let object = guard.iter_mut().find(|object| object.id == id)?;
        Some(updater(object))
    }

    /// Returns a snapshot of all stored objects.
    pub fn snapshot(&self) -> Vec<WorldObject> {
        self.objects.read().clone()
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Number of objects of the given kind.
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects
            .read()
            .iter()
            .filter(|object| object.kind == kind)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_objects() {
        let world = World::new();
        let a = world.add(ObjectKind::Star, |_| {});
        let b = world.add(ObjectKind::LinkCube, |object| {
            object.position = Vec3::new(1.0, 2.0, 3.0);
        });
        assert_ne!(a, b);
        assert_eq!(world.len(), 2);
        assert!(world.remove(a));
        assert!(!world.remove(a));
        assert!(!world.contains(a));
        assert_eq!(world.get(b).unwrap().position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn update_modifies_object() {
        let world = World::new();
        let id = world.add(ObjectKind::Decor, |_| {});
        world.update(id, |object| object.opacity = 0.25);
        assert_eq!(world.get(id).unwrap().opacity, 0.25);
        assert!(world.update(ObjectId(9999), |_| ()).is_none());
    }

    #[test]
    fn count_filters_by_kind() {
        let world = World::new();
        for _ in 0..3 {
            world.add(ObjectKind::Star, |_| {});
        }
        world.add(ObjectKind::Light, |_| {});
        assert_eq!(world.count(ObjectKind::Star), 3);
        assert_eq!(world.count(ObjectKind::Light), 1);
    }

    #[test]
    fn model_matrix_applies_translation_and_scale() {
        let world = World::new();
        let id = world.add(ObjectKind::LinkCube, |object| {
            object.position = Vec3::new(0.0, 0.0, -10.0);
            object.scale = Vec3::splat(2.0);
        });
        let object = world.get(id).unwrap();
        let corner = object.model_matrix().transform_point3(Vec3::splat(0.5));
        assert_eq!(corner, Vec3::new(1.0, 1.0, -9.0));
    }
}
