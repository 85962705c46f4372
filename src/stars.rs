use std::f32::consts::PI;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::scene::StarfieldConfig;
use crate::world::{ObjectId, ObjectKind, World};

const STAR_SCALE: f32 = 0.25;

/// Fade envelope over the star's lifecycle phase in `[0, 1)`.
///
/// Zero at both ends of the cycle, one at the midpoint.
pub fn intensity_at(phase: f32) -> f32 {
    (phase * PI).sin().clamp(0.0, 1.0)
}

struct StarSlot {
    id: ObjectId,
    born: f32,
}

/// Keeps a constant population of ambient stars cycling through a
/// fade-in/fade-out envelope.
///
/// A star whose cycle completes is removed from the world outright and a
/// brand-new one takes its slot; retired objects are never pooled.
pub struct Starfield {
    slots: Vec<StarSlot>,
    cycle: f32,
    spread: f32,
    rng: SmallRng,
}

impl Starfield {
    /// Spawns the initial population into the world.
    ///
    /// Initial phases are staggered across the cycle so the sky does not
    /// pulse in unison.
    pub fn populate(world: &World, config: &StarfieldConfig, now: f32, mut rng: SmallRng) -> Self {
        let mut slots = Vec::with_capacity(config.count);
        for _ in 0..config.count {
            let id = spawn_star(world, &mut rng, config.spread);
            let born = now - rng.random_range(0.0..config.cycle.max(f32::EPSILON));
            slots.push(StarSlot { id, born });
        }
        Self {
            slots,
            cycle: config.cycle,
            spread: config.spread,
            rng,
        }
    }

    /// Number of live stars; constant for the lifetime of the field.
    pub fn population(&self) -> usize {
        self.slots.len()
    }

    /// Advances every star to the given time.
    ///
    /// Stars at or past the end of their cycle are retired and replaced;
    /// all others get the envelope written as grayscale color and opacity.
    pub fn update(&mut self, world: &World, now: f32) {
        let cycle = self.cycle;
        let spread = self.spread;
        for slot in &mut self.slots {
            let elapsed = now - slot.born;
            if elapsed >= cycle {
                world.remove(slot.id);
                slot.id = spawn_star(world, &mut self.rng, spread);
                slot.born = now;
            } else {
                let intensity = intensity_at(elapsed / cycle);
                world.update(slot.id, |object| {
                    object.color = Vec3::splat(intensity);
                    object.opacity = intensity;
                });
            }
        }
    }
}

fn spawn_star(world: &World, rng: &mut SmallRng, spread: f32) -> ObjectId {
    let half = (spread / 2.0).max(f32::EPSILON);
    let position = Vec3::new(
        rng.random_range(-half..half),
        rng.random_range(-half..half),
        rng.random_range(-half..half),
    );
    world.add(ObjectKind::Star, |object| {
        object.position = position;
        object.scale = Vec3::splat(STAR_SCALE);
        object.color = Vec3::ZERO;
        object.opacity = 0.0;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn test_field(world: &World, count: usize, cycle: f32) -> Starfield {
        let config = StarfieldConfig {
            count,
            cycle,
            spread: 100.0,
        };
        Starfield::populate(world, &config, 0.0, SmallRng::seed_from_u64(7))
    }

    #[test]
    fn envelope_is_bounded_and_peaks_at_midpoint() {
        assert!(intensity_at(0.0).abs() < 1e-6);
        assert!((intensity_at(0.5) - 1.0).abs() < 1e-6);
        assert!(intensity_at(0.999).abs() < 0.01);
        for step in 0..=100 {
            let intensity = intensity_at(step as f32 / 100.0);
            assert!((0.0..=1.0).contains(&intensity));
        }
    }

    #[test]
    fn population_is_invariant_across_many_updates() {
        let world = World::new();
        let mut field = test_field(&world, 200, 3.0);
        assert_eq!(world.count(ObjectKind::Star), 200);
        for frame in 0..600 {
            field.update(&world, frame as f32 * 0.016);
        }
        assert_eq!(field.population(), 200);
        assert_eq!(world.count(ObjectKind::Star), 200);
    }

    #[test]
    fn star_is_replaced_when_cycle_elapses() {
        let world = World::new();
        let mut field = test_field(&world, 1, 3.0);
        let old_id = field.slots[0].id;
        field.slots[0].born = 0.0;

        // Inclusive boundary: elapsed == cycle retires the star that frame.
        field.update(&world, 3.0);
        let new_id = field.slots[0].id;
        assert_ne!(old_id, new_id);
        assert!(!world.contains(old_id));
        assert!(world.contains(new_id));
        assert_eq!(field.slots[0].born, 3.0);
    }

    #[test]
    fn update_writes_intensity_as_color_and_opacity() {
        let world = World::new();
        let mut field = test_field(&world, 1, 4.0);
        field.slots[0].born = 0.0;
        field.update(&world, 2.0);
        let star = world.get(field.slots[0].id).unwrap();
        assert!((star.opacity - 1.0).abs() < 1e-6);
        assert_eq!(star.color, Vec3::splat(star.opacity));
    }

    #[test]
    fn stars_spawn_inside_the_spread_cube() {
        let world = World::new();
        let _field = test_field(&world, 50, 3.0);
        for object in world.snapshot() {
            assert!(object.position.abs().max_element() <= 50.0);
        }
    }
}
