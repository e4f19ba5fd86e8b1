/*
 * Collision Resolution Module
 *
 * This module prevents overlap between any two boids each tick, independent
 * of species and flocking forces. Every unordered pair is checked once per
 * tick in a single quadratic pass: overlapping boids are pushed apart
 * symmetrically and, when they are still closing on each other, exchange an
 * equal-and-opposite impulse along the contact normal (a perfectly inelastic
 * 1D collision along that axis).
 *
 * Deep interpenetration among more than two boids is only partially corrected
 * per tick and converges over multiple ticks; there is no iterative solving.
 */

use crate::boid::Boid;

// Resolve a single pair. Coincident positions have no separation axis and are
// left alone rather than being given an arbitrary one.
pub fn resolve_pair(a: &mut Boid, b: &mut Boid) {
    let min_distance = (a.size + b.size) * 0.25;
    let diff = a.position - b.position;
    let distance = diff.length();

    if distance > 0.0 && distance < min_distance {
        let axis = diff / distance;

        // Symmetric positional correction restores exactly min_distance
        let overlap = min_distance - distance;
        let push = axis * (overlap * 0.5);
        a.position += push;
        b.position -= push;

        // Velocity response only when the pair is closing
        let closing = (a.velocity - b.velocity).dot(axis);
        if closing < 0.0 {
            let impulse = axis * closing;
            a.velocity -= impulse;
            b.velocity += impulse;
        }
    }
}

// Run the collision pass over the whole population
pub fn resolve_collisions(boids: &mut [Boid]) {
    for i in 0..boids.len() {
        for j in (i + 1)..boids.len() {
            let (head, tail) = boids.split_at_mut(j);
            resolve_pair(&mut head[i], &mut tail[0]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn boid_at(position: Vec3, velocity: Vec3, size: f32) -> Boid {
        Boid {
            position,
            velocity,
            acceleration: Vec3::ZERO,
            species: 0,
            size,
        }
    }

    #[test]
    fn overlapping_pair_is_pushed_to_min_distance() {
        // min_distance = (1 + 1) * 0.25 = 0.5, pair starts 0.2 apart
        let mut a = boid_at(Vec3::ZERO, Vec3::ZERO, 1.0);
        let mut b = boid_at(Vec3::new(0.2, 0.0, 0.0), Vec3::ZERO, 1.0);

        resolve_pair(&mut a, &mut b);

        let separation = a.position.distance(b.position);
        assert!((separation - 0.5).abs() < 1e-5);
        // Symmetric correction
        assert!((a.position.x + 0.15).abs() < 1e-5);
        assert!((b.position.x - 0.35).abs() < 1e-5);
    }

    #[test]
    fn one_pass_strictly_increases_separation() {
        let mut a = boid_at(Vec3::ZERO, Vec3::ZERO, 1.2);
        let mut b = boid_at(Vec3::new(0.1, 0.1, 0.0), Vec3::ZERO, 0.8);
        let before = a.position.distance(b.position);

        resolve_pair(&mut a, &mut b);

        assert!(a.position.distance(b.position) > before);
    }

    #[test]
    fn closing_pair_exchanges_equal_and_opposite_impulse() {
        let va = Vec3::new(0.3, 0.0, 0.0);
        let vb = Vec3::new(-0.3, 0.0, 0.0);
        let mut a = boid_at(Vec3::ZERO, va, 1.0);
        let mut b = boid_at(Vec3::new(0.3, 0.0, 0.0), vb, 1.0);

        resolve_pair(&mut a, &mut b);

        let delta_a = a.velocity - va;
        let delta_b = b.velocity - vb;
        assert!((delta_a + delta_b).length() < 1e-6);
        assert!(delta_a.length() > 0.0);
        // Momentum is conserved
        assert!((a.velocity + b.velocity).length() < 1e-6);
    }

    #[test]
    fn separating_pair_keeps_velocities() {
        // Overlapping but already moving apart: position corrected, no impulse
        let va = Vec3::new(-0.2, 0.0, 0.0);
        let vb = Vec3::new(0.2, 0.0, 0.0);
        let mut a = boid_at(Vec3::ZERO, va, 1.0);
        let mut b = boid_at(Vec3::new(0.3, 0.0, 0.0), vb, 1.0);

        resolve_pair(&mut a, &mut b);

        assert_eq!(a.velocity, va);
        assert_eq!(b.velocity, vb);
        assert!((a.position.distance(b.position) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn coincident_pair_is_untouched() {
        let mut a = boid_at(Vec3::ONE, Vec3::new(0.1, 0.0, 0.0), 1.0);
        let mut b = boid_at(Vec3::ONE, Vec3::new(-0.1, 0.0, 0.0), 1.0);

        resolve_pair(&mut a, &mut b);

        assert_eq!(a.position, Vec3::ONE);
        assert_eq!(b.position, Vec3::ONE);
        assert_eq!(a.velocity.x, 0.1);
        assert_eq!(b.velocity.x, -0.1);
    }

    #[test]
    fn distant_pair_is_untouched() {
        let mut a = boid_at(Vec3::ZERO, Vec3::ZERO, 1.0);
        let mut b = boid_at(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, 1.0);

        resolve_pair(&mut a, &mut b);

        assert_eq!(b.position.x, 5.0);
    }

    #[test]
    fn full_pass_visits_every_pair() {
        // Three boids stacked along x, each overlapping its neighbor
        let mut boids = vec![
            boid_at(Vec3::ZERO, Vec3::ZERO, 1.0),
            boid_at(Vec3::new(0.3, 0.0, 0.0), Vec3::ZERO, 1.0),
            boid_at(Vec3::new(0.6, 0.0, 0.0), Vec3::ZERO, 1.0),
        ];

        resolve_collisions(&mut boids);

        // The outer boids are driven outward by the middle one
        assert!(boids[0].position.x < 0.0);
        assert!(boids[2].position.x > 0.6);
    }
}
