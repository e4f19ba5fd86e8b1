/*
 * Boid Module
 *
 * This module defines the Boid struct and its per-tick behavior.
 * Each boid follows three main rules with respect to its own species:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 *
 * Boids of other species are handled through the interaction matrix instead:
 * a signed weight per species pair attracts or repels, falling off with
 * distance.
 */

use glam::Vec3;
use rand::Rng;

use crate::params::SimulationParams;
use crate::{EDGE_MARGIN, INITIAL_SPEED, MIN_SPEED};

#[derive(Clone, Debug, PartialEq)]
pub struct Boid {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    // Index into the species attribute table; never changes after creation
    pub species: usize,
    pub size: f32,
}

impl Boid {
    pub fn new(x: f32, y: f32, z: f32, species: usize, size: f32) -> Self {
        let mut rng = rand::thread_rng();

        // Random initial heading at a gentle speed
        let direction = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let velocity = direction.try_normalize().unwrap_or(Vec3::X) * INITIAL_SPEED;

        Self {
            position: Vec3::new(x, y, z),
            velocity,
            acceleration: Vec3::ZERO,
            species,
            size,
        }
    }

    // Apply a force to the boid
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    // Accumulate flocking forces from every other boid in the list.
    // Mutates only the acceleration accumulator.
    pub fn flock(&mut self, others: &[Boid], self_index: usize, params: &SimulationParams) {
        self.accumulate_forces(others, self_index, 0..others.len(), params);
    }

    // Same as flock, but only considers the given candidate indices. Used by
    // the spatial grid path; candidates must cover every boid within the
    // largest interaction radius, and may safely include extras (and self).
    pub fn flock_neighbors(
        &mut self,
        others: &[Boid],
        self_index: usize,
        neighbors: &[usize],
        params: &SimulationParams,
    ) {
        self.accumulate_forces(others, self_index, neighbors.iter().copied(), params);
    }

    fn accumulate_forces(
        &mut self,
        others: &[Boid],
        self_index: usize,
        candidates: impl Iterator<Item = usize>,
        params: &SimulationParams,
    ) {
        let attr = &params.attributes[self.species];
        let interaction_row = params.interactions.row(self.species);

        let mut separation = Vec3::ZERO;
        let mut alignment = Vec3::ZERO;
        let mut cohesion = Vec3::ZERO;
        let mut inter_species = Vec3::ZERO;

        let mut same_total = 0;
        let mut inter_total = 0;

        for i in candidates {
            if i == self_index {
                continue;
            }
            let other = &others[i];
            let dist = self.position.distance(other.position);

            if other.species == self.species {
                // Same species: standard flocking
                if dist < attr.perception_radius {
                    // Separation, with a steeper falloff for very close neighbors
                    if dist < attr.perception_radius * 0.5 && dist > 0.0 {
                        separation += (self.position - other.position) / (dist * dist);
                    }
                    alignment += other.velocity;
                    cohesion += other.position;
                    same_total += 1;
                }
            } else if dist < attr.perception_radius * 1.5 {
                // Different species: interaction matrix.
                // Positive weight = attract, negative = repel. Coincident
                // positions have no defined direction and contribute nothing.
                let weight = interaction_row[other.species];
                if weight != 0.0 && dist > 0.0 {
                    let mut diff =
                        (other.position - self.position).normalize() * weight.abs();
                    if weight < 0.0 {
                        diff = -diff;
                    }

                    // Inverse-distance law for interaction strength, floored at 1
                    diff /= f32::max(1.0, dist * 0.2);
                    inter_species += diff;
                    inter_total += 1;
                }
            }
        }

        if same_total > 0 {
            let count = same_total as f32;
            let separation = self.steer_towards(
                separation / count,
                attr.max_speed,
                attr.max_force * attr.separation_weight,
            );
            let alignment = self.steer_towards(
                alignment / count,
                attr.max_speed,
                attr.max_force * attr.alignment_weight,
            );
            // Cohesion steers towards the average position, so the desired
            // direction is seeded from the offset to that target
            let cohesion = self.steer_towards(
                cohesion / count - self.position,
                attr.max_speed,
                attr.max_force * attr.cohesion_weight,
            );

            self.apply_force(separation);
            self.apply_force(alignment);
            self.apply_force(cohesion);
        }

        if inter_total > 0 {
            let averaged = inter_species / inter_total as f32;
            self.apply_force(averaged.clamp_length_max(attr.max_force * 2.0));
        }
    }

    // Implement Reynolds: Steering = Desired - Velocity, clamped to the force
    // limit. A zero-length desired direction yields no force (normalizing it
    // would produce NaN).
    fn steer_towards(&self, desired_direction: Vec3, max_speed: f32, max_force: f32) -> Vec3 {
        if desired_direction.length_squared() > 0.0 {
            (desired_direction.normalize() * max_speed - self.velocity)
                .clamp_length_max(max_force)
        } else {
            Vec3::ZERO
        }
    }

    // Gradual edge avoidance plus a hard safety clamp.
    // Soft tier: within EDGE_MARGIN of any face of the cube, assign an inward
    // steering force on that axis (the later face check wins per axis).
    // Hard tier: a coordinate at or past the boundary is clamped exactly to it
    // and that velocity component bounces inelastically, losing half its energy.
    pub fn avoid_edges(&mut self, bounds: f32, max_force: f32) {
        let force = max_force * 5.0;
        let mut steer = Vec3::ZERO;

        if self.position.x > bounds - EDGE_MARGIN {
            steer.x = -force;
        }
        if self.position.x < -bounds + EDGE_MARGIN {
            steer.x = force;
        }
        if self.position.y > bounds - EDGE_MARGIN {
            steer.y = -force;
        }
        if self.position.y < -bounds + EDGE_MARGIN {
            steer.y = force;
        }
        if self.position.z > bounds - EDGE_MARGIN {
            steer.z = -force;
        }
        if self.position.z < -bounds + EDGE_MARGIN {
            steer.z = force;
        }

        self.acceleration += steer;

        // Hard safety
        if self.position.x >= bounds {
            self.position.x = bounds;
            self.velocity.x *= -0.5;
        }
        if self.position.x <= -bounds {
            self.position.x = -bounds;
            self.velocity.x *= -0.5;
        }
        if self.position.y >= bounds {
            self.position.y = bounds;
            self.velocity.y *= -0.5;
        }
        if self.position.y <= -bounds {
            self.position.y = -bounds;
            self.velocity.y *= -0.5;
        }
        if self.position.z >= bounds {
            self.position.z = bounds;
            self.velocity.z *= -0.5;
        }
        if self.position.z <= -bounds {
            self.position.z = -bounds;
            self.velocity.z *= -0.5;
        }
    }

    // Integrate one tick: consume the accumulated acceleration, clamp the
    // speed into [MIN_SPEED, max_speed * speed_multiplier], advance the
    // position, and reset the accumulator. The lower clamp keeps boids from
    // stalling to a standstill, which would leave their heading undefined.
    pub fn update(&mut self, params: &SimulationParams) {
        let attr = &params.attributes[self.species];
        let max_speed = attr.max_speed * params.speed_multiplier;

        self.velocity += self.acceleration;

        // An exactly zero velocity cannot be rescaled; it stays at rest and
        // the renderer skips the heading for this boid
        if self.velocity.length_squared() > 0.0 {
            self.velocity = self.velocity.clamp_length(MIN_SPEED, max_speed);
        }

        self.position += self.velocity;
        self.acceleration = Vec3::ZERO;
    }
}
