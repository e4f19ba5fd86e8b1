/*
 * Flock Module
 *
 * This module owns the boid population and executes simulation ticks:
 * a collision pass over every unordered pair, then a force-accumulation and
 * integration pass over every boid. It also owns population growth/shrink
 * and produces the per-boid render records consumed by a renderer.
 *
 * Two force-pass modes are supported, because same-tick read ordering is
 * observable in the emergent dynamics:
 * - Sequential (default): boid i reads the live list, so it sees the
 *   already-integrated state of boids that came before it this tick. This
 *   matches the reference behavior and is order-dependent on purpose.
 * - Snapshot (enable_parallel): every boid reads an immutable pre-tick
 *   snapshot, which makes the pass order-independent and lets it run on
 *   rayon worker threads in chunks. The snapshot also allows the optional
 *   spatial grid, since candidate lists cannot go stale mid-pass.
 */

use glam::Vec3;
use log::debug;
use rand::Rng;
use rayon::prelude::*;

use crate::boid::Boid;
use crate::collision;
use crate::params::SimulationParams;
use crate::spatial_grid::SpatialGrid;
use crate::{MAX_BOID_SIZE, MIN_BOID_SIZE, SPAWN_REGION_FACTOR};

// Grid cells are sized to the largest interaction radius; small parameter
// jitter from a UI slider should not force a rebuild every tick
const GRID_REBUILD_THRESHOLD: f32 = 0.5;

// Everything a renderer needs for one boid. The forward direction is omitted
// while the boid is (nearly) at rest, where a heading is undefined.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderInstance {
    pub position: Vec3,
    pub forward: Option<Vec3>,
    pub scale: f32,
    pub species: usize,
}

pub struct Flock {
    pub boids: Vec<Boid>,
    // Use the pre-tick snapshot pass on rayon threads instead of the
    // sequential live-read pass
    pub enable_parallel: bool,
    // Accelerate the snapshot pass with the spatial grid; ignored in
    // sequential mode, where grid candidate lists would go stale mid-pass
    pub enable_spatial_grid: bool,
    spatial_grid: Option<SpatialGrid>,
}

impl Flock {
    pub fn new() -> Self {
        Self {
            boids: Vec::new(),
            enable_parallel: false,
            enable_spatial_grid: false,
            spatial_grid: None,
        }
    }

    // Convenience constructor that spawns an initial population
    pub fn with_population(count: usize, params: &SimulationParams) -> Self {
        let mut flock = Self::new();
        flock.set_population_target(count, params);
        flock
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    // Grow or shrink the population to the target size. New boids get a
    // uniformly random species, a random size, and a random position inside
    // a sub-volume of the bounds; shrinking truncates the tail. Calling this
    // with the current count is an exact no-op.
    pub fn set_population_target(&mut self, target: usize, params: &SimulationParams) {
        let count = self.boids.len();

        if target > count {
            let species_count = params.species_count();
            let spread = params.bounds * SPAWN_REGION_FACTOR;
            let mut rng = rand::thread_rng();

            self.boids.reserve(target - count);
            for _ in count..target {
                let species = rng.gen_range(0..species_count);
                let size = rng.gen_range(MIN_BOID_SIZE..MAX_BOID_SIZE);
                let x = rng.gen_range(-spread..spread);
                let y = rng.gen_range(-spread..spread);
                let z = rng.gen_range(-spread..spread);
                self.boids.push(Boid::new(x, y, z, species, size));
            }
            debug!("flock grew from {} to {} boids", count, target);
        } else if target < count {
            self.boids.truncate(target);
            debug!("flock truncated from {} to {} boids", count, target);
        }
    }

    // Advance the whole simulation by one tick
    pub fn step(&mut self, params: &SimulationParams) {
        collision::resolve_collisions(&mut self.boids);

        if self.enable_parallel {
            self.step_snapshot(params);
        } else {
            self.step_sequential(params);
        }
    }

    // Live-read pass: each boid is taken out, computes its forces against the
    // in-progress list, advances, and is written back before the next boid
    // runs
    fn step_sequential(&mut self, params: &SimulationParams) {
        for i in 0..self.boids.len() {
            let mut boid = self.boids[i].clone();
            let max_force = params.attributes[boid.species].max_force;

            boid.flock(&self.boids, i, params);
            boid.update(params);
            boid.avoid_edges(params.bounds, max_force);

            self.boids[i] = boid;
        }
    }

    // Snapshot pass: forces for every boid are computed against the frozen
    // pre-tick state, in parallel chunks sized to the thread pool
    fn step_snapshot(&mut self, params: &SimulationParams) {
        if self.boids.is_empty() {
            return;
        }

        let snapshot = self.boids.clone();
        let neighbor_lists = if self.enable_spatial_grid {
            Some(self.build_neighbor_lists(&snapshot, params))
        } else {
            None
        };

        let bounds = params.bounds;
        let chunk_size = std::cmp::max(self.boids.len() / rayon::current_num_threads(), 1);

        self.boids
            .par_chunks_mut(chunk_size)
            .enumerate()
            .for_each(|(chunk_index, chunk)| {
                for (offset, boid) in chunk.iter_mut().enumerate() {
                    let i = chunk_index * chunk_size + offset;
                    let max_force = params.attributes[boid.species].max_force;

                    match &neighbor_lists {
                        Some(lists) => boid.flock_neighbors(&snapshot, i, &lists[i], params),
                        None => boid.flock(&snapshot, i, params),
                    }
                    boid.update(params);
                    boid.avoid_edges(bounds, max_force);
                }
            });
    }

    // Insert the snapshot into the spatial grid and collect the candidate
    // list for every boid. The grid is rebuilt when the required cell size
    // drifts or the volume changes.
    fn build_neighbor_lists(
        &mut self,
        snapshot: &[Boid],
        params: &SimulationParams,
    ) -> Vec<Vec<usize>> {
        // The widest sensing range in play is the cross-species radius
        let cell_size = params
            .attributes
            .iter()
            .map(|attr| attr.perception_radius * 1.5)
            .fold(1.0_f32, f32::max);

        let grid = match &mut self.spatial_grid {
            Some(grid)
                if (grid.cell_size - cell_size).abs() <= GRID_REBUILD_THRESHOLD
                    && grid.bounds() == params.bounds =>
            {
                grid
            }
            slot => {
                debug!(
                    "rebuilding spatial grid: cell_size {}, bounds {}",
                    cell_size, params.bounds
                );
                slot.insert(SpatialGrid::new(cell_size, params.bounds))
            }
        };
        grid.clear();
        for (i, boid) in snapshot.iter().enumerate() {
            grid.insert(i, boid.position);
        }

        snapshot
            .iter()
            .map(|boid| grid.get_nearby_indices(boid.position))
            .collect()
    }

    // Per-boid output for the rendering collaborator, in list order
    pub fn render_instances(&self, params: &SimulationParams) -> Vec<RenderInstance> {
        self.boids
            .iter()
            .map(|boid| RenderInstance {
                position: boid.position,
                forward: if boid.velocity.length_squared() > 0.0001 {
                    Some(boid.velocity.normalize())
                } else {
                    None
                },
                scale: boid.size * params.size_multiplier,
                species: boid.species,
            })
            .collect()
    }
}

impl Default for Flock {
    fn default() -> Self {
        Self::new()
    }
}
