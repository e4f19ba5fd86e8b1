/*
 * Multi-Species Flocking Engine - Module Definitions
 *
 * This file defines the module structure for the flocking simulation engine.
 * It organizes the code into logical components for better maintainability.
 */

// Re-export key components for easier access
pub use boid::Boid;
pub use collision::resolve_collisions;
pub use flock::{Flock, RenderInstance};
pub use params::{InteractionMatrix, ParamsError, SimulationParams, SpeciesAttributes};
pub use spatial_grid::SpatialGrid;

// Define modules
pub mod boid;
pub mod collision;
pub mod flock;
pub mod params;
pub mod spatial_grid;

// Constants
pub const EDGE_MARGIN: f32 = 8.0;
pub const MIN_SPEED: f32 = 0.01;
pub const MIN_BOID_SIZE: f32 = 0.5;
pub const MAX_BOID_SIZE: f32 = 1.5;
pub const SPAWN_REGION_FACTOR: f32 = 0.9;
pub const INITIAL_SPEED: f32 = 0.1;
