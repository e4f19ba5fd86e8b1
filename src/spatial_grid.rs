/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for efficient neighbor lookups.
 * It divides the cubical simulation volume into a grid of cells, so a
 * neighbor query only has to scan the 3x3x3 block of cells around a boid
 * instead of the whole population.
 *
 * The grid returns candidate indices, not confirmed neighbors: callers still
 * apply their exact distance checks, so per-pair semantics are identical to
 * the quadratic scan. For that to hold, the cell size must be at least as
 * large as the largest interaction radius in play.
 */

use glam::Vec3;

pub struct SpatialGrid {
    pub cell_size: f32,
    pub grid: Vec<Vec<usize>>,
    pub grid_size: usize,
    half_world: f32,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, bounds: f32) -> Self {
        let world_size = bounds * 2.0;
        let grid_size = (world_size / cell_size).ceil().max(1.0) as usize;
        let grid = vec![Vec::new(); grid_size * grid_size * grid_size];

        Self {
            cell_size,
            grid,
            grid_size,
            half_world: bounds,
        }
    }

    pub fn bounds(&self) -> f32 {
        self.half_world
    }

    // Convert world coordinates to a flat grid cell index
    #[inline]
    pub fn pos_to_cell_index(&self, pos: Vec3) -> usize {
        let max_cell = self.grid_size as f32 - 1.0;
        let gx = ((pos.x + self.half_world) / self.cell_size).clamp(0.0, max_cell) as usize;
        let gy = ((pos.y + self.half_world) / self.cell_size).clamp(0.0, max_cell) as usize;
        let gz = ((pos.z + self.half_world) / self.cell_size).clamp(0.0, max_cell) as usize;

        (gz * self.grid_size + gy) * self.grid_size + gx
    }

    // Clear the grid, keeping cell allocations for reuse
    pub fn clear(&mut self) {
        for cell in &mut self.grid {
            cell.clear();
        }
    }

    // Insert a boid into the grid
    #[inline]
    pub fn insert(&mut self, boid_index: usize, position: Vec3) {
        let cell_index = self.pos_to_cell_index(position);
        self.grid[cell_index].push(boid_index);
    }

    // Get boid indices in the cell containing the given position and all
    // adjacent cells (3x3x3 block). May include the querying boid itself.
    pub fn get_nearby_indices(&self, position: Vec3) -> Vec<usize> {
        let gx = ((position.x + self.half_world) / self.cell_size).floor() as isize;
        let gy = ((position.y + self.half_world) / self.cell_size).floor() as isize;
        let gz = ((position.z + self.half_world) / self.cell_size).floor() as isize;

        let grid_size = self.grid_size as isize;
        let mut result = Vec::new();

        for z_offset in -1..=1 {
            let check_z = gz + z_offset;
            if check_z < 0 || check_z >= grid_size {
                continue;
            }

            for y_offset in -1..=1 {
                let check_y = gy + y_offset;
                if check_y < 0 || check_y >= grid_size {
                    continue;
                }

                let plane_index = (check_z * grid_size + check_y) * grid_size;

                for x_offset in -1..=1 {
                    let check_x = gx + x_offset;
                    if check_x < 0 || check_x >= grid_size {
                        continue;
                    }

                    let cell_index = (plane_index + check_x) as usize;
                    result.extend_from_slice(&self.grid[cell_index]);
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_the_whole_volume() {
        let grid = SpatialGrid::new(9.0, 50.0);
        // 100 units of world at 9 units per cell
        assert_eq!(grid.grid_size, 12);
        assert_eq!(grid.grid.len(), 12 * 12 * 12);
    }

    #[test]
    fn nearby_query_finds_neighbors_across_cells() {
        let mut grid = SpatialGrid::new(10.0, 50.0);
        // Two boids in adjacent cells, one far away
        grid.insert(0, Vec3::new(1.0, 0.0, 0.0));
        grid.insert(1, Vec3::new(-4.0, 3.0, -2.0));
        grid.insert(2, Vec3::new(45.0, 45.0, 45.0));

        let nearby = grid.get_nearby_indices(Vec3::new(1.0, 0.0, 0.0));
        assert!(nearby.contains(&0));
        assert!(nearby.contains(&1));
        assert!(!nearby.contains(&2));
    }

    #[test]
    fn positions_on_the_boundary_are_clamped_into_the_grid() {
        let mut grid = SpatialGrid::new(10.0, 50.0);
        grid.insert(0, Vec3::new(50.0, -50.0, 50.0));

        let nearby = grid.get_nearby_indices(Vec3::new(50.0, -50.0, 50.0));
        assert!(nearby.contains(&0));
    }

    #[test]
    fn clear_empties_every_cell() {
        let mut grid = SpatialGrid::new(10.0, 50.0);
        grid.insert(0, Vec3::ZERO);
        grid.insert(1, Vec3::new(20.0, 0.0, 0.0));
        grid.clear();

        assert!(grid.get_nearby_indices(Vec3::ZERO).is_empty());
        assert!(grid.get_nearby_indices(Vec3::new(20.0, 0.0, 0.0)).is_empty());
    }
}
