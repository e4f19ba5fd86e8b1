/*
 * Simulation Parameters Module
 *
 * This module defines the per-species attribute table, the species x species
 * interaction matrix, and the SimulationParams struct that aggregates all the
 * adjustable parameters for the simulation. These parameters are owned by the
 * caller (typically a UI) and read by the engine every tick; the engine never
 * writes to them.
 */

use std::fmt;

// Tunable attributes shared by every member of one species
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesAttributes {
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub perception_radius: f32,
}

impl Default for SpeciesAttributes {
    fn default() -> Self {
        Self {
            separation_weight: 1.0,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            max_speed: 0.5,
            max_force: 0.01,
            perception_radius: 5.0,
        }
    }
}

// Signed weight table driving cross-species attraction/repulsion.
// Entry (actor, target) > 0 means the actor steers toward that species,
// < 0 means it steers away, 0 disables the interaction. The diagonal is
// unused: same-species behavior is governed by the three classic forces.
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionMatrix {
    species_count: usize,
    weights: Vec<f32>,
}

impl InteractionMatrix {
    // Create a neutral (all-zero) matrix for the given species count
    pub fn new(species_count: usize) -> Self {
        Self {
            species_count,
            weights: vec![0.0; species_count * species_count],
        }
    }

    // Build a matrix from explicit rows, validating that it is square
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, ParamsError> {
        let species_count = rows.len();
        let mut weights = Vec::with_capacity(species_count * species_count);
        for row in &rows {
            if row.len() != species_count {
                return Err(ParamsError::MatrixNotSquare {
                    rows: species_count,
                    row_len: row.len(),
                });
            }
            weights.extend_from_slice(row);
        }
        Ok(Self {
            species_count,
            weights,
        })
    }

    pub fn species_count(&self) -> usize {
        self.species_count
    }

    // Out-of-range indices are a construction bug elsewhere; the slice
    // indexing panics rather than clamping and masking it.
    #[inline]
    pub fn get(&self, actor: usize, target: usize) -> f32 {
        assert!(actor < self.species_count && target < self.species_count);
        self.weights[actor * self.species_count + target]
    }

    #[inline]
    pub fn set(&mut self, actor: usize, target: usize, weight: f32) {
        assert!(actor < self.species_count && target < self.species_count);
        self.weights[actor * self.species_count + target] = weight;
    }

    // The full row of weights for one actor species
    #[inline]
    pub fn row(&self, actor: usize) -> &[f32] {
        let start = actor * self.species_count;
        &self.weights[start..start + self.species_count]
    }
}

// All adjustable parameters for the simulation. Shared with an external
// controller which may mutate any field between ticks; the engine re-reads
// current values every tick and caches nothing.
#[derive(Clone, Debug)]
pub struct SimulationParams {
    pub attributes: Vec<SpeciesAttributes>,
    pub interactions: InteractionMatrix,
    // Half-extent of the cubical simulation volume, centered at the origin
    pub bounds: f32,
    pub speed_multiplier: f32,
    pub size_multiplier: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        // Four species with slightly different traits
        let attributes = vec![
            SpeciesAttributes {
                max_speed: 0.6,
                perception_radius: 6.0,
                ..Default::default()
            },
            SpeciesAttributes {
                max_speed: 0.5,
                perception_radius: 5.0,
                ..Default::default()
            },
            SpeciesAttributes {
                max_speed: 0.4,
                perception_radius: 4.0,
                ..Default::default()
            },
            SpeciesAttributes {
                max_speed: 0.55,
                perception_radius: 5.5,
                ..Default::default()
            },
        ];
        let interactions = InteractionMatrix::new(attributes.len());

        Self {
            attributes,
            interactions,
            bounds: 50.0,
            speed_multiplier: 1.0,
            size_multiplier: 1.0,
        }
    }
}

impl SimulationParams {
    // Validating constructor for custom species sets
    pub fn new(
        attributes: Vec<SpeciesAttributes>,
        interactions: InteractionMatrix,
        bounds: f32,
    ) -> Result<Self, ParamsError> {
        let params = Self {
            attributes,
            interactions,
            bounds,
            speed_multiplier: 1.0,
            size_multiplier: 1.0,
        };
        params.validate()?;
        Ok(params)
    }

    // Check the cross-field invariants that indexing relies on. Called at
    // construction; callers that mutate fields directly can re-check here.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.attributes.is_empty() {
            return Err(ParamsError::NoSpecies);
        }
        if self.interactions.species_count() != self.attributes.len() {
            return Err(ParamsError::MatrixDimensionMismatch {
                species: self.attributes.len(),
                matrix: self.interactions.species_count(),
            });
        }
        for (species, attr) in self.attributes.iter().enumerate() {
            if attr.max_speed <= 0.0
                || attr.max_force <= 0.0
                || attr.perception_radius <= 0.0
            {
                return Err(ParamsError::NonPositiveAttribute { species });
            }
            if attr.separation_weight < 0.0
                || attr.alignment_weight < 0.0
                || attr.cohesion_weight < 0.0
            {
                return Err(ParamsError::NegativeWeight { species });
            }
        }
        if self.bounds <= 0.0 {
            return Err(ParamsError::InvalidBounds(self.bounds));
        }
        if self.speed_multiplier <= 0.0 || self.size_multiplier <= 0.0 {
            return Err(ParamsError::InvalidMultiplier);
        }
        Ok(())
    }

    pub fn species_count(&self) -> usize {
        self.attributes.len()
    }

    // Get parameter ranges for UI sliders
    pub fn get_weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=3.0
    }

    pub fn get_max_speed_range() -> std::ops::RangeInclusive<f32> {
        0.1..=2.0
    }

    pub fn get_max_force_range() -> std::ops::RangeInclusive<f32> {
        0.001..=0.1
    }

    pub fn get_perception_radius_range() -> std::ops::RangeInclusive<f32> {
        1.0..=20.0
    }

    pub fn get_interaction_range() -> std::ops::RangeInclusive<f32> {
        -1.0..=1.0
    }

    pub fn get_multiplier_range() -> std::ops::RangeInclusive<f32> {
        0.1..=3.0
    }
}

// Errors detectable when constructing or validating parameters
#[derive(Debug, PartialEq)]
pub enum ParamsError {
    // The species attribute list is empty
    NoSpecies,
    // The interaction matrix rows are not all the same length as the row count
    MatrixNotSquare { rows: usize, row_len: usize },
    // The matrix dimension does not match the species attribute list
    MatrixDimensionMismatch { species: usize, matrix: usize },
    // max_speed, max_force or perception_radius is zero or negative
    NonPositiveAttribute { species: usize },
    // One of the three steering weights is negative
    NegativeWeight { species: usize },
    // The volume half-extent is zero or negative
    InvalidBounds(f32),
    // speed_multiplier or size_multiplier is zero or negative
    InvalidMultiplier,
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsError::NoSpecies => write!(f, "at least one species is required"),
            ParamsError::MatrixNotSquare { rows, row_len } => write!(
                f,
                "interaction matrix is not square: {} rows but a row of length {}",
                rows, row_len
            ),
            ParamsError::MatrixDimensionMismatch { species, matrix } => write!(
                f,
                "interaction matrix is {0}x{0} but there are {1} species",
                matrix, species
            ),
            ParamsError::NonPositiveAttribute { species } => write!(
                f,
                "species {} has a non-positive max_speed, max_force or perception_radius",
                species
            ),
            ParamsError::NegativeWeight { species } => {
                write!(f, "species {} has a negative steering weight", species)
            }
            ParamsError::InvalidBounds(bounds) => {
                write!(f, "bounds must be positive, got {}", bounds)
            }
            ParamsError::InvalidMultiplier => {
                write!(f, "speed and size multipliers must be positive")
            }
        }
    }
}

impl std::error::Error for ParamsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        let params = SimulationParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.species_count(), 4);
        assert_eq!(params.interactions.species_count(), 4);
    }

    #[test]
    fn matrix_rows_round_trip() {
        let matrix = InteractionMatrix::from_rows(vec![
            vec![0.0, 0.5],
            vec![-0.5, 0.0],
        ])
        .unwrap();
        assert_eq!(matrix.get(0, 1), 0.5);
        assert_eq!(matrix.get(1, 0), -0.5);
        assert_eq!(matrix.row(1), &[-0.5, 0.0]);
    }

    #[test]
    fn non_square_matrix_is_rejected() {
        let err = InteractionMatrix::from_rows(vec![vec![0.0, 1.0], vec![0.0]]).unwrap_err();
        assert_eq!(
            err,
            ParamsError::MatrixNotSquare {
                rows: 2,
                row_len: 1
            }
        );
    }

    #[test]
    fn matrix_dimension_mismatch_is_rejected() {
        let err = SimulationParams::new(
            vec![SpeciesAttributes::default(); 3],
            InteractionMatrix::new(2),
            50.0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParamsError::MatrixDimensionMismatch {
                species: 3,
                matrix: 2
            }
        );
    }

    #[test]
    fn degenerate_attributes_are_rejected() {
        let mut params = SimulationParams::default();
        params.attributes[2].perception_radius = 0.0;
        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::NonPositiveAttribute { species: 2 }
        );

        let mut params = SimulationParams::default();
        params.attributes[0].cohesion_weight = -1.0;
        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::NegativeWeight { species: 0 }
        );

        let mut params = SimulationParams::default();
        params.bounds = -10.0;
        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::InvalidBounds(-10.0)
        );
    }

    #[test]
    #[should_panic]
    fn out_of_range_species_index_panics() {
        let matrix = InteractionMatrix::new(4);
        matrix.get(4, 0);
    }
}
