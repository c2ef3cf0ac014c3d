//! Coordinate axes conventions.
//!
//! A coordinate tuple on its own is ambiguous: the same numbers may be voxel
//! indices, normalized cube coordinates or physical positions. [`Axes`] names
//! the convention so that points can be converted between grids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::grid::Grid;
use crate::error::{Result, SpatialError};

/// Coordinate axes with respect to which point coordinates are defined.
///
/// All conventions order coordinates `(x, y, z)`, i.e. fastest varying grid
/// dimension first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axes {
    /// Continuous voxel indices along the grid axes.
    Grid,
    /// Normalized coordinates with -1 and 1 at the outer grid borders.
    Cube,
    /// Normalized coordinates with -1 and 1 at the centers of the corner voxels.
    CubeCorners,
    /// Physical world coordinates.
    World,
}

impl Axes {
    /// Normalized cube axes matching the corner alignment of `grid`.
    pub fn from_grid<const D: usize>(grid: &Grid<D>) -> Self {
        if grid.align_corners() {
            Axes::CubeCorners
        } else {
            Axes::Cube
        }
    }

    /// Normalize an axes argument given either as [`Axes`] or as identifier.
    pub fn from_arg(arg: impl IntoAxes) -> Result<Self> {
        arg.into_axes()
    }

    /// Identifier of these axes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Axes::Grid => "grid",
            Axes::Cube => "cube",
            Axes::CubeCorners => "cube_corners",
            Axes::World => "world",
        }
    }

    /// Whether these are normalized cube axes.
    pub fn is_cube(&self) -> bool {
        matches!(self, Axes::Cube | Axes::CubeCorners)
    }
}

impl fmt::Display for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axes {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(Axes::Grid),
            "cube" => Ok(Axes::Cube),
            "cube_corners" => Ok(Axes::CubeCorners),
            "world" => Ok(Axes::World),
            _ => Err(SpatialError::invalid_axes(format!(
                "'{}' is not one of 'grid', 'cube', 'cube_corners', 'world'",
                s
            ))),
        }
    }
}

/// Conversion of an axes argument into [`Axes`].
pub trait IntoAxes {
    fn into_axes(self) -> Result<Axes>;
}

impl IntoAxes for Axes {
    fn into_axes(self) -> Result<Axes> {
        Ok(self)
    }
}

impl IntoAxes for &str {
    fn into_axes(self) -> Result<Axes> {
        self.parse()
    }
}

impl IntoAxes for String {
    fn into_axes(self) -> Result<Axes> {
        self.parse()
    }
}
