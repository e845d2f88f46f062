//! Data models for positions and sparse position updates
//!
//! This module provides:
//! - Absolute 3-axis positions of the deposition head
//! - Partial positions for selective axis changes (unset axes carry over)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute position of the head in 3D space (mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Position {
    /// Create a new position with X, Y, Z coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Check that every axis is a finite number
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:.3} Y:{:.3} Z:{:.3}", self.x, self.y, self.z)
    }
}

/// Partial position for updating only specific axes
///
/// Each axis is an `Option` where `None` means "don't change this axis" and
/// `Some(value)` means "set to value". A `Some(0.0)` is a real move to zero,
/// never confused with an unset axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialPosition {
    /// X-axis position (if Some, update this axis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Y-axis position (if Some, update this axis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Z-axis position (if Some, update this axis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl PartialPosition {
    /// Create a new empty partial position (all axes None)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a partial position with only X axis set
    pub fn x_only(x: f64) -> Self {
        Self {
            x: Some(x),
            ..Default::default()
        }
    }

    /// Create a partial position with only Y axis set
    pub fn y_only(y: f64) -> Self {
        Self {
            y: Some(y),
            ..Default::default()
        }
    }

    /// Create a partial position with only Z axis set
    pub fn z_only(z: f64) -> Self {
        Self {
            z: Some(z),
            ..Default::default()
        }
    }

    /// Create a partial position with XY axes set
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: None,
        }
    }

    /// Create a partial position with XYZ axes set
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Apply this partial position to an existing position, updating only specified axes
    pub fn apply_to(&self, pos: &Position) -> Position {
        Position {
            x: self.x.unwrap_or(pos.x),
            y: self.y.unwrap_or(pos.y),
            z: self.z.unwrap_or(pos.z),
        }
    }

    /// Iterate over the set axes as `(axis name, value)` pairs
    pub fn set_axes(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [("x", self.x), ("y", self.y), ("z", self.z)]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
    }

    /// Count how many axes are set in this partial position
    pub fn axis_count(&self) -> usize {
        self.set_axes().count()
    }

    /// Check if this partial position is empty (no axes set)
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

impl From<Position> for PartialPosition {
    fn from(pos: Position) -> Self {
        Self::xyz(pos.x, pos.y, pos.z)
    }
}
