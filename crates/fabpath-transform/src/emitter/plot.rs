//! Path geometry for viewers.
//!
//! Every waypoint becomes exactly one [`PathSegment`], including zero-length
//! ones, tagged with the deposition flag in effect while the head moved.

use super::{EmissionUnit, Emitter};
use crate::state::DeviceState;
use crate::step::Step;
use fabpath_core::{Position, TransformError};
use serde::{Deserialize, Serialize};

/// A straight move between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub start: Position,
    pub end: Position,
    /// Whether material was being deposited during the move
    pub deposition: bool,
}

impl PathSegment {
    pub fn new(start: Position, end: Position, deposition: bool) -> Self {
        Self {
            start,
            end,
            deposition,
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn is_zero_length(&self) -> bool {
        self.start == self.end
    }
}

/// Axis-aligned box around all segment endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotBounds {
    pub min: Position,
    pub max: Position,
}

impl PlotBounds {
    fn around(point: Position) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    fn include(&mut self, point: Position) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }
}

/// Ordered path segments of a design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub segments: Vec<PathSegment>,
}

impl PlotData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Bounding box of every segment endpoint, `None` when there are no segments.
    pub fn bounds(&self) -> Option<PlotBounds> {
        let mut points = self.segments.iter().flat_map(|s| [s.start, s.end]);
        let mut bounds = PlotBounds::around(points.next()?);
        for point in points {
            bounds.include(point);
        }
        Some(bounds)
    }

    /// Total length of segments laid down with deposition on
    pub fn deposition_length(&self) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.deposition)
            .map(PathSegment::length)
            .sum()
    }

    /// Total length of travel segments
    pub fn travel_length(&self) -> f64 {
        self.segments
            .iter()
            .filter(|s| !s.deposition)
            .map(PathSegment::length)
            .sum()
    }

    /// Serialize for a rendering collaborator.
    pub fn to_json(&self) -> fabpath_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Emitter for the `plot` target.
#[derive(Debug, Clone, Default)]
pub struct PlotEmitter {
    plot: PlotData,
}

impl PlotEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Emitter for PlotEmitter {
    fn name(&self) -> &str {
        "plot"
    }

    fn consume(
        &mut self,
        step: &Step,
        prior: &DeviceState,
        next: &DeviceState,
    ) -> Result<(), TransformError> {
        match step {
            Step::Waypoint(_) => {
                self.plot.segments.push(PathSegment::new(
                    prior.position,
                    next.position,
                    prior.deposition_active,
                ));
            }
            Step::Deposition { .. }
            | Step::Speed(_)
            | Step::ExtrusionGeometry(_)
            | Step::Tool { .. }
            | Step::Comment { .. }
            | Step::ManualCode { .. } => {}
        }
        Ok(())
    }

    fn finalize(self: Box<Self>) -> EmissionUnit {
        EmissionUnit::Plot(self.plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> PlotData {
        PlotData {
            segments: vec![
                PathSegment::new(Position::new(0.0, 0.0, 0.2), Position::new(10.0, 0.0, 0.2), false),
                PathSegment::new(Position::new(10.0, 0.0, 0.2), Position::new(10.0, 10.0, 0.2), true),
                PathSegment::new(Position::new(10.0, 10.0, 0.2), Position::new(0.0, 10.0, 0.4), true),
            ],
        }
    }

    #[test]
    fn test_bounds() {
        let bounds = square().bounds().unwrap();
        assert_eq!(bounds.min, Position::new(0.0, 0.0, 0.2));
        assert_eq!(bounds.max, Position::new(10.0, 10.0, 0.4));
        assert!(PlotData::new().bounds().is_none());
    }

    #[test]
    fn test_lengths_split_by_deposition() {
        let plot = square();
        assert!((plot.travel_length() - 10.0).abs() < 1e-9);
        assert!(plot.deposition_length() > 20.0);
    }

    #[test]
    fn test_redundant_waypoint_yields_zero_length_segment() {
        let mut emitter = PlotEmitter::new();
        let state = DeviceState::default().apply(&Step::point(5.0, 5.0, 0.2));
        let step = Step::waypoint(fabpath_core::PartialPosition::new());
        let next = state.apply(&step);
        emitter.consume(&step, &state, &next).unwrap();

        let plot = Box::new(emitter).finalize().into_plot().unwrap();
        assert_eq!(plot.len(), 1);
        assert!(plot.segments[0].is_zero_length());
    }

    #[test]
    fn test_to_json() {
        let json = square().to_json().unwrap();
        let back: PlotData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, square());
    }
}
