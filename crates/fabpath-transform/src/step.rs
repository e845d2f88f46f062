//! Step vocabulary for toolpath designs.
//!
//! A design is an ordered list of [`Step`]s. Every variant carries only the
//! fields it changes; anything it leaves out keeps its previous value.

use fabpath_core::constants::MIN_FEED_RATE;
use fabpath_core::{PartialPosition, TransformError};
use serde::{Deserialize, Serialize};

/// Sparse change to the print and travel feed rates (mm/min).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeedChange {
    /// Feed rate while depositing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print: Option<f64>,
    /// Feed rate while travelling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel: Option<f64>,
}

impl SpeedChange {
    /// Change only the print feed rate.
    pub fn print(speed: f64) -> Self {
        Self {
            print: Some(speed),
            travel: None,
        }
    }

    /// Change only the travel feed rate.
    pub fn travel(speed: f64) -> Self {
        Self {
            print: None,
            travel: Some(speed),
        }
    }
}

/// Sparse change to the deposited bead cross-section (mm).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeometryChange {
    /// Bead width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Bead height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// One directive in a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    /// Move to a point. Unset axes keep their current value.
    Waypoint(PartialPosition),
    /// Turn deposition on or off.
    Deposition { on: bool },
    /// Change feed rates.
    Speed(SpeedChange),
    /// Change bead width and/or height.
    ExtrusionGeometry(GeometryChange),
    /// Select a tool / extruder.
    Tool { index: u32 },
    /// Free text annotation.
    Comment { text: String },
    /// A raw machine line passed through untouched.
    ManualCode { line: String },
}

impl Step {
    /// Waypoint with all three axes set.
    pub fn point(x: f64, y: f64, z: f64) -> Self {
        Step::Waypoint(PartialPosition::xyz(x, y, z))
    }

    /// Waypoint in the XY plane; Z carries over.
    pub fn xy(x: f64, y: f64) -> Self {
        Step::Waypoint(PartialPosition::xy(x, y))
    }

    /// Waypoint with any combination of axes set.
    pub fn waypoint(position: PartialPosition) -> Self {
        Step::Waypoint(position)
    }

    /// Turn deposition on (`true`) or off (`false`).
    pub fn deposition(on: bool) -> Self {
        Step::Deposition { on }
    }

    /// Change print and/or travel feed rates.
    pub fn speed(change: SpeedChange) -> Self {
        Step::Speed(change)
    }

    /// Select tool `index`.
    pub fn tool(index: u32) -> Self {
        Step::Tool { index }
    }

    /// Annotation written as a G-code comment.
    pub fn comment(text: impl Into<String>) -> Self {
        Step::Comment { text: text.into() }
    }

    /// Raw machine line, passed through verbatim.
    pub fn manual_code(line: impl Into<String>) -> Self {
        Step::ManualCode { line: line.into() }
    }

    /// Short name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Waypoint(_) => "waypoint",
            Step::Deposition { .. } => "deposition",
            Step::Speed(_) => "speed",
            Step::ExtrusionGeometry(_) => "extrusion_geometry",
            Step::Tool { .. } => "tool",
            Step::Comment { .. } => "comment",
            Step::ManualCode { .. } => "manual_code",
        }
    }

    /// Check the step's values. `index` is the step's position in the design
    /// and is reported back in the error.
    pub fn validate(&self, index: usize) -> Result<(), TransformError> {
        match self {
            Step::Waypoint(position) => {
                for (axis, value) in position.set_axes() {
                    ensure_finite(index, axis, value)?;
                }
                Ok(())
            }
            Step::Speed(change) => {
                if let Some(print) = change.print {
                    ensure_feed(index, "print_speed", print)?;
                }
                if let Some(travel) = change.travel {
                    ensure_feed(index, "travel_speed", travel)?;
                }
                Ok(())
            }
            Step::ExtrusionGeometry(change) => {
                if let Some(width) = change.width {
                    ensure_positive(index, "extrusion_width", width)?;
                }
                if let Some(height) = change.height {
                    ensure_positive(index, "extrusion_height", height)?;
                }
                Ok(())
            }
            Step::Comment { text } => ensure_single_line(index, "text", text),
            Step::ManualCode { line } => ensure_single_line(index, "line", line),
            Step::Deposition { .. } | Step::Tool { .. } => Ok(()),
        }
    }
}

fn ensure_finite(index: usize, field: &str, value: f64) -> Result<(), TransformError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TransformError::invalid_step(
            index,
            field,
            format!("{} is not a finite number", value),
        ))
    }
}

fn ensure_positive(index: usize, field: &str, value: f64) -> Result<(), TransformError> {
    ensure_finite(index, field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(TransformError::invalid_step(
            index,
            field,
            format!("{} must be greater than zero", value),
        ))
    }
}

fn ensure_feed(index: usize, field: &str, value: f64) -> Result<(), TransformError> {
    ensure_positive(index, field, value)?;
    if value >= MIN_FEED_RATE {
        Ok(())
    } else {
        Err(TransformError::invalid_step(
            index,
            field,
            format!("{} is below the minimum feed rate of {}", value, MIN_FEED_RATE),
        ))
    }
}

fn ensure_single_line(index: usize, field: &str, text: &str) -> Result<(), TransformError> {
    if text.contains(['\n', '\r']) {
        Err(TransformError::invalid_step(
            index,
            field,
            "must not contain line breaks",
        ))
    } else {
        Ok(())
    }
}

/// Parse a design from its JSON form, e.g.
/// `[{"type":"waypoint","x":1.0},{"type":"deposition","on":true}]`.
pub fn steps_from_json(json: &str) -> fabpath_core::Result<Vec<Step>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_coordinate_is_rejected() {
        let step = Step::waypoint(PartialPosition::xy(f64::NAN, 1.0));
        let err = step.validate(7).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidStepValue { index: 7, ref field, .. } if field == "x"
        ));
    }

    #[test]
    fn test_infinite_z_is_rejected() {
        let step = Step::waypoint(PartialPosition::z_only(f64::INFINITY));
        assert!(step.validate(0).is_err());
    }

    #[test]
    fn test_negative_coordinates_are_fine() {
        assert!(Step::point(-10.0, -0.5, 0.0).validate(0).is_ok());
    }

    #[test]
    fn test_zero_speed_is_rejected() {
        let err = Step::speed(SpeedChange::travel(0.0)).validate(2).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidStepValue { ref field, .. } if field == "travel_speed"
        ));
    }

    #[test]
    fn test_feed_below_minimum_is_rejected() {
        let err = Step::speed(SpeedChange::print(0.0004)).validate(3).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidStepValue { index: 3, ref field, .. } if field == "print_speed"
        ));
        assert!(Step::speed(SpeedChange::travel(0.4)).validate(0).is_ok());
    }

    #[test]
    fn test_multiline_manual_code_is_rejected() {
        assert!(Step::manual_code("M104 S210\nM109").validate(0).is_err());
        assert!(Step::manual_code("M104 S210").validate(0).is_ok());
    }

    #[test]
    fn test_steps_from_json() {
        let json = r#"[
            {"type": "waypoint", "x": 40.0, "y": 40.0, "z": 0.2},
            {"type": "deposition", "on": false},
            {"type": "waypoint", "y": 12.5},
            {"type": "speed", "print": 1500.0},
            {"type": "tool", "index": 1}
        ]"#;
        let steps = steps_from_json(json).unwrap();
        assert_eq!(
            steps,
            vec![
                Step::point(40.0, 40.0, 0.2),
                Step::deposition(false),
                Step::waypoint(PartialPosition::y_only(12.5)),
                Step::speed(SpeedChange::print(1500.0)),
                Step::tool(1),
            ]
        );
    }

    #[test]
    fn test_steps_from_json_rejects_misspelled_axis() {
        let err = steps_from_json(r#"[{"type": "waypoint", "X": 40.0, "y": 1.0}]"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_steps_from_json_rejects_unknown_fields() {
        assert!(steps_from_json(r#"[{"type": "speed", "prnt": 1200.0}]"#).is_err());
        assert!(steps_from_json(r#"[{"type": "extrusion_geometry", "wdth": 0.5}]"#).is_err());
        assert!(steps_from_json(r#"[{"type": "deposition", "on": true, "off": false}]"#).is_err());
    }

    #[test]
    fn test_steps_from_json_rejects_unknown_kind() {
        assert!(steps_from_json(r#"[{"type": "teleport"}]"#).is_err());
    }
}
