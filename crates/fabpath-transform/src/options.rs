//! Transform configuration.

use fabpath_core::constants::{
    DEFAULT_COORDINATE_PRECISION, DEFAULT_EXTRUSION_HEIGHT, DEFAULT_EXTRUSION_PRECISION,
    DEFAULT_EXTRUSION_WIDTH, DEFAULT_FILAMENT_DIAMETER, DEFAULT_PRINT_SPEED,
    DEFAULT_TRAVEL_SPEED, MAX_PRECISION, MIN_FEED_RATE,
};
use fabpath_core::TransformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the G-code emitter writes a deposition toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleEncoding {
    /// `; deposition on` / `; deposition off`
    #[default]
    Comment,
    /// `M101` / `M103`
    Mcode,
    /// No line at all; the toggle only switches later moves between G0 and G1.
    Omit,
}

impl fmt::Display for ToggleEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment => write!(f, "comment"),
            Self::Mcode => write!(f, "mcode"),
            Self::Omit => write!(f, "omit"),
        }
    }
}

impl FromStr for ToggleEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comment" => Ok(Self::Comment),
            "mcode" | "m-code" => Ok(Self::Mcode),
            "omit" | "none" => Ok(Self::Omit),
            _ => Err(format!("Unknown toggle encoding: {}", s)),
        }
    }
}

/// Overrides for the state a transform starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialState {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
    #[serde(default)]
    pub deposition: Option<bool>,
}

/// Options recognised by a transform.
///
/// Unknown keys are rejected when parsing from JSON or key/value pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformOptions {
    /// Decimal places for X/Y/Z words
    pub coordinate_precision: usize,
    /// Decimal places for E words
    pub extrusion_precision: usize,
    /// Where the device starts
    pub initial_state: InitialState,
    /// Starting print feed rate (mm/min)
    pub print_speed: f64,
    /// Starting travel feed rate (mm/min)
    pub travel_speed: f64,
    /// Starting bead width (mm)
    pub extrusion_width: f64,
    /// Starting bead height (mm)
    pub extrusion_height: f64,
    /// Filament diameter (mm)
    pub filament_diameter: f64,
    /// Write E words on deposition moves
    pub extrusion: bool,
    /// How deposition toggles are written
    pub toggle_encoding: ToggleEncoding,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            coordinate_precision: DEFAULT_COORDINATE_PRECISION,
            extrusion_precision: DEFAULT_EXTRUSION_PRECISION,
            initial_state: InitialState::default(),
            print_speed: DEFAULT_PRINT_SPEED,
            travel_speed: DEFAULT_TRAVEL_SPEED,
            extrusion_width: DEFAULT_EXTRUSION_WIDTH,
            extrusion_height: DEFAULT_EXTRUSION_HEIGHT,
            filament_diameter: DEFAULT_FILAMENT_DIAMETER,
            extrusion: true,
            toggle_encoding: ToggleEncoding::default(),
        }
    }
}

impl TransformOptions {
    /// Options with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decimal places for X/Y/Z words.
    pub fn with_coordinate_precision(mut self, digits: usize) -> Self {
        self.coordinate_precision = digits;
        self
    }

    /// Set the decimal places for E words.
    pub fn with_extrusion_precision(mut self, digits: usize) -> Self {
        self.extrusion_precision = digits;
        self
    }

    /// Override where the device starts and whether it starts depositing.
    pub fn with_initial_state(mut self, initial_state: InitialState) -> Self {
        self.initial_state = initial_state;
        self
    }

    /// Set the starting print and travel feed rates (mm/min).
    pub fn with_speeds(mut self, print: f64, travel: f64) -> Self {
        self.print_speed = print;
        self.travel_speed = travel;
        self
    }

    /// Set the starting bead width and height (mm).
    pub fn with_extrusion_geometry(mut self, width: f64, height: f64) -> Self {
        self.extrusion_width = width;
        self.extrusion_height = height;
        self
    }

    /// Set the filament diameter used for E amounts (mm).
    pub fn with_filament_diameter(mut self, diameter: f64) -> Self {
        self.filament_diameter = diameter;
        self
    }

    /// Turn E words on deposition moves on or off.
    pub fn with_extrusion(mut self, enabled: bool) -> Self {
        self.extrusion = enabled;
        self
    }

    /// Choose how deposition toggles are written.
    pub fn with_toggle_encoding(mut self, encoding: ToggleEncoding) -> Self {
        self.toggle_encoding = encoding;
        self
    }

    /// Parse options from a JSON object. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| TransformError::invalid_config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Build options from `key=value` style pairs.
    ///
    /// Initial state overrides use the keys `initial_x`, `initial_y`,
    /// `initial_z` and `initial_deposition`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, TransformError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();
            match key {
                "coordinate_precision" => options.coordinate_precision = parse_value(key, value)?,
                "extrusion_precision" => options.extrusion_precision = parse_value(key, value)?,
                "print_speed" => options.print_speed = parse_value(key, value)?,
                "travel_speed" => options.travel_speed = parse_value(key, value)?,
                "extrusion_width" => options.extrusion_width = parse_value(key, value)?,
                "extrusion_height" => options.extrusion_height = parse_value(key, value)?,
                "filament_diameter" => options.filament_diameter = parse_value(key, value)?,
                "extrusion" => options.extrusion = parse_value(key, value)?,
                "toggle_encoding" => options.toggle_encoding = parse_value(key, value)?,
                "initial_x" => options.initial_state.x = Some(parse_value(key, value)?),
                "initial_y" => options.initial_state.y = Some(parse_value(key, value)?),
                "initial_z" => options.initial_state.z = Some(parse_value(key, value)?),
                "initial_deposition" => {
                    options.initial_state.deposition = Some(parse_value(key, value)?)
                }
                other => {
                    return Err(TransformError::invalid_config(format!(
                        "unknown option '{}'",
                        other
                    )))
                }
            }
        }
        options.validate()?;
        Ok(options)
    }

    /// Reject out-of-range and non-physical settings.
    pub fn validate(&self) -> Result<(), TransformError> {
        if self.coordinate_precision > MAX_PRECISION {
            return Err(TransformError::invalid_config(format!(
                "coordinate_precision {} exceeds maximum of {}",
                self.coordinate_precision, MAX_PRECISION
            )));
        }
        if self.extrusion_precision > MAX_PRECISION {
            return Err(TransformError::invalid_config(format!(
                "extrusion_precision {} exceeds maximum of {}",
                self.extrusion_precision, MAX_PRECISION
            )));
        }

        for (name, value) in [
            ("print_speed", self.print_speed),
            ("travel_speed", self.travel_speed),
        ] {
            if value.is_finite() && value > 0.0 && value < MIN_FEED_RATE {
                return Err(TransformError::invalid_config(format!(
                    "{} {} is below the minimum feed rate of {}",
                    name, value, MIN_FEED_RATE
                )));
            }
        }

        for (name, value) in [
            ("print_speed", self.print_speed),
            ("travel_speed", self.travel_speed),
            ("extrusion_width", self.extrusion_width),
            ("extrusion_height", self.extrusion_height),
            ("filament_diameter", self.filament_diameter),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TransformError::invalid_config(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("initial_state.x", self.initial_state.x),
            ("initial_state.y", self.initial_state.y),
            ("initial_state.z", self.initial_state.z),
        ] {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(TransformError::invalid_config(format!(
                    "{} must be finite, got {}",
                    name, v
                )));
            }
        }

        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, TransformError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| {
        TransformError::invalid_config(format!("invalid value '{}' for {}: {}", value, key, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = TransformOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.coordinate_precision, 3);
        assert_eq!(options.toggle_encoding, ToggleEncoding::Comment);
    }

    #[test]
    fn test_from_json_partial() {
        let options =
            TransformOptions::from_json(r#"{"coordinate_precision": 4, "initial_state": {"z": 0.3}}"#)
                .unwrap();
        assert_eq!(options.coordinate_precision, 4);
        assert_eq!(options.initial_state.z, Some(0.3));
        assert_eq!(options.print_speed, DEFAULT_PRINT_SPEED);
    }

    #[test]
    fn test_from_json_rejects_unknown_key() {
        let err = TransformOptions::from_json(r#"{"colour": "red"}"#).unwrap_err();
        assert!(matches!(err, TransformError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_from_json_rejects_unknown_initial_state_key() {
        let err = TransformOptions::from_json(r#"{"initial_state": {"w": 1.0}}"#).unwrap_err();
        assert!(matches!(err, TransformError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_from_pairs() {
        let options = TransformOptions::from_pairs([
            ("coordinate_precision", "2"),
            ("toggle_encoding", "mcode"),
            ("initial_deposition", "true"),
        ])
        .unwrap();
        assert_eq!(options.coordinate_precision, 2);
        assert_eq!(options.toggle_encoding, ToggleEncoding::Mcode);
        assert_eq!(options.initial_state.deposition, Some(true));
    }

    #[test]
    fn test_from_pairs_rejects_unknown_key() {
        let err = TransformOptions::from_pairs([("speed", "100")]).unwrap_err();
        assert_eq!(
            err,
            TransformError::invalid_config("unknown option 'speed'")
        );
    }

    #[test]
    fn test_from_pairs_rejects_bad_value() {
        assert!(TransformOptions::from_pairs([("coordinate_precision", "three")]).is_err());
        assert!(TransformOptions::from_pairs([("toggle_encoding", "blink")]).is_err());
    }

    #[test]
    fn test_precision_out_of_range() {
        let options = TransformOptions::default().with_coordinate_precision(11);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_non_positive_physical_values() {
        assert!(TransformOptions::default()
            .with_filament_diameter(0.0)
            .validate()
            .is_err());
        assert!(TransformOptions::default()
            .with_speeds(f64::NAN, 100.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_feed_below_minimum_is_rejected() {
        let err = TransformOptions::default()
            .with_speeds(1000.0, 0.0001)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidConfiguration { ref reason } if reason.contains("travel_speed")
        ));
        assert!(TransformOptions::default().with_speeds(0.4, 0.4).validate().is_ok());
    }

    #[test]
    fn test_non_finite_initial_state() {
        let options = TransformOptions::default().with_initial_state(InitialState {
            x: Some(f64::INFINITY),
            ..Default::default()
        });
        assert!(options.validate().is_err());
    }
}
