//! G-code generation from a step stream.
//!
//! Line policy, one step at a time:
//! - Waypoint: one `G0` (travel) or `G1` (deposition) line with the full
//!   target position, an `F` word when the feed changes, and an `E` word on
//!   deposition moves when extrusion is enabled.
//! - Deposition: a comment, an `M101`/`M103` line, or nothing, per
//!   [`ToggleEncoding`].
//! - Tool: `T<n>`. Comment: `; <text>`. ManualCode: copied verbatim.
//! - Speed and ExtrusionGeometry: no line of their own.

use super::{EmissionUnit, Emitter};
use crate::options::{ToggleEncoding, TransformOptions};
use crate::state::DeviceState;
use crate::step::Step;
use fabpath_core::constants::FEED_PRECISION;
use fabpath_core::TransformError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// An ordered list of G-code lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcodeProgram {
    pub lines: Vec<String>,
}

impl GcodeProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }

    /// Lines joined with `\n`, with a trailing newline when non-empty.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl fmt::Display for GcodeProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Emitter for the `gcode` target.
#[derive(Debug, Clone)]
pub struct GcodeEmitter {
    coordinate_precision: usize,
    extrusion_precision: usize,
    extrusion_enabled: bool,
    toggle_encoding: ToggleEncoding,
    filament_area: f64,
    last_feed: Option<f64>,
    program: GcodeProgram,
}

impl GcodeEmitter {
    /// Creates a new G-code emitter from transform options.
    pub fn new(options: &TransformOptions) -> Self {
        let radius = options.filament_diameter / 2.0;
        Self {
            coordinate_precision: options.coordinate_precision,
            extrusion_precision: options.extrusion_precision,
            extrusion_enabled: options.extrusion,
            toggle_encoding: options.toggle_encoding,
            filament_area: PI * radius * radius,
            last_feed: None,
            program: GcodeProgram::new(),
        }
    }

    /// Filament length needed to lay a bead along a move from `prior` to `next`.
    fn extrusion_amount(&self, prior: &DeviceState, next: &DeviceState) -> f64 {
        let length = prior.position.distance_to(&next.position);
        length * prior.extrusion_width * prior.extrusion_height / self.filament_area
    }

    fn move_line(&mut self, prior: &DeviceState, next: &DeviceState) -> String {
        let depositing = prior.deposition_active;
        let mut line = String::from(if depositing { "G1" } else { "G0" });

        let feed = prior.active_feed();
        if self.last_feed != Some(feed) {
            line.push_str(&format!(" F{}", format_feed(feed)));
            self.last_feed = Some(feed);
        }

        let p = self.coordinate_precision;
        line.push_str(&format!(
            " X{} Y{} Z{}",
            format_fixed(next.position.x, p),
            format_fixed(next.position.y, p),
            format_fixed(next.position.z, p)
        ));

        if depositing && self.extrusion_enabled {
            let amount = self.extrusion_amount(prior, next);
            line.push_str(&format!(" E{}", format_fixed(amount, self.extrusion_precision)));
        }
        line
    }

    fn toggle_line(&self, on: bool) -> Option<String> {
        match (self.toggle_encoding, on) {
            (ToggleEncoding::Comment, true) => Some("; deposition on".to_string()),
            (ToggleEncoding::Comment, false) => Some("; deposition off".to_string()),
            (ToggleEncoding::Mcode, true) => Some("M101".to_string()),
            (ToggleEncoding::Mcode, false) => Some("M103".to_string()),
            (ToggleEncoding::Omit, _) => None,
        }
    }
}

/// Fixed-point text for `value`. Values that round to zero never carry a
/// sign, so `-0.0001` at three places is `0.000`, not `-0.000`.
fn format_fixed(value: f64, precision: usize) -> String {
    let text = format!("{:.precision$}", value);
    match text.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => text,
    }
}

/// Feed rate at `FEED_PRECISION` places with trailing zeros removed:
/// `8000.0` is `8000`, `0.4` is `0.4`.
fn format_feed(feed: f64) -> String {
    let text = format_fixed(feed, FEED_PRECISION);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl Emitter for GcodeEmitter {
    fn name(&self) -> &str {
        "gcode"
    }

    fn consume(
        &mut self,
        step: &Step,
        prior: &DeviceState,
        next: &DeviceState,
    ) -> Result<(), TransformError> {
        let line = match step {
            Step::Waypoint(_) => Some(self.move_line(prior, next)),
            Step::Deposition { on } => self.toggle_line(*on),
            Step::Tool { index } => Some(format!("T{}", index)),
            Step::Comment { text } => Some(format!("; {}", text)),
            Step::ManualCode { line } => Some(line.clone()),
            Step::Speed(_) | Step::ExtrusionGeometry(_) => None,
        };
        if let Some(line) = line {
            self.program.lines.push(line);
        }
        Ok(())
    }

    fn finalize(self: Box<Self>) -> EmissionUnit {
        EmissionUnit::Gcode(self.program)
    }
}
