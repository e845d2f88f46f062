//! Output emitters and their registry
//!
//! This module provides:
//! - The [`Emitter`] trait every output target implements
//! - [`EmissionUnit`], the finished output of one transform
//! - [`EmitterRegistry`], which maps target names to emitter factories

pub mod gcode;
pub mod plot;

pub use gcode::{GcodeEmitter, GcodeProgram};
pub use plot::{PathSegment, PlotBounds, PlotData, PlotEmitter};

use crate::options::TransformOptions;
use crate::state::DeviceState;
use crate::step::Step;
use fabpath_core::TransformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Consumer of the step / state-transition stream for one output target.
///
/// The engine calls [`consume`](Emitter::consume) once per step, in input
/// order, with the state before and after that step, then calls
/// [`finalize`](Emitter::finalize) exactly once.
pub trait Emitter {
    /// Target name this emitter was registered under
    fn name(&self) -> &str;

    /// Record output for one step
    fn consume(
        &mut self,
        step: &Step,
        prior: &DeviceState,
        next: &DeviceState,
    ) -> Result<(), TransformError>;

    /// Hand back everything accumulated
    fn finalize(self: Box<Self>) -> EmissionUnit;
}

/// Finished output of a transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EmissionUnit {
    Gcode(GcodeProgram),
    Plot(PlotData),
}

impl EmissionUnit {
    /// Number of lines or segments
    pub fn len(&self) -> usize {
        match self {
            EmissionUnit::Gcode(program) => program.lines.len(),
            EmissionUnit::Plot(plot) => plot.segments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_gcode(&self) -> Option<&GcodeProgram> {
        match self {
            EmissionUnit::Gcode(program) => Some(program),
            EmissionUnit::Plot(_) => None,
        }
    }

    pub fn as_plot(&self) -> Option<&PlotData> {
        match self {
            EmissionUnit::Plot(plot) => Some(plot),
            EmissionUnit::Gcode(_) => None,
        }
    }

    pub fn into_gcode(self) -> Option<GcodeProgram> {
        match self {
            EmissionUnit::Gcode(program) => Some(program),
            EmissionUnit::Plot(_) => None,
        }
    }

    pub fn into_plot(self) -> Option<PlotData> {
        match self {
            EmissionUnit::Plot(plot) => Some(plot),
            EmissionUnit::Gcode(_) => None,
        }
    }
}

/// Built-in output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Textual machine instructions
    Gcode,
    /// Path geometry for a viewer
    Plot,
}

impl OutputKind {
    /// Canonical registry name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcode => "gcode",
            Self::Plot => "plot",
        }
    }
}

impl AsRef<str> for OutputKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gcode" | "g-code" | "text" => Ok(Self::Gcode),
            "plot" | "geometry" => Ok(Self::Plot),
            _ => Err(format!("Unknown output kind: {}", s)),
        }
    }
}

/// Builds a fresh emitter for one transform.
pub type EmitterFactory = Arc<dyn Fn(&TransformOptions) -> Box<dyn Emitter> + Send + Sync>;

/// Emitter registry
///
/// Maps target names to emitter factories. Every transform asks the registry
/// for a new emitter, so no emitter is ever shared between transforms.
#[derive(Clone)]
pub struct EmitterRegistry {
    factories: Vec<(String, EmitterFactory)>,
}

impl EmitterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Create a registry holding the `gcode` and `plot` emitters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(OutputKind::Gcode.as_str(), |options: &TransformOptions| {
                Box::new(GcodeEmitter::new(options)) as Box<dyn Emitter>
            })
            .register(OutputKind::Plot.as_str(), |_: &TransformOptions| {
                Box::new(PlotEmitter::new()) as Box<dyn Emitter>
            });
        registry
    }

    /// Register an emitter factory. Re-registering a name replaces the
    /// previous factory in place.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&TransformOptions) -> Box<dyn Emitter> + Send + Sync + 'static,
    {
        let name = name.into().to_lowercase();
        let factory: EmitterFactory = Arc::new(factory);
        match self.factories.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((name, factory)),
        }
        self
    }

    /// Resolve a target name (case-insensitive) to its registered name. An
    /// exact registered name wins; built-in aliases are tried after that.
    pub fn resolve(&self, target: &str) -> Option<&str> {
        self.lookup(target).map(|(name, _)| name.as_str())
    }

    fn lookup(&self, target: &str) -> Option<&(String, EmitterFactory)> {
        let lowered = target.trim().to_lowercase();
        if let Some(entry) = self.factories.iter().find(|(name, _)| *name == lowered) {
            return Some(entry);
        }
        let canonical = OutputKind::from_str(&lowered).ok()?;
        self.factories
            .iter()
            .find(|(name, _)| name == canonical.as_str())
    }

    /// Create a new emitter for `target`
    pub fn create(
        &self,
        target: &str,
        options: &TransformOptions,
    ) -> Result<Box<dyn Emitter>, TransformError> {
        let (_, factory) =
            self.lookup(target)
                .ok_or_else(|| TransformError::UnsupportedTarget {
                    target: target.to_string(),
                    available: self.list_registered().join(", "),
                })?;
        Ok(factory(options))
    }

    /// Registered target names in registration order
    pub fn list_registered(&self) -> Vec<&str> {
        self.factories.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl Default for EmitterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for EmitterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterRegistry")
            .field("targets", &self.list_registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_aliases() {
        assert_eq!("G-Code".parse::<OutputKind>(), Ok(OutputKind::Gcode));
        assert_eq!("geometry".parse::<OutputKind>(), Ok(OutputKind::Plot));
        assert!("svg".parse::<OutputKind>().is_err());
    }

    #[test]
    fn test_default_registry_targets() {
        let registry = EmitterRegistry::with_defaults();
        assert_eq!(registry.list_registered(), vec!["gcode", "plot"]);
        assert_eq!(registry.resolve("PLOT"), Some("plot"));
        assert_eq!(registry.resolve("text"), Some("gcode"));
        assert_eq!(registry.resolve("svg"), None);
    }

    #[test]
    fn test_registered_name_wins_over_alias() {
        let mut registry = EmitterRegistry::with_defaults();
        registry.register("text", |_: &TransformOptions| {
            Box::new(PlotEmitter::new()) as Box<dyn Emitter>
        });

        assert_eq!(registry.resolve("text"), Some("text"));
        assert_eq!(registry.resolve("TEXT"), Some("text"));
        assert_eq!(registry.resolve("g-code"), Some("gcode"));

        let emitter = registry
            .create("text", &TransformOptions::default())
            .unwrap();
        assert_eq!(emitter.name(), "plot");
    }

    #[test]
    fn test_create_unknown_target() {
        let registry = EmitterRegistry::with_defaults();
        let err = registry
            .create("svg", &TransformOptions::default())
            .err()
            .unwrap();
        assert_eq!(
            err,
            TransformError::UnsupportedTarget {
                target: "svg".into(),
                available: "gcode, plot".into(),
            }
        );
    }

    #[test]
    fn test_empty_registry_supports_nothing() {
        let registry = EmitterRegistry::new();
        assert!(registry.create("gcode", &TransformOptions::default()).is_err());
    }

    #[test]
    fn test_emission_unit_accessors() {
        let unit = EmissionUnit::Plot(PlotData::default());
        assert!(unit.is_empty());
        assert!(unit.as_plot().is_some());
        assert!(unit.as_gcode().is_none());
        assert!(unit.into_gcode().is_none());
    }
}
