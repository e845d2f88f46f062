//! # Fabpath Transform
//!
//! Turns an ordered design of [`Step`]s into machine output.
//!
//! The engine walks the steps once, threads a [`DeviceState`] through them,
//! and feeds every transition to the [`Emitter`] registered for the requested
//! target:
//!
//! - `gcode`: textual machine instructions ([`GcodeProgram`])
//! - `plot`: path segments tagged travel / deposition ([`PlotData`])
//!
//! ```
//! use fabpath_transform::{transform, OutputKind, Step, TransformOptions};
//!
//! let steps = vec![
//!     Step::point(40.0, 40.0, 0.2),
//!     Step::xy(50.0, 50.0),
//!     Step::xy(60.0, 40.0),
//! ];
//! let plot = transform(&steps, OutputKind::Plot, &TransformOptions::default())
//!     .unwrap()
//!     .into_plot()
//!     .unwrap();
//! assert_eq!(plot.len(), 3);
//! ```

pub mod emitter;
pub mod engine;
pub mod options;
pub mod state;
pub mod step;

pub use emitter::{
    EmissionUnit, Emitter, EmitterFactory, EmitterRegistry, GcodeEmitter, GcodeProgram,
    OutputKind, PathSegment, PlotBounds, PlotData, PlotEmitter,
};
pub use engine::{transform, TransformEngine};
pub use options::{InitialState, ToggleEncoding, TransformOptions};
pub use state::DeviceState;
pub use step::{steps_from_json, GeometryChange, SpeedChange, Step};
