//! # Fabpath
//!
//! A toolpath design engine for motion-and-deposition machines such as
//! FFF 3D printers.
//!
//! ## Architecture
//!
//! Fabpath is organized as a workspace with multiple crates:
//!
//! 1. **fabpath-core** - Positions, partial position updates, errors, defaults
//! 2. **fabpath-transform** - Step model, device state, transform engine, emitters
//! 3. **fabpath** - This crate: re-exports, logging setup, demo binary
//!
//! A design is an ordered list of steps. [`transform`] walks it once and
//! produces either G-code lines or plot geometry.

pub use fabpath_core::{constants, Error, PartialPosition, Position, Result, TransformError};

pub use fabpath_transform::{
    steps_from_json, transform, DeviceState, EmissionUnit, Emitter, EmitterRegistry,
    GcodeProgram, GeometryChange, InitialState, OutputKind, PathSegment, PlotBounds, PlotData,
    SpeedChange, Step, ToggleEncoding, TransformEngine, TransformOptions,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr so stdout stays clean for generated G-code
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
