//! Default machine and formatting parameters

/// Decimal places used for X/Y/Z words in G-code
pub const DEFAULT_COORDINATE_PRECISION: usize = 3;

/// Decimal places used for E words in G-code
pub const DEFAULT_EXTRUSION_PRECISION: usize = 5;

/// Largest accepted precision for any numeric word
pub const MAX_PRECISION: usize = 10;

/// Decimal places used for F words; trailing zeros are dropped
pub const FEED_PRECISION: usize = 3;

/// Slowest feed rate an F word can express at `FEED_PRECISION` (mm/min)
pub const MIN_FEED_RATE: f64 = 0.001;

/// Feed rate while depositing (mm/min)
pub const DEFAULT_PRINT_SPEED: f64 = 1000.0;

/// Feed rate while travelling (mm/min)
pub const DEFAULT_TRAVEL_SPEED: f64 = 8000.0;

/// Deposited bead width (mm)
pub const DEFAULT_EXTRUSION_WIDTH: f64 = 0.4;

/// Deposited bead height (mm)
pub const DEFAULT_EXTRUSION_HEIGHT: f64 = 0.2;

/// Filament diameter (mm)
pub const DEFAULT_FILAMENT_DIAMETER: f64 = 1.75;
