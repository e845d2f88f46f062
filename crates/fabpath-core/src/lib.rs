//! # Fabpath Core
//!
//! Core types shared by the fabpath crates.
//! Provides absolute and partial positions, default machine parameters,
//! and the error types every transform reports.

pub mod constants;
pub mod data;
pub mod error;

pub use data::{PartialPosition, Position};

pub use error::{Error, Result, TransformError};
