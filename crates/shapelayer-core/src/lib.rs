//! Shapelayer Core - Domain models, ports and configuration
//!
//! This crate contains the shape/legend/template models, the error taxonomy and
//! the port definitions (catalog and time-series collaborators) shared by the
//! other shapelayer crates.

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod ports;

pub use error::{Result, ShapeLayerError};
