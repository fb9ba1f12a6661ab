//! Cadence Console Library
//!
//! Command-line front-end for Cadence session playback: a catalog-backed
//! resolver, a clock-driven simulated streaming engine and a logging voice
//! transport, driven by text commands.
//!
//! This library exposes the components for testing purposes.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod transport;

// Re-export commonly used types for convenience
pub use catalog::CatalogResolver;
pub use commands::Command;
pub use config::{AppConfig, Availability, CatalogEntry};
pub use console::Console;
pub use engine::SimulatedEngine;
pub use error::{ConsoleError, Result};
pub use transport::LoggingTransport;
