//! # Hitster Common Library
//!
//! Shared code for the hitster crates:
//! - Error type used across the workspace
//! - Configuration loading (TOML + environment)
//! - Tracing bootstrap for binaries
//! - Platform track model and release date parsing

pub mod config;
pub mod error;
pub mod logging;
pub mod track;

pub use error::{Error, Result};
pub use track::{parse_year, TrackRef};
