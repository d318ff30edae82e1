//! # playsync Common Library
//!
//! Shared code for the playsync importer:
//! - The `Play` value type handed between source, pipeline and destination
//! - Calendar/instant helpers
//! - Settings file model and path resolution
//! - Logging initialization

pub mod config;
pub mod error;
pub mod logging;
pub mod play;
pub mod time;

pub use error::{Error, Result};
pub use play::Play;
