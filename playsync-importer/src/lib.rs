//! playsync-importer library interface
//!
//! Reconciles a per-day audio-recognition detection log into a play-history
//! store. Exposes the pipeline pieces for the binary and integration tests.

pub mod error;
pub mod importer;
pub mod locator;
pub mod normalizer;
pub mod reconcile;
pub mod services;
pub mod types;

pub use crate::error::{ImportError, ImportResult};
pub use crate::importer::{DayReport, ImportOptions, ImportSummary, Importer};
pub use crate::reconcile::{Carry, Reconciler};
pub use crate::types::{DetectionSource, PlayStore, RawDetectionEvent};
