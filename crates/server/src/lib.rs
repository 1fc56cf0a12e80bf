//! Medi Analyser Server
//!
//! HTTP boundary for the analysis pipeline in `medi_core`: upload handling,
//! text extraction, per-caller rate limiting and the axum router.

pub mod api;
pub mod config;
pub mod extract;
pub mod limiter;
