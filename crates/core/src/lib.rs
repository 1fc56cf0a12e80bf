//! # Medi Core
//!
//! The analysis pipeline behind Medi Analyser: one medical report fanned out
//! to independent specialists, joined, then reconciled by a multidisciplinary
//! team into a single summary.
//!
//! ## Architecture
//!
//! - `swarm/` - evaluator traits, coordinator, pipeline, errors and events
//! - `skills/` - LLM-backed specialists and the team synthesis
//! - `models` - LLM provider and model selection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medi_core::swarm::{medical_pipeline, CoordinatorConfig};
//!
//! let pipeline = medical_pipeline(&CoordinatorConfig::default())?;
//! let result = pipeline.analyze(&report_text).await?;
//! println!("{}", result.summary());
//! ```

pub mod models;
pub mod skills;
pub mod swarm;
