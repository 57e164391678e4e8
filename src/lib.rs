//! Adaptive track scheduler that learns from listening feedback.
//!
//! Core modules:
//! - [`scheduler`] - The facade: select the next track, record feedback
//! - [`store`] - Persisted per-track records (ordered JSON document)
//! - [`decay`] - Half-life drift of preference weights toward neutral
//! - [`score`] - Recency-aware scoring
//! - [`select`] - Weighted random selection with a repeat window
//!
//! ### Supporting Modules
//!
//! - [`feedback`] - Like/dislike vote application and weight reset
//! - [`config`] - Configuration and data directory management
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`playback`] - Audio output behind the [`playback::Player`] trait
//! - [`metadata`] - Tag reading (artist, cover art, duration)
//! - [`runtime`] - The interactive play session loop
//!
//! ## Quick Start Example
//!
//! ```
//! use encore::{decay, score};
//!
//! // A disliked track (weight 0.8) drifts back toward neutral. After one
//! // half-life it has recovered half the distance.
//! let drifted = decay::drift_toward_one(0.8, 100.0, decay::DEFAULT_HALF_LIFE_HOURS);
//! assert!((drifted - 0.9).abs() < 1e-12);
//!
//! // Scores grow with idle time: a track unplayed for a day outscores one
//! // played an hour ago, all else equal.
//! assert!(score::time_component(24.0) > score::time_component(1.0));
//! ```
//!
//! ## Algorithm Details
//!
//! Selection combines three signals:
//!
//! - **Recency**: `ln(1 + hours_since_played)` rewards tracks that have
//!   rested, with a floor of 0.1 hours so nothing ever scores zero
//! - **Preference**: a per-track weight in `[0.5, 2.0]`, nudged by votes
//!   (like ×1.1, dislike ×0.9) and pulled back toward 1.0 with a 100 hour
//!   half-life
//! - **Repeat suppression**: the last `min(150, library size)` selections
//!   are excluded from the draw, falling back to the full library when the
//!   window would exclude everything
//!
//! The draw itself is weighted random over the remaining scores, so even a
//! low-scoring track eventually plays.
//!
//! ## Error Handling
//!
//! Fallible operations return `Result<T, anyhow::Error>`. Corrupt or absent
//! state files are never fatal: the store loads as empty and logs a warning.

pub mod cli;
pub mod config;
pub mod decay;
pub mod feedback;
pub mod metadata;
pub mod playback;
pub mod runtime;
pub mod scheduler;
pub mod score;
pub mod select;
pub mod store;
