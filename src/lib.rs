//! Santa Algo - Secret Santa round service
//!
//! This library provides the constrained random assignment used to draw
//! Secret Santa rounds: every participant gives exactly one gift, nobody
//! draws themselves, and excluded pairs (e.g. couples) are never matched.
//! The matcher either finds such an assignment or proves none exists.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Assignment, ExclusionSet, MatchError, Matcher, MatcherSettings, Pairing};
pub use crate::models::{Participant, ParticipantId};
