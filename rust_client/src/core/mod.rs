//! Core domain models for exposure timing.
//!
//! This module defines the fundamental data structures used throughout the
//! crate, representing exposure configurations, observed group packets, and
//! per-integration timing results.

pub mod domain;

pub use domain::*;
