//! Scorecard core library.
//!
//! KPI/KRI scoring for security programs: a catalog of metric definitions
//! and recorded observations, a banded scoring engine with traffic-light
//! statuses, weighted aggregation across categories, and report rendering.
//! All user interaction and process concerns live in the CLI crate; this
//! library only computes and returns structured results.

pub mod catalog;
pub mod config;
pub mod report;
pub mod scoring;
