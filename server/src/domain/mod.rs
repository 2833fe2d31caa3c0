//! Domain logic
//!
//! - `analytics` - Time-bucketed metrics over the blog tables

pub mod analytics;

pub use analytics::AnalyticsEngine;
