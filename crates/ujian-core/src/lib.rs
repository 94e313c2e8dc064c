//! ujian-core — answer evaluation engine, catalog parsing, and grading reports.
//!
//! The heart of this crate is [`engine::evaluate`], a pure function that scores
//! one participant's raw answers against an exam package. Everything else
//! feeds it (packages, answer stores) or consumes its output (reports,
//! statistics, manual review).

pub mod answer;
pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod results;
pub mod statistics;
pub mod store;
pub mod traits;

pub use engine::evaluate;
