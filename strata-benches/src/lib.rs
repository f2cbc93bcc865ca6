//! Benchmark support crate for strata.
//!
//! Provides seeded synthetic data sets and parameter types used by the
//! Criterion benchmarks for the clustering pipeline and its dense stages:
//! core distances with Prim's spanning tree, and hierarchy extraction.

pub mod error;
pub mod params;
pub mod source;
