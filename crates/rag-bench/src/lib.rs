//! Synthetic region-adjacency-graph generator and benchmark utilities for
//! `rag-core`.
//!
//! This crate provides deterministic generation of realistic label/
//! probability volume pairs for benchmarking and property-based testing
//! of `rag-core`.

pub mod correctness;
pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, generate_volume};
