//! Core data structures for the Vivarium simulation.

pub mod genotype;
