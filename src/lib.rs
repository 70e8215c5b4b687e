//! # Vivarium
//!
//! Headless driver for the Vivarium brain: loads genomes and configuration,
//! runs evaluate/feedback ticks and exports snapshots.

pub mod model;
pub mod runner;
