//! # Vivarium Core
//!
//! The heritable neural controller for Vivarium organisms.
//!
//! This crate turns a genome's connection genes into an immutable,
//! pruned connectome and evaluates it on demand:
//! - Connectome construction and reachability pruning
//! - Memoized, cycle-safe evaluation per output group
//! - Sensor modulation (gains, homeostatic targets)
//! - Sensor plasticity driven by outcome feedback and experience imprints
//! - Snapshots, configuration, metrics and structured logging
//!
//! ## Example
//!
//! ```
//! use vivarium_core::brain::{Brain, EvaluateOptions, Gene};
//!
//! let genes = vec![Gene::new(0, 300, 1.0, 2)];
//! let mut brain = Brain::from_genome(&genes).expect("genes present");
//!
//! let result = brain.evaluate("movement", [("energy", 0.5)], EvaluateOptions::default());
//! let rest = result.values.expect("one neuron fired")["rest"];
//! assert!((rest - 1.0_f64.tanh()).abs() < 1e-9);
//! ```

/// Connectome construction, evaluation, modulation and plasticity
pub mod brain;
/// Configuration loaded from `config.toml`
pub mod config;
/// Error types for the I/O edges
pub mod error;
/// Genome decoding and deterministic seed genomes
pub mod genome;
/// Evaluation metrics collection and logging setup
pub mod metrics;

pub use brain::{Brain, GenomeSource};
pub use error::{BrainError, Result};
pub use metrics::{init_logging, Metrics};
pub use vivarium_data::{Gene, Genome};
