//! Evaluation metrics collection.
//!
//! Provides structured logging and counters for monitoring how often brains
//! are built, evaluated and reinforced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Shared counters for brain activity.
pub struct Metrics {
    brains_built: AtomicU64,
    evaluations: AtomicU64,
    silent_evaluations: AtomicU64,
    activations: AtomicU64,
    feedback_applications: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            brains_built: AtomicU64::new(0),
            evaluations: AtomicU64::new(0),
            silent_evaluations: AtomicU64::new(0),
            activations: AtomicU64::new(0),
            feedback_applications: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_brain_built(&self, neurons: usize, connections: usize) {
        self.brains_built.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(neurons, connections, "Brain registered");
    }

    /// Records one evaluation and the number of neurons it activated.
    pub fn record_evaluation(&self, activation_count: usize) {
        let evaluations = self.evaluations.fetch_add(1, Ordering::Relaxed) + 1;
        self.activations
            .fetch_add(activation_count as u64, Ordering::Relaxed);
        if activation_count == 0 {
            self.silent_evaluations.fetch_add(1, Ordering::Relaxed);
        }

        // Log at info level every 1000 evaluations
        if evaluations % 1000 == 0 {
            tracing::info!(
                evaluations,
                silent = self.silent_evaluations(),
                activations = self.activations(),
                elapsed_ms = self.elapsed().as_millis() as u64,
                "Brain evaluations"
            );
        }
    }

    /// Records a feedback application; `applied` is false when plasticity
    /// skipped the tick.
    pub fn record_feedback(&self, applied: bool) {
        if applied {
            self.feedback_applications.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn brains_built(&self) -> u64 {
        self.brains_built.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn silent_evaluations(&self) -> u64 {
        self.silent_evaluations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn activations(&self) -> u64 {
        self.activations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn feedback_applications(&self) -> u64 {
        self.feedback_applications.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level`. Calling this twice is harmless.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .ok();
}
