//! Evaluation context for join predicates.
//!
//! The context carries everything a predicate call may need besides the
//! rows themselves: bound parameter values, the cancellation flag polled by
//! join drivers, statistics counters and runtime configuration. It is passed
//! explicitly to every `eval` and `encode` call rather than captured by the
//! predicate, so one predicate can be exercised against many contexts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use conjoin_core::Value;

/// Evaluation context for one join.
pub struct EvalContext {
    /// Query parameters (1-indexed).
    parameters: HashMap<u32, Value>,
    /// Whether the join has been cancelled.
    cancelled: AtomicBool,
    /// Evaluation statistics.
    stats: JoinStats,
    /// Configuration options.
    config: JoinConfig,
}

impl EvalContext {
    /// Creates a context with no parameters and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parameters(HashMap::new())
    }

    /// Creates a context with parameters.
    #[must_use]
    pub fn with_parameters(parameters: HashMap<u32, Value>) -> Self {
        Self {
            parameters,
            cancelled: AtomicBool::new(false),
            stats: JoinStats::default(),
            config: JoinConfig::default(),
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: JoinConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a parameter value.
    pub fn set_parameter(&mut self, index: u32, value: Value) {
        self.parameters.insert(index, value);
    }

    /// Gets a parameter value.
    #[inline]
    #[must_use]
    pub fn get_parameter(&self, index: u32) -> Option<&Value> {
        self.parameters.get(&index)
    }

    /// Cancels the join.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks if the join has been cancelled.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the statistics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &JoinStats {
        &self.stats
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// Records one evaluated row pair and whether it matched.
    #[inline]
    pub fn record_pair(&self, matched: bool) {
        if self.config.collect_stats {
            self.stats.pairs_evaluated.fetch_add(1, Ordering::Relaxed);
            if matched {
                self.stats.pairs_matched.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Records one encoded join key.
    #[inline]
    pub fn record_key_encoded(&self) {
        if self.config.collect_stats {
            self.stats.keys_encoded.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalContext")
            .field("parameters", &self.parameters)
            .field("cancelled", &self.cancelled)
            .field("stats", &self.stats)
            .field("config", &self.config)
            .finish()
    }
}

/// Counters collected while a join runs.
///
/// Only updated when [`JoinConfig::collect_stats`] is set.
#[derive(Debug, Default)]
pub struct JoinStats {
    pairs_evaluated: AtomicU64,
    pairs_matched: AtomicU64,
    keys_encoded: AtomicU64,
}

impl JoinStats {
    /// Returns the number of row pairs passed to `eval`.
    #[inline]
    #[must_use]
    pub fn pairs_evaluated(&self) -> u64 {
        self.pairs_evaluated.load(Ordering::Relaxed)
    }

    /// Returns the number of row pairs `eval` accepted.
    #[inline]
    #[must_use]
    pub fn pairs_matched(&self) -> u64 {
        self.pairs_matched.load(Ordering::Relaxed)
    }

    /// Returns the number of join keys encoded.
    #[inline]
    #[must_use]
    pub fn keys_encoded(&self) -> u64 {
        self.keys_encoded.load(Ordering::Relaxed)
    }
}

/// Default maximum rows a join driver may hold in memory (1 million rows).
pub const DEFAULT_MAX_ROWS_IN_MEMORY: usize = 1_000_000;

/// Configuration options for join evaluation.
#[derive(Debug, Clone)]
pub struct JoinConfig {
    /// Whether to collect statistics.
    pub collect_stats: bool,
    /// Initial capacity of the buffer join keys are encoded into.
    pub key_buffer_capacity: usize,
    /// Maximum number of rows a driver may materialize for a hash or merge
    /// join. Exceeding it returns `QueryTooLarge`; 0 disables the limit.
    pub max_rows_in_memory: usize,
}

impl JoinConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            collect_stats: false,
            key_buffer_capacity: 32,
            max_rows_in_memory: DEFAULT_MAX_ROWS_IN_MEMORY,
        }
    }

    /// Enables statistics collection.
    #[must_use]
    pub const fn with_stats(mut self) -> Self {
        self.collect_stats = true;
        self
    }

    /// Sets the initial key buffer capacity.
    #[must_use]
    pub const fn with_key_buffer_capacity(mut self, capacity: usize) -> Self {
        self.key_buffer_capacity = capacity;
        self
    }

    /// Sets the maximum rows that can be materialized in memory.
    #[must_use]
    pub const fn with_max_rows_in_memory(mut self, limit: usize) -> Self {
        self.max_rows_in_memory = limit;
        self
    }
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self::new()
    }
}
