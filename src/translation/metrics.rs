//! Translation metrics: dictionary cache behaviour, loads and missing keys.
//!
//! Each `TranslationFacade` owns one `TranslationMetrics`; there is no
//! process-wide instance.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Activations served from an already loaded dictionary
    cache_hits: AtomicUsize,

    /// Activations that needed a load
    cache_misses: AtomicUsize,

    /// Dictionary loads started (including default-language fallbacks)
    loads: AtomicUsize,

    /// Dictionary loads that failed
    load_failures: AtomicUsize,

    /// Lookups that fell back to the raw key
    missing_keys: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing_key(&self) {
        self.missing_keys.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> usize {
        self.load_failures.load(Ordering::Relaxed)
    }

    pub fn missing_keys(&self) -> usize {
        self.missing_keys.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_activations = hits + misses;
        let cache_hit_rate = if total_activations > 0 {
            (hits as f64 / total_activations as f64) * 100.0
        } else {
            0.0
        };

        let loads = self.loads();
        let failures = self.load_failures();
        let load_success_rate = if loads > 0 {
            (loads.saturating_sub(failures) as f64 / loads as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            loads,
            load_failures: failures,
            load_success_rate,
            missing_keys: self.missing_keys(),
        }
    }
}

/// Snapshot of a facade's counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Percentage (0-100)
    pub cache_hit_rate: f64,

    pub loads: usize,
    pub load_failures: usize,

    /// Percentage (0-100)
    pub load_success_rate: f64,

    pub missing_keys: usize,
}
