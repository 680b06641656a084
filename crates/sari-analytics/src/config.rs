//! # Analytics Configuration
//!
//! Tuning knobs for the refresh service, with defaults matching a
//! single-store deployment.

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the analytics engine.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// How many recent sales a full refresh pulls from the store.
    ///
    /// The dashboard looks at recent history, not the whole ledger; a
    /// small sari-sari store does well under a hundred sales a day.
    pub fetch_limit: u32,

    /// Run a full refresh as soon as the engine starts.
    pub refresh_on_start: bool,

    /// Capacity of the engine's command queue. Notifications beyond
    /// this apply backpressure on the sender.
    pub command_buffer: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            fetch_limit: 100,
            refresh_on_start: true,
            command_buffer: 64,
        }
    }
}

impl AnalyticsConfig {
    /// Sets the fetch limit.
    pub fn fetch_limit(mut self, limit: u32) -> Self {
        self.fetch_limit = limit;
        self
    }

    /// Sets whether the engine refreshes immediately on start.
    pub fn refresh_on_start(mut self, refresh: bool) -> Self {
        self.refresh_on_start = refresh;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
