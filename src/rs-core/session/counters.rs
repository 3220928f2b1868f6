/// Recovery budget consumed so far by the current playback attempt.
///
/// Owned by the `PlaybackSession` and handed by value to the pure decision functions
/// (`error_policy::decide`, `StallWatchdog::on_tick`), which return the next values instead
/// of mutating anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RecoveryCounters {
    /// Consecutive server-side (5xx or unknown status) network retries.
    pub(crate) retry_count: u32,

    /// Consecutive "not produced yet" (HTTP 404) retries.
    pub(crate) not_found_retry_count: u32,

    /// Full engine re-initializations performed.
    pub(crate) fatal_reload_count: u32,

    /// In-place decoder recovery attempts.
    pub(crate) media_recovery_count: u32,

    /// Watchdog-triggered recovery attempts since progress was last confirmed.
    pub(crate) stall_recovery_attempts: u32,
}

impl RecoveryCounters {
    /// Reset every counter together, as done once a manifest has been parsed successfully.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Amount of network retries of any kind, as reported in the metrics.
    pub(crate) fn total_network_retries(&self) -> u32 {
        self.retry_count + self.not_found_retry_count
    }
}
