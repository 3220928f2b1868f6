use crate::wasm_bindgen;
use thiserror::Error;

const DEFAULT_METRICS_INTERVAL_MS: f64 = 1000.;
const DEFAULT_WATCHDOG_INTERVAL_MS: f64 = 1000.;
const DEFAULT_STALL_TRIGGER_MS: f64 = 8000.;
const DEFAULT_PROGRESS_EPSILON_SEC: f64 = 0.05;
const DEFAULT_MAX_STALL_RECOVERY_ATTEMPTS: u32 = 5;
const DEFAULT_STALL_LOW_BUFFER_SEC: f64 = 0.2;
const DEFAULT_LATENCY_SOFT_CATCHUP_SEC: f64 = 4.;
const DEFAULT_LATENCY_HARD_SEEK_SEC: f64 = 8.;
const DEFAULT_LIVE_EDGE_BACKOFF_SEC: f64 = 1.2;
const DEFAULT_CATCHUP_PLAYBACK_RATE: f64 = 1.08;
const DEFAULT_MIN_SEEK_GAIN_SEC: f64 = 0.25;

/// Tuning of the playback control loop.
///
/// A copy is taken by each new `PlaybackSession`. Thresholds may then be updated on a running
/// session, intervals are only read when the session starts.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlaybackConfiguration {
    /// Period, in milliseconds, at which metrics are collected and the live-edge
    /// synchronization is checked.
    pub(crate) metrics_interval_ms: f64,

    /// Period, in milliseconds, at which the stall watchdog checks playback progress.
    pub(crate) watchdog_interval_ms: f64,

    /// Time, in milliseconds, without any position change while playing after which
    /// playback is considered stalled.
    pub(crate) stall_trigger_ms: f64,

    /// Minimum position change, in seconds, regarded as progress.
    pub(crate) progress_epsilon_sec: f64,

    /// Recoveries the watchdog attempts in place before rebuilding the engine.
    pub(crate) max_stall_recovery_attempts: u32,

    /// Under that amount of buffer ahead, in seconds, a stalled engine is asked to restart
    /// loading rather than to recover its decoder.
    pub(crate) stall_low_buffer_sec: f64,

    /// Latency to the live edge, in seconds, from which playback is sped up.
    pub(crate) latency_soft_catchup_sec: f64,

    /// Latency to the live edge, in seconds, from which we seek close to it.
    pub(crate) latency_hard_seek_sec: f64,

    /// Distance, in seconds, kept from the live edge when seeking to it.
    pub(crate) live_edge_backoff_sec: f64,

    /// Playback rate applied while catching up.
    pub(crate) catchup_playback_rate: f64,

    /// A live-edge seek is only performed if it moves the position forward by more than this
    /// amount of seconds.
    pub(crate) min_seek_gain_sec: f64,
}

impl Default for PlaybackConfiguration {
    fn default() -> Self {
        Self {
            metrics_interval_ms: DEFAULT_METRICS_INTERVAL_MS,
            watchdog_interval_ms: DEFAULT_WATCHDOG_INTERVAL_MS,
            stall_trigger_ms: DEFAULT_STALL_TRIGGER_MS,
            progress_epsilon_sec: DEFAULT_PROGRESS_EPSILON_SEC,
            max_stall_recovery_attempts: DEFAULT_MAX_STALL_RECOVERY_ATTEMPTS,
            stall_low_buffer_sec: DEFAULT_STALL_LOW_BUFFER_SEC,
            latency_soft_catchup_sec: DEFAULT_LATENCY_SOFT_CATCHUP_SEC,
            latency_hard_seek_sec: DEFAULT_LATENCY_HARD_SEEK_SEC,
            live_edge_backoff_sec: DEFAULT_LIVE_EDGE_BACKOFF_SEC,
            catchup_playback_rate: DEFAULT_CATCHUP_PLAYBACK_RATE,
            min_seek_gain_sec: DEFAULT_MIN_SEEK_GAIN_SEC,
        }
    }
}

/// Error returned when a `PlaybackConfiguration` would not make sense.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum ConfigurationError {
    #[error("`{name}` should be a strictly positive duration, got {value}.")]
    NonPositiveDuration { name: &'static str, value: f64 },
    #[error("`{name}` cannot be negative, got {value}.")]
    Negative { name: &'static str, value: f64 },
    #[error("The catch-up playback rate should be greater than 1, got {0}.")]
    InvalidCatchUpRate(f64),
    #[error("The soft catch-up latency ({soft}s) cannot exceed the seek latency ({hard}s).")]
    InconsistentLatencyThresholds { soft: f64, hard: f64 },
}

impl PlaybackConfiguration {
    /// Check that every value is usable, returning the first issue found.
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, value) in [
            ("metrics_interval_ms", self.metrics_interval_ms),
            ("watchdog_interval_ms", self.watchdog_interval_ms),
            ("stall_trigger_ms", self.stall_trigger_ms),
        ] {
            if !(value.is_finite() && value > 0.) {
                return Err(ConfigurationError::NonPositiveDuration { name, value });
            }
        }
        for (name, value) in [
            ("progress_epsilon_sec", self.progress_epsilon_sec),
            ("stall_low_buffer_sec", self.stall_low_buffer_sec),
            ("latency_soft_catchup_sec", self.latency_soft_catchup_sec),
            ("latency_hard_seek_sec", self.latency_hard_seek_sec),
            ("live_edge_backoff_sec", self.live_edge_backoff_sec),
            ("min_seek_gain_sec", self.min_seek_gain_sec),
        ] {
            if value.is_nan() || value < 0. {
                return Err(ConfigurationError::Negative { name, value });
            }
        }
        if !(self.catchup_playback_rate.is_finite() && self.catchup_playback_rate > 1.) {
            return Err(ConfigurationError::InvalidCatchUpRate(
                self.catchup_playback_rate,
            ));
        }
        if self.latency_soft_catchup_sec > self.latency_hard_seek_sec {
            return Err(ConfigurationError::InconsistentLatencyThresholds {
                soft: self.latency_soft_catchup_sec,
                hard: self.latency_hard_seek_sec,
            });
        }
        Ok(())
    }
}

/// Options given to the streaming engine when it is constructed through `jsCreateEngine`.
///
/// Those are tuned for near-live surveillance-like streams: a small live sync window, a
/// bounded forward buffer and credentials sent with every request.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfiguration {
    pub low_latency_mode: bool,
    /// Seconds of already played media kept in the buffer.
    pub back_buffer_length: f64,
    /// `-1` to start at the live sync position.
    pub start_position: f64,
    pub start_frag_prefetch: bool,
    /// Distance to the live edge, in target durations, the engine starts and syncs at.
    pub live_sync_duration_count: u32,
    /// Distance to the live edge, in target durations, from which the engine re-syncs itself.
    pub live_max_latency_duration_count: u32,
    pub max_buffer_length: f64,
    pub max_max_buffer_length: f64,
    pub max_live_sync_playback_rate: f64,
    pub nudge_max_retry: u32,
    pub manifest_loading_timeout_ms: f64,
    pub level_loading_timeout_ms: f64,
    pub fragment_loading_timeout_ms: f64,
    pub manifest_loading_max_retry: u32,
    pub level_loading_max_retry: u32,
    pub fragment_loading_max_retry: u32,
    /// Send cookies with manifest and segment requests.
    pub with_credentials: bool,
}

#[wasm_bindgen]
impl EngineConfiguration {
    /// Create an `EngineConfiguration` with the default options, which the JavaScript-side
    /// may then tweak field by field before giving it to `Dispatcher::set_engine_configuration`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for EngineConfiguration {
    fn default() -> Self {
        Self {
            low_latency_mode: false,
            back_buffer_length: 30.,
            start_position: -1.,
            start_frag_prefetch: true,
            live_sync_duration_count: 3,
            live_max_latency_duration_count: 10,
            max_buffer_length: 24.,
            max_max_buffer_length: 48.,
            max_live_sync_playback_rate: 1.2,
            nudge_max_retry: 8,
            manifest_loading_timeout_ms: 20000.,
            level_loading_timeout_ms: 20000.,
            fragment_loading_timeout_ms: 20000.,
            manifest_loading_max_retry: 6,
            level_loading_max_retry: 6,
            fragment_loading_max_retry: 6,
            with_credentials: true,
        }
    }
}
