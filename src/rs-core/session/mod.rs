use std::fmt;

use crate::{
    bindings::{EngineId, TimerId, TimerReason},
    metrics::PlaybackMetrics,
    utils::url::Url,
    wasm_bindgen,
    watchdog::{PlaybackPath, StallWatchdog},
};
use thiserror::Error;

mod configuration;
mod core;
mod counters;
mod host;
#[cfg(test)]
pub(crate) mod mock;

pub(crate) use configuration::{ConfigurationError, PlaybackConfiguration};
pub use configuration::EngineConfiguration;
pub(crate) use counters::RecoveryCounters;
pub(crate) use host::{EngineCreationError, MediaSink, PlaybackHost, StreamingEngine, TimerScheduler};

/// Playback state of a session, as displayed to the operator.
///
/// Exactly one holds at any time.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No content attached.
    Idle = 0,
    /// The manifest is being loaded.
    Loading = 1,
    /// The content can be played but is not playing, for example because autoplay was refused.
    Ready = 2,
    Playing = 3,
    /// The media element waits for data.
    Buffering = 4,
    /// A delayed retry or full engine reload is pending.
    NetworkRetry = 5,
    /// The engine is recovering from a decoding issue.
    MediaRecovery = 6,
    /// Neither the streaming engine nor the media element can play HLS. Terminal.
    HlsUnsupported = 7,
    /// The streaming engine could not be loaded or constructed. Terminal.
    HlsLoadFailed = 8,
    /// The media element reported an error. Terminal.
    VideoError = 9,
    /// A recovery budget was exhausted or the error cannot be recovered. Terminal.
    FatalError = 10,
}

/// Coarse category of a `PlaybackStatus`, for status indicators.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusSeverity {
    Ok = 0,
    Ready = 1,
    Warn = 2,
    Error = 3,
    Neutral = 4,
}

impl PlaybackStatus {
    /// Returns `true` for statuses no event can leave. Only a new attachment recovers from them.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PlaybackStatus::HlsUnsupported
                | PlaybackStatus::HlsLoadFailed
                | PlaybackStatus::VideoError
                | PlaybackStatus::FatalError
        )
    }

    pub fn severity(self) -> StatusSeverity {
        match self {
            PlaybackStatus::Playing => StatusSeverity::Ok,
            PlaybackStatus::Ready => StatusSeverity::Ready,
            PlaybackStatus::Loading | PlaybackStatus::Buffering | PlaybackStatus::NetworkRetry => {
                StatusSeverity::Warn
            }
            PlaybackStatus::HlsUnsupported
            | PlaybackStatus::VideoError
            | PlaybackStatus::FatalError => StatusSeverity::Error,
            // terminal, but displayed like the states which are not failures
            PlaybackStatus::Idle | PlaybackStatus::MediaRecovery | PlaybackStatus::HlsLoadFailed => {
                StatusSeverity::Neutral
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Loading => "loading",
            PlaybackStatus::Ready => "ready",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Buffering => "buffering",
            PlaybackStatus::NetworkRetry => "network-retry",
            PlaybackStatus::MediaRecovery => "media-recovery",
            PlaybackStatus::HlsUnsupported => "hls-unsupported",
            PlaybackStatus::HlsLoadFailed => "hls-load-failed",
            PlaybackStatus::VideoError => "video-error",
            PlaybackStatus::FatalError => "fatal-error",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons for a session to stop for good, whose message is not produced by the error
/// classifier.
#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum PlaybackError {
    #[error("Unauthorized while loading HLS. Please sign in again.")]
    Unauthorized,
    #[error("This browser does not support authenticated HLS playback.")]
    HlsUnsupported,
    #[error("Could not load the HLS engine: {message}")]
    EngineModuleLoad { message: String },
    #[error("Could not create the HLS engine: {0}")]
    EngineCreation(#[from] EngineCreationError),
    #[error("Video element reported an error.")]
    VideoElement,
    #[error("Playback repeatedly stalled. Please restart stream source.")]
    RepeatedStalls,
}

impl PlaybackError {
    /// Terminal status this error leads to.
    pub(crate) fn status(&self) -> PlaybackStatus {
        match self {
            PlaybackError::Unauthorized | PlaybackError::RepeatedStalls => {
                PlaybackStatus::FatalError
            }
            PlaybackError::HlsUnsupported => PlaybackStatus::HlsUnsupported,
            PlaybackError::EngineModuleLoad { .. } | PlaybackError::EngineCreation(_) => {
                PlaybackStatus::HlsLoadFailed
            }
            PlaybackError::VideoElement => PlaybackStatus::VideoError,
        }
    }
}

/// The single retry or reload timer a session may have pending.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingRetry {
    timer_id: TimerId,
    reason: TimerReason,
}

/// Playback of one manifest URL on one media element, from its attachment to its disposal.
///
/// It owns every recovery counter and the current status, feeds the error classifier, the
/// stall watchdog and the live-edge synchronization, then applies their decisions on the
/// streaming engine and the media element through its `PlaybackHost`.
pub(crate) struct PlaybackSession<H: PlaybackHost> {
    host: H,
    manifest_url: Url,
    config: PlaybackConfiguration,
    engine_config: EngineConfiguration,

    status: PlaybackStatus,
    error_message: Option<String>,
    counters: RecoveryCounters,

    /// Stalls seen since the session started, never reset.
    stall_count: u32,
    metrics: PlaybackMetrics,
    watchdog: StallWatchdog,

    /// Current streaming engine instance, `None` on the native path or while (re)loading
    /// the engine module.
    engine: Option<H::Engine>,

    /// `true` once the media element plays the manifest URL by itself.
    is_native: bool,

    metrics_interval: Option<TimerId>,
    watchdog_interval: Option<TimerId>,
    pending_retry: Option<PendingRetry>,

    /// Set first thing on disposal. Nothing touches the host once it is set.
    disposed: bool,
}

impl<H: PlaybackHost> PlaybackSession<H> {
    pub(crate) fn new(
        host: H,
        manifest_url: Url,
        config: PlaybackConfiguration,
        engine_config: EngineConfiguration,
    ) -> Self {
        let now = host.now_ms();
        Self {
            host,
            manifest_url,
            config,
            engine_config,
            status: PlaybackStatus::Idle,
            error_message: None,
            counters: RecoveryCounters::default(),
            stall_count: 0,
            metrics: PlaybackMetrics::default(),
            watchdog: StallWatchdog::new(0., now),
            engine: None,
            is_native: false,
            metrics_interval: None,
            watchdog_interval: None,
            pending_retry: None,
            disposed: false,
        }
    }

    pub(crate) fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub(crate) fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub(crate) fn metrics(&self) -> PlaybackMetrics {
        self.metrics
    }

    pub(crate) fn counters(&self) -> RecoveryCounters {
        self.counters
    }

    pub(crate) fn manifest_url(&self) -> &Url {
        &self.manifest_url
    }

    /// Identifier of the current streaming engine instance, if one.
    pub(crate) fn engine_id(&self) -> Option<EngineId> {
        self.engine.as_ref().map(|engine| engine.id())
    }

    /// Replace the thresholds used from now on. Tick intervals are kept as they were when
    /// the session started.
    pub(crate) fn update_configuration(&mut self, config: PlaybackConfiguration) {
        self.config = PlaybackConfiguration {
            metrics_interval_ms: self.config.metrics_interval_ms,
            watchdog_interval_ms: self.config.watchdog_interval_ms,
            ..config
        };
    }

    /// How media reaches the media element right now. An engine about to be rebuilt is
    /// already considered gone.
    fn playback_path(&self) -> PlaybackPath {
        let reload_pending = self
            .pending_retry
            .map_or(false, |pending| pending.reason == TimerReason::FullReload);
        if reload_pending {
            PlaybackPath::Pending
        } else if self.engine.is_some() {
            PlaybackPath::Engine
        } else if self.is_native {
            PlaybackPath::Native
        } else {
            PlaybackPath::Pending
        }
    }
}

impl<H: PlaybackHost> Drop for PlaybackSession<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}
