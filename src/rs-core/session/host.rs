//! Seams between the playback logic and the environment it drives.
//!
//! In the browser, those are implemented by `bindings::JsHost` on top of the JavaScript
//! functions. Tests implement them with recording doubles.

use crate::{
    bindings::{EngineCreationErrorCode, EngineId, PlayReason, TimerId, TimerReason},
    media_element::MediaObservation,
    metrics::PlaybackMetrics,
};
use thiserror::Error;

use super::{EngineConfiguration, PlaybackStatus};

/// One instance of the adaptive streaming engine.
pub(crate) trait StreamingEngine {
    /// Identifier carried by every event this instance emits.
    fn id(&self) -> EngineId;
    fn load_source(&mut self, url: &str);
    fn attach_media(&mut self);
    fn start_load(&mut self);
    fn recover_media_error(&mut self);

    /// Position of the live edge the engine is syncing to, if known.
    fn live_sync_position(&self) -> Option<f64>;

    /// Release the instance. It emits no event afterwards.
    fn destroy(&mut self);
}

/// Clock and timers. Timers end asynchronously through the session's `on_timer_ended`.
pub(crate) trait TimerScheduler {
    /// Monotonic time in milliseconds.
    fn now_ms(&self) -> f64;
    fn start_timer(&mut self, duration_ms: f64, reason: TimerReason) -> TimerId;
    fn start_interval(&mut self, period_ms: f64, reason: TimerReason) -> TimerId;
    fn clear_timer(&mut self, id: TimerId);
}

/// The media element a session plays on.
pub(crate) trait MediaSink {
    fn observe_media(&self) -> MediaObservation;

    /// Start playback. The outcome is reported asynchronously through the session's
    /// `on_play_result` with the same `reason`.
    fn play(&mut self, reason: PlayReason);
    fn pause(&mut self);
    fn seek(&mut self, position: f64);
    fn set_playback_rate(&mut self, rate: f64);

    /// Let the media element load the given URL by itself.
    fn set_source(&mut self, url: &str);

    /// Remove the current source and reset the media element.
    fn remove_source(&mut self);

    /// Start forwarding `waiting`, `playing` and `error` events.
    fn add_listeners(&mut self);
    fn remove_listeners(&mut self);
}

/// Everything a `PlaybackSession` needs from its environment.
pub(crate) trait PlaybackHost: TimerScheduler + MediaSink {
    type Engine: StreamingEngine;

    /// Load the streaming engine module. The answer comes asynchronously through the
    /// session's `on_engine_module_loaded` or `on_engine_module_failed`.
    fn request_engine_module(&mut self);

    fn create_engine(
        &mut self,
        config: &EngineConfiguration,
    ) -> Result<Self::Engine, EngineCreationError>;

    fn announce_status(&mut self, status: PlaybackStatus, error_message: Option<&str>);
    fn announce_metrics(&mut self, metrics: PlaybackMetrics);
}

/// Error that may be returned when constructing a streaming engine.
#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum EngineCreationError {
    #[error("The streaming engine module is not loaded.")]
    ModuleNotLoaded,
    #[error("The streaming engine rejected its configuration: {message}")]
    InvalidConfiguration { message: String },
    #[error("Uncategorized Error when creating the streaming engine: {message}")]
    UnknownError { message: String },
}

impl From<(EngineCreationErrorCode, Option<String>)> for EngineCreationError {
    fn from(x: (EngineCreationErrorCode, Option<String>)) -> Self {
        let message = x.1.unwrap_or_else(|| "Unknown Error.".to_string());
        match x.0 {
            EngineCreationErrorCode::ModuleNotLoaded => EngineCreationError::ModuleNotLoaded,
            EngineCreationErrorCode::InvalidConfiguration => {
                EngineCreationError::InvalidConfiguration { message }
            }
            EngineCreationErrorCode::UnknownError => EngineCreationError::UnknownError { message },
        }
    }
}
