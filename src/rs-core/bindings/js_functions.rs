use crate::{
    media_element::MediaObservation,
    metrics::PlaybackMetrics,
    session::{EngineConfiguration, PlaybackStatus},
    wasm_bindgen,
};

/// # js_functions
///
/// This file lists all JavaScript functions that are callable from Rust as well as
/// struct and enumeration used by those functions.

#[wasm_bindgen]
extern "C" {
    // Log the given text in the JavaScript console, with the log level given.
    pub fn jsLog(log_level: LogLevel, log: &str);

    // Monotonic clock, in milliseconds (`performance.now()`).
    pub fn jsNow() -> f64;

    // Starts a timer for the number of milliseconds indicated by the `duration` argument.
    //
    // Once this timer has elapsed, and unless `jsClearTimer` has been called since with
    // the `TimerId` returned by this function, the `on_timer_ended` method of the
    // `Dispatcher` will be called with both the corresponding `TimerId` and `reason`.
    pub fn jsTimer(duration: f64, reason: TimerReason) -> TimerId;

    // Same as `jsTimer`, but `on_timer_ended` is called every `period` milliseconds until
    // `jsClearTimer` is called with the returned `TimerId`.
    pub fn jsInterval(period: f64, reason: TimerReason) -> TimerId;

    // Clear a timer started with `jsTimer` or `jsInterval`.
    pub fn jsClearTimer(id: TimerId);

    // Dynamically import the streaming engine module.
    //
    // Once done, the `on_engine_module_loaded` method of the `Dispatcher` is called with
    // the same `session_id`, indicating whether the engine and native HLS playback are
    // supported. On failure, `on_engine_module_failed` is called instead.
    pub fn jsLoadEngineModule(session_id: SessionId);

    // Construct a streaming engine instance with the given configuration, from the module
    // loaded through `jsLoadEngineModule`.
    //
    // Events of that instance are then reported to the `Dispatcher` through its
    // `on_manifest_parsed` and `on_engine_error` methods, along with the `EngineId` of
    // the returned `EngineCreationResult`.
    pub fn jsCreateEngine(config: EngineConfiguration) -> EngineCreationResult;

    // Ask the engine to load the given manifest.
    pub fn jsEngineLoadSource(engine_id: EngineId, url: &str);

    // Attach the engine to the media element linked to the `Dispatcher`.
    pub fn jsEngineAttachMedia(engine_id: EngineId);

    // (Re)start loading manifests and segments.
    pub fn jsEngineStartLoad(engine_id: EngineId);

    // Ask the engine to recover from a decoding error in place.
    pub fn jsEngineRecoverMediaError(engine_id: EngineId);

    // Position of the live edge the engine synchronizes to, if known.
    pub fn jsEngineLiveSyncPosition(engine_id: EngineId) -> Option<f64>;

    // Destroy the engine instance. No event is sent for that `EngineId` afterwards.
    pub fn jsEngineDestroy(engine_id: EngineId);

    // Synchronously describe the state of the media element.
    pub fn jsObserveMedia() -> MediaObservation;

    // Call `HTMLMediaElement.prototype.play`.
    //
    // The outcome of the returned promise is reported through `on_play_result`, with the
    // same `session_id` and `reason`.
    pub fn jsPlay(session_id: SessionId, reason: PlayReason);

    // Call `HTMLMediaElement.prototype.pause`.
    pub fn jsPause();

    // Move the playhead of the media element.
    pub fn jsSeek(position: f64);

    // Method called to change the playback rate (speed of playback).
    pub fn jsSetPlaybackRate(playback_rate: f64);

    // Let the media element play the given URL by itself.
    pub fn jsSetVideoSource(url: &str);

    // Remove the media element's `src` attribute and reset it through `load()`.
    pub fn jsRemoveVideoSource();

    // Start forwarding the media element's `waiting`, `playing` and `error` events to
    // the `Dispatcher`'s `on_media_*` methods, with the given `session_id`.
    pub fn jsAddMediaListeners(session_id: SessionId);

    // Stop forwarding media element events.
    pub fn jsRemoveMediaListeners();

    // Announce a new status, optionally with a message to display.
    pub fn jsAnnounceStatus(status: PlaybackStatus, error_message: Option<&str>);

    // Announce a new metrics snapshot.
    pub fn jsAnnounceMetrics(metrics: PlaybackMetrics);
}

/// Errors that can arise when constructing a streaming engine instance.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineCreationErrorCode {
    /// `jsLoadEngineModule` did not succeed beforehand.
    ModuleNotLoaded,

    /// The engine threw because of the configuration given.
    InvalidConfiguration,

    /// An unknown error happened.
    UnknownError,
}

/// Result of calling the `jsCreateEngine` JavaScript function.
///
/// Creation of an `EngineCreationResult` should only be performed by the JavaScript side
/// through the exposed static constructors.
#[wasm_bindgen]
pub struct EngineCreationResult {
    engine_id: EngineId,
    error: Option<(EngineCreationErrorCode, Option<String>)>,
}

#[wasm_bindgen]
impl EngineCreationResult {
    /// Creates an `EngineCreationResult` indicating success, with the corresponding
    /// `EngineId`.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn success(engine_id: EngineId) -> Self {
        Self {
            engine_id,
            error: None,
        }
    }

    /// Creates an `EngineCreationResult` indicating failure, with the corresponding
    /// error.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn error(err: EngineCreationErrorCode, desc: Option<String>) -> Self {
        Self {
            engine_id: 0,
            error: Some((err, desc)),
        }
    }
}

impl JsResult<EngineId, EngineCreationErrorCode> for EngineCreationResult {
    /// Basically unwrap and consume the `EngineCreationResult`, converting it into a
    /// Result enum.
    fn result(self) -> Result<EngineId, (EngineCreationErrorCode, Option<String>)> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.engine_id),
        }
    }
}

/// Trait allowing to convert "JavaScript Results" as exposed by the JavaScript functions into
/// `Result` structs more idiomatic to Rust.
pub(crate) trait JsResult<T, E> {
    fn result(self) -> Result<T, (E, Option<String>)>;
}

/// Values that can be given to the `jsTimer` and `jsInterval` JavaScript functions.
///
/// This can then help to identify what the timer was for once resolved.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerReason {
    /// Resume loading with the current engine instance.
    RetryLoad = 0,

    /// Destroy the current engine instance and construct a new one.
    FullReload = 1,

    /// Collect metrics and check the distance to the live edge.
    MetricsTick = 2,

    /// Check that playback progresses.
    WatchdogTick = 3,
}

/// Why a `jsPlay` call was made, given back with its outcome.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayReason {
    /// Start of playback once the content is ready.
    Autoplay = 0,

    /// Restart after the engine was asked to recover from a stall.
    StallRecovery = 1,

    /// Restart after the native source was re-attached following a stall.
    NativeReload = 2,
}

/// Levels with which a log can be emitted.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd)]
pub enum LogLevel {
    /// Log level reserved for very important errors and highly unexpected events.
    Error = 0,

    /// Log level reserved for less important errors and unexpected events.
    Warn = 1,

    /// Log level reserved for important events
    Info = 2,

    /// Log level used when debugging. Small-ish yet impactful events should be logged with it.
    Debug = 3,
}

/// Identify a timer or interval started with `jsTimer` or `jsInterval`.
pub type TimerId = f64;

/// Identify a playback session, incremented each time the `Dispatcher` attaches a content.
pub type SessionId = u32;

/// Identify a streaming engine instance created with `jsCreateEngine`.
pub type EngineId = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_creation_result_into_result() {
        assert_eq!(EngineCreationResult::success(4).result(), Ok(4));
        assert_eq!(
            EngineCreationResult::error(
                EngineCreationErrorCode::InvalidConfiguration,
                Some("bad".to_owned())
            )
            .result(),
            Err((
                EngineCreationErrorCode::InvalidConfiguration,
                Some("bad".to_owned())
            ))
        );
    }
}
