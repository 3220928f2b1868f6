use crate::{
    bindings::SessionId,
    metrics::PlaybackMetrics,
    session::{EngineConfiguration, PlaybackConfiguration, PlaybackStatus, StatusSeverity},
    utils::logger::LoggerLevel,
    wasm_bindgen, JsError, Logger,
};

use super::{core::SessionSlot, Dispatcher};

/// Methods exposed to the JavaScript-side.
///
/// Note that these are not the only methods callable by JavaScript. There's
/// also "event_listeners" which as its name point at, should be called when particular
/// events happen. Such "event_listeners" are defined in its own file.
#[wasm_bindgen]
impl Dispatcher {
    /// Create a new `Dispatcher` allowing to play a live stream on the HTMLMediaElement that
    /// should be linked to it on the JavaScript-side.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Dispatcher {
            sessions: SessionSlot::new(),
            config: PlaybackConfiguration::default(),
            engine_config: EngineConfiguration::default(),
        }
    }

    /// Start playing the HLS manifest at `manifest_url`, after disposing of the content
    /// attached until now, if one.
    ///
    /// Returns the `SessionId` with which asynchronous answers for that content should be
    /// reported, or an error if `manifest_url` cannot be played.
    pub fn attach(&mut self, manifest_url: &str) -> Result<SessionId, JsError> {
        Ok(self.attach_core(manifest_url)?)
    }

    /// Stop playback and release the media element.
    pub fn detach(&mut self) {
        self.sessions.detach();
    }

    pub fn status(&self) -> PlaybackStatus {
        self.sessions
            .current()
            .map_or(PlaybackStatus::Idle, |session| session.status())
    }

    /// Hyphenated name of the current status, such as `"network-retry"`.
    pub fn status_label(&self) -> String {
        self.status().as_str().to_owned()
    }

    pub fn status_severity(&self) -> StatusSeverity {
        self.status().severity()
    }

    /// Message describing the last error or recovery, if one should be displayed.
    pub fn error_message(&self) -> Option<String> {
        self.sessions
            .current()
            .and_then(|session| session.error_message().map(str::to_owned))
    }

    /// Last metrics snapshot of the current session.
    pub fn metrics(&self) -> PlaybackMetrics {
        self.sessions
            .current()
            .map(|session| session.metrics())
            .unwrap_or_default()
    }

    pub fn set_log_level(&mut self, level: LoggerLevel) {
        Logger::set_logger_level(level);
    }

    /// Options given to streaming engine instances created from now on.
    pub fn engine_configuration(&self) -> EngineConfiguration {
        self.engine_config
    }

    /// Update the options given to streaming engine instances created from now on.
    pub fn set_engine_configuration(&mut self, config: EngineConfiguration) {
        self.engine_config = config;
    }

    /// Only taken into account by the next attached content.
    pub fn set_metrics_interval(&mut self, interval_ms: f64) -> Result<(), JsError> {
        Ok(self.update_config(|c| c.metrics_interval_ms = interval_ms)?)
    }

    /// Only taken into account by the next attached content.
    pub fn set_watchdog_interval(&mut self, interval_ms: f64) -> Result<(), JsError> {
        Ok(self.update_config(|c| c.watchdog_interval_ms = interval_ms)?)
    }

    pub fn set_stall_trigger(&mut self, duration_ms: f64) -> Result<(), JsError> {
        Ok(self.update_config(|c| c.stall_trigger_ms = duration_ms)?)
    }

    pub fn set_progress_epsilon(&mut self, epsilon_sec: f64) -> Result<(), JsError> {
        Ok(self.update_config(|c| c.progress_epsilon_sec = epsilon_sec)?)
    }

    pub fn set_max_stall_recovery_attempts(&mut self, attempts: u32) -> Result<(), JsError> {
        Ok(self.update_config(|c| c.max_stall_recovery_attempts = attempts)?)
    }

    pub fn set_stall_low_buffer(&mut self, buffer_sec: f64) -> Result<(), JsError> {
        Ok(self.update_config(|c| c.stall_low_buffer_sec = buffer_sec)?)
    }

    /// Update both latency thresholds at once, as the soft one cannot exceed the hard one.
    pub fn set_latency_thresholds(
        &mut self,
        soft_catchup_sec: f64,
        hard_seek_sec: f64,
    ) -> Result<(), JsError> {
        Ok(self.update_config(|c| {
            c.latency_soft_catchup_sec = soft_catchup_sec;
            c.latency_hard_seek_sec = hard_seek_sec;
        })?)
    }

    pub fn set_live_edge_backoff(&mut self, backoff_sec: f64) -> Result<(), JsError> {
        Ok(self.update_config(|c| c.live_edge_backoff_sec = backoff_sec)?)
    }

    pub fn set_catchup_playback_rate(&mut self, rate: f64) -> Result<(), JsError> {
        Ok(self.update_config(|c| c.catchup_playback_rate = rate)?)
    }

    pub fn set_min_seek_gain(&mut self, gain_sec: f64) -> Result<(), JsError> {
        Ok(self.update_config(|c| c.min_seek_gain_sec = gain_sec)?)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
