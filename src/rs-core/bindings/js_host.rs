use crate::{
    media_element::MediaObservation,
    metrics::PlaybackMetrics,
    session::{
        EngineConfiguration, EngineCreationError, MediaSink, PlaybackHost, PlaybackStatus,
        StreamingEngine, TimerScheduler,
    },
};

use super::js_functions::*;

/// `PlaybackHost` relying on the JavaScript functions, for the session `session_id`.
pub(crate) struct JsHost {
    session_id: SessionId,
}

impl JsHost {
    pub(crate) fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }
}

/// Streaming engine instance living on the JavaScript-side.
pub(crate) struct JsEngine {
    engine_id: EngineId,
}

impl StreamingEngine for JsEngine {
    fn id(&self) -> EngineId {
        self.engine_id
    }

    fn load_source(&mut self, url: &str) {
        jsEngineLoadSource(self.engine_id, url);
    }

    fn attach_media(&mut self) {
        jsEngineAttachMedia(self.engine_id);
    }

    fn start_load(&mut self) {
        jsEngineStartLoad(self.engine_id);
    }

    fn recover_media_error(&mut self) {
        jsEngineRecoverMediaError(self.engine_id);
    }

    fn live_sync_position(&self) -> Option<f64> {
        jsEngineLiveSyncPosition(self.engine_id)
    }

    fn destroy(&mut self) {
        jsEngineDestroy(self.engine_id);
    }
}

impl TimerScheduler for JsHost {
    fn now_ms(&self) -> f64 {
        jsNow()
    }

    fn start_timer(&mut self, duration_ms: f64, reason: TimerReason) -> TimerId {
        jsTimer(duration_ms, reason)
    }

    fn start_interval(&mut self, period_ms: f64, reason: TimerReason) -> TimerId {
        jsInterval(period_ms, reason)
    }

    fn clear_timer(&mut self, id: TimerId) {
        jsClearTimer(id);
    }
}

impl MediaSink for JsHost {
    fn observe_media(&self) -> MediaObservation {
        jsObserveMedia()
    }

    fn play(&mut self, reason: PlayReason) {
        jsPlay(self.session_id, reason);
    }

    fn pause(&mut self) {
        jsPause();
    }

    fn seek(&mut self, position: f64) {
        jsSeek(position);
    }

    fn set_playback_rate(&mut self, rate: f64) {
        jsSetPlaybackRate(rate);
    }

    fn set_source(&mut self, url: &str) {
        jsSetVideoSource(url);
    }

    fn remove_source(&mut self) {
        jsRemoveVideoSource();
    }

    fn add_listeners(&mut self) {
        jsAddMediaListeners(self.session_id);
    }

    fn remove_listeners(&mut self) {
        jsRemoveMediaListeners();
    }
}

impl PlaybackHost for JsHost {
    type Engine = JsEngine;

    fn request_engine_module(&mut self) {
        jsLoadEngineModule(self.session_id);
    }

    fn create_engine(
        &mut self,
        config: &EngineConfiguration,
    ) -> Result<JsEngine, EngineCreationError> {
        let engine_id = jsCreateEngine(*config).result()?;
        Ok(JsEngine { engine_id })
    }

    fn announce_status(&mut self, status: PlaybackStatus, error_message: Option<&str>) {
        jsAnnounceStatus(status, error_message);
    }

    fn announce_metrics(&mut self, metrics: PlaybackMetrics) {
        jsAnnounceMetrics(metrics);
    }
}
