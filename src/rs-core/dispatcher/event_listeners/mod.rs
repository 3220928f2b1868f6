use crate::{
    bindings::{EngineId, PlayReason, SessionId, TimerId, TimerReason},
    dispatcher::Dispatcher,
    error_policy::{EngineErrorType, FatalErrorInput},
    wasm_bindgen,
};

/// Methods triggered on JavaScript events by the JavaScript code.
#[wasm_bindgen]
impl Dispatcher {
    /// The JS code should call this method each time a timer started with the `jsTimer`
    /// function finished, and at each period of an interval started with `jsInterval`.
    ///
    /// # Arguments
    ///
    /// * `id` - The `TimerId` given by `jsTimer` or `jsInterval` when the timer was
    ///   started. This allows the `Dispatcher` to identify which timer
    ///   actually finished.
    ///
    /// * `reason` - The `TimerReason` given when the timer was started.
    pub fn on_timer_ended(&mut self, id: TimerId, reason: TimerReason) {
        if let Some(session) = self.sessions.current_mut() {
            session.on_timer_ended(id, reason);
        }
    }

    /// The JS code should call this method once the module asked through
    /// `jsLoadEngineModule` is loaded.
    ///
    /// # Arguments
    ///
    /// * `session_id` - The `SessionId` given to `jsLoadEngineModule`.
    ///
    /// * `engine_supported` - The streaming engine can run in the current environment.
    ///
    /// * `native_supported` - The media element can play HLS by itself.
    pub fn on_engine_module_loaded(
        &mut self,
        session_id: SessionId,
        engine_supported: bool,
        native_supported: bool,
    ) {
        if let Some(session) = self.sessions.session_for(session_id) {
            session.on_engine_module_loaded(engine_supported, native_supported);
        }
    }

    /// The JS code should call this method if the module asked through `jsLoadEngineModule`
    /// could not be loaded.
    pub fn on_engine_module_failed(&mut self, session_id: SessionId, message: Option<String>) {
        if let Some(session) = self.sessions.session_for(session_id) {
            session.on_engine_module_failed(message);
        }
    }

    /// The JS code should call this method when a streaming engine instance emits its
    /// `MANIFEST_PARSED` event.
    pub fn on_manifest_parsed(&mut self, engine_id: EngineId) {
        if let Some(session) = self.sessions.current_mut() {
            session.on_manifest_parsed(engine_id);
        }
    }

    /// The JS code should call this method when a streaming engine instance emits its
    /// `ERROR` event.
    ///
    /// # Arguments
    ///
    /// * `engine_id` - The `EngineId` of the instance which emitted the error.
    ///
    /// * `fatal` - The engine gave up on its own. Only those errors are handled.
    ///
    /// * `error_type` - The engine's error type, such as `"networkError"` or `"mediaError"`.
    ///
    /// * `http_code` - HTTP status of the response which led to the error, if one.
    ///
    /// * `details` - The engine's error details, such as `"manifestLoadError"`.
    pub fn on_engine_error(
        &mut self,
        engine_id: EngineId,
        fatal: bool,
        error_type: &str,
        http_code: Option<u32>,
        details: Option<String>,
    ) {
        if let Some(session) = self.sessions.current_mut() {
            let mut input =
                FatalErrorInput::new(EngineErrorType::from_js_str(error_type), http_code);
            if let Some(details) = details {
                input = input.with_details(details);
            }
            session.on_engine_error(engine_id, fatal, input);
        }
    }

    /// The JS code should call this method when the media element emits a `waiting` event.
    pub fn on_media_waiting(&mut self, session_id: SessionId) {
        if let Some(session) = self.sessions.session_for(session_id) {
            session.on_media_waiting();
        }
    }

    /// The JS code should call this method when the media element emits a `playing` event.
    pub fn on_media_playing(&mut self, session_id: SessionId) {
        if let Some(session) = self.sessions.session_for(session_id) {
            session.on_media_playing();
        }
    }

    /// The JS code should call this method when the media element emits an `error` event.
    pub fn on_media_error(&mut self, session_id: SessionId) {
        if let Some(session) = self.sessions.session_for(session_id) {
            session.on_media_error();
        }
    }

    /// The JS code should call this method once the promise returned by the media
    /// element's `play` method, called through `jsPlay`, settled.
    ///
    /// # Arguments
    ///
    /// * `session_id` - The `SessionId` given to `jsPlay`.
    ///
    /// * `reason` - The `PlayReason` given to `jsPlay`.
    ///
    /// * `success` - `true` if the promise resolved, `false` if it was rejected.
    pub fn on_play_result(&mut self, session_id: SessionId, reason: PlayReason, success: bool) {
        if let Some(session) = self.sessions.session_for(session_id) {
            session.on_play_result(reason, success);
        }
    }
}
