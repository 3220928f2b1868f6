use crate::{
    bindings::JsHost,
    session::{EngineConfiguration, PlaybackConfiguration},
    wasm_bindgen,
};

mod api;
mod core;
mod event_listeners;

/// The `Dispatcher` is the interface exported to the JavaScript-side, providing an API to
/// attach a live HLS stream to the media element linked to it and to tune how playback is
/// kept alive and close to the live edge.
///
/// Everything happening on the JavaScript-side (timers, streaming engine events, media
/// element events) is then reported to it through its event listener methods.
#[wasm_bindgen]
pub struct Dispatcher {
    /// Playback of the currently attached manifest URL, if one.
    sessions: self::core::SessionSlot<JsHost>,

    /// Configuration copied into each new session.
    config: PlaybackConfiguration,

    /// Options given to each streaming engine instance created from now on.
    engine_config: EngineConfiguration,
}
