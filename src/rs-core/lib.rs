use wasm_bindgen::prelude::*;

mod bindings;
pub mod dispatcher;
mod error_policy;
mod live_sync;
mod media_element;
mod metrics;
mod session;
mod utils;
mod watchdog;

pub use media_element::MediaObservation;
pub use metrics::PlaybackMetrics;
pub use session::{EngineConfiguration, PlaybackStatus, StatusSeverity};
pub use utils::logger::{Logger, LoggerLevel};
