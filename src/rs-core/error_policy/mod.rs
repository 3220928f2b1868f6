//! Classification of fatal streaming-engine errors into recovery actions.
//!
//! Everything here is pure: counters come in by value and the "next" counter values go out
//! inside the returned `FatalErrorAction`, for the `PlaybackSession` to apply.

use crate::session::RecoveryCounters;

/// Consecutive server-side network retries allowed before rebuilding the engine.
pub(crate) const MAX_NETWORK_RETRIES: u32 = 5;

/// Consecutive HTTP 404 retries allowed while waiting for the stream to be produced.
pub(crate) const MAX_NOT_FOUND_RETRIES: u32 = 40;

/// Base delay, in milliseconds, of the linear network retry backoff.
pub(crate) const RETRY_BASE_DELAY_MS: u32 = 500;

/// Maximum delay, in milliseconds, between two HTTP 404 retries.
pub(crate) const MAX_NOT_FOUND_DELAY_MS: u32 = 5000;

/// Full engine re-initializations allowed for a single playback attempt.
pub(crate) const MAX_FATAL_RELOADS: u32 = 6;

/// Base delay, in milliseconds, before a full engine re-initialization.
pub(crate) const FATAL_RELOAD_BASE_DELAY_MS: u32 = 1500;

/// Maximum delay, in milliseconds, before a full engine re-initialization.
pub(crate) const MAX_FATAL_RELOAD_DELAY_MS: u32 = 15000;

/// In-place decoder recoveries allowed before rebuilding the engine.
pub(crate) const MAX_MEDIA_RECOVERIES: u32 = 3;

/// Category of an error reported by the streaming engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum EngineErrorType {
    Network,
    Media,
    Other(String),
}

impl EngineErrorType {
    /// Parse the error `type` string emitted by the engine (`"networkError"`, `"mediaError"`,
    /// anything else being kept as-is).
    pub(crate) fn from_js_str(typ: &str) -> Self {
        match typ {
            "networkError" => EngineErrorType::Network,
            "mediaError" => EngineErrorType::Media,
            other => EngineErrorType::Other(other.to_owned()),
        }
    }
}

/// Normalized shape of a fatal error event emitted by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FatalErrorInput {
    pub(crate) error_type: EngineErrorType,

    /// HTTP status of the failed response, if any. `0` is treated as absent.
    pub(crate) http_code: Option<u32>,

    pub(crate) details: Option<String>,
}

impl FatalErrorInput {
    pub(crate) fn new(error_type: EngineErrorType, http_code: Option<u32>) -> Self {
        Self {
            error_type,
            http_code,
            details: None,
        }
    }

    pub(crate) fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Recovery action to take in response to a fatal engine error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FatalErrorAction {
    /// Credentials were refused. Terminal.
    Unauthorized,

    /// The stream is not produced yet: resume loading after `delay_ms`.
    NotFoundRetry {
        next_not_found_retry_count: u32,
        delay_ms: u32,
        message: String,
    },

    /// The stream never appeared. Terminal.
    NotFoundFatal { message: String },

    /// Short-lived server issue: resume loading after `delay_ms`.
    NetworkRetry {
        next_retry_count: u32,
        delay_ms: u32,
        message: String,
    },

    /// Persistent network issue: rebuild the engine after `delay_ms`.
    NetworkFullReload {
        next_fatal_reload_count: u32,
        delay_ms: u32,
        message: String,
    },

    /// Decoder issue: ask the engine to recover in place, right away.
    MediaRecovery {
        next_media_recovery_count: u32,
        message: String,
    },

    /// Decoder issue which outlived in-place recoveries: rebuild the engine after `delay_ms`.
    MediaFullReload {
        next_fatal_reload_count: u32,
        delay_ms: u32,
        message: String,
    },

    /// Decoder issue which outlived every remedy. Terminal.
    MediaFatal { message: String },

    /// Anything else. Terminal.
    Fatal { message: String },
}

impl FatalErrorAction {
    /// Short identifier of the action, mostly useful for logs.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            FatalErrorAction::Unauthorized => "unauthorized",
            FatalErrorAction::NotFoundRetry { .. } => "not-found-retry",
            FatalErrorAction::NotFoundFatal { .. } => "not-found-fatal",
            FatalErrorAction::NetworkRetry { .. } => "network-retry",
            FatalErrorAction::NetworkFullReload { .. } => "network-full-reload",
            FatalErrorAction::MediaRecovery { .. } => "media-recovery",
            FatalErrorAction::MediaFullReload { .. } => "media-full-reload",
            FatalErrorAction::MediaFatal { .. } => "media-fatal",
            FatalErrorAction::Fatal { .. } => "fatal",
        }
    }

    /// Operator-facing message carried by the action, `None` for `Unauthorized` whose
    /// message is owned by the session.
    pub(crate) fn message(&self) -> Option<&str> {
        match self {
            FatalErrorAction::Unauthorized => None,
            FatalErrorAction::NotFoundRetry { message, .. }
            | FatalErrorAction::NotFoundFatal { message }
            | FatalErrorAction::NetworkRetry { message, .. }
            | FatalErrorAction::NetworkFullReload { message, .. }
            | FatalErrorAction::MediaRecovery { message, .. }
            | FatalErrorAction::MediaFullReload { message, .. }
            | FatalErrorAction::MediaFatal { message }
            | FatalErrorAction::Fatal { message } => Some(message),
        }
    }

    /// Returns `true` if no recovery follows this action.
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(
            self,
            FatalErrorAction::Unauthorized
                | FatalErrorAction::NotFoundFatal { .. }
                | FatalErrorAction::MediaFatal { .. }
                | FatalErrorAction::Fatal { .. }
        )
    }
}

/// Delay, in milliseconds, awaited before the `next_fatal_reload_count`-th full engine
/// re-initialization.
pub(crate) fn full_reload_delay_ms(next_fatal_reload_count: u32) -> u32 {
    FATAL_RELOAD_BASE_DELAY_MS
        .saturating_mul(next_fatal_reload_count)
        .min(MAX_FATAL_RELOAD_DELAY_MS)
}

/// Map a fatal engine error and the current recovery budget to the action to take.
///
/// Rules are evaluated in order, the first matching one wins.
pub(crate) fn decide(input: &FatalErrorInput, counters: RecoveryCounters) -> FatalErrorAction {
    let http_code = input.http_code.filter(|code| *code != 0);
    let code_suffix = match http_code {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    };

    if input.error_type == EngineErrorType::Network {
        match http_code {
            Some(401) | Some(403) => return FatalErrorAction::Unauthorized,
            Some(404) => {
                if counters.not_found_retry_count < MAX_NOT_FOUND_RETRIES {
                    let next = counters.not_found_retry_count + 1;
                    return FatalErrorAction::NotFoundRetry {
                        next_not_found_retry_count: next,
                        delay_ms: (RETRY_BASE_DELAY_MS * next).min(MAX_NOT_FOUND_DELAY_MS),
                        message: format!(
                            "HLS stream is not generated yet (404). Waiting for pipeline... ({}/{})",
                            next, MAX_NOT_FOUND_RETRIES
                        ),
                    };
                }
                return FatalErrorAction::NotFoundFatal {
                    message: "HLS stream is not generated yet (404). Start the FFmpeg pipeline first."
                        .to_owned(),
                };
            }
            _ => {}
        }

        let is_server_side = http_code.map_or(true, |code| code >= 500);
        if is_server_side && counters.retry_count < MAX_NETWORK_RETRIES {
            let next = counters.retry_count + 1;
            return FatalErrorAction::NetworkRetry {
                next_retry_count: next,
                delay_ms: RETRY_BASE_DELAY_MS * next,
                message: format!(
                    "Network issue detected{}. Retrying ({}/{})...",
                    code_suffix, next, MAX_NETWORK_RETRIES
                ),
            };
        }

        if counters.fatal_reload_count < MAX_FATAL_RELOADS {
            let next = counters.fatal_reload_count + 1;
            return FatalErrorAction::NetworkFullReload {
                next_fatal_reload_count: next,
                delay_ms: full_reload_delay_ms(next),
                message: format!(
                    "Persistent network issue{}. Reinitializing player ({}/{})...",
                    code_suffix, next, MAX_FATAL_RELOADS
                ),
            };
        }
    }

    if input.error_type == EngineErrorType::Media {
        if counters.media_recovery_count < MAX_MEDIA_RECOVERIES {
            let next = counters.media_recovery_count + 1;
            return FatalErrorAction::MediaRecovery {
                next_media_recovery_count: next,
                message: format!(
                    "Media decode issue detected. Attempting recovery ({}/{})...",
                    next, MAX_MEDIA_RECOVERIES
                ),
            };
        }

        if counters.fatal_reload_count < MAX_FATAL_RELOADS {
            let next = counters.fatal_reload_count + 1;
            return FatalErrorAction::MediaFullReload {
                next_fatal_reload_count: next,
                delay_ms: full_reload_delay_ms(next),
                message: format!(
                    "Media recovery limit reached. Reinitializing player ({}/{})...",
                    next, MAX_FATAL_RELOADS
                ),
            };
        }

        return FatalErrorAction::MediaFatal {
            message: "Media decode failed repeatedly. Please restart stream source.".to_owned(),
        };
    }

    let details = match input.details.as_deref() {
        Some(details) if !details.is_empty() => details,
        _ => "Fatal playback error.",
    };
    FatalErrorAction::Fatal {
        message: format!("{}{}", details, code_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(code: Option<u32>) -> FatalErrorInput {
        FatalErrorInput::new(EngineErrorType::Network, code)
    }

    fn media() -> FatalErrorInput {
        FatalErrorInput::new(EngineErrorType::Media, None)
    }

    #[test]
    fn unauthorized_for_401_and_403_whatever_the_counters() {
        let exhausted = RecoveryCounters {
            retry_count: MAX_NETWORK_RETRIES,
            not_found_retry_count: MAX_NOT_FOUND_RETRIES,
            fatal_reload_count: MAX_FATAL_RELOADS,
            media_recovery_count: MAX_MEDIA_RECOVERIES,
            stall_recovery_attempts: 0,
        };
        for counters in [RecoveryCounters::default(), exhausted] {
            assert_eq!(decide(&network(Some(401)), counters), FatalErrorAction::Unauthorized);
            assert_eq!(decide(&network(Some(403)), counters), FatalErrorAction::Unauthorized);
        }
        assert!(FatalErrorAction::Unauthorized.is_terminal());
    }

    #[test]
    fn retries_404_until_limit_then_fails() {
        let counters = RecoveryCounters {
            not_found_retry_count: 3,
            ..Default::default()
        };
        match decide(&network(Some(404)), counters) {
            FatalErrorAction::NotFoundRetry {
                next_not_found_retry_count,
                delay_ms,
                message,
            } => {
                assert_eq!(next_not_found_retry_count, 4);
                assert_eq!(delay_ms, 2000);
                assert!(message.ends_with("(4/40)"));
            }
            other => panic!("unexpected action {:?}", other),
        }

        let counters = RecoveryCounters {
            not_found_retry_count: MAX_NOT_FOUND_RETRIES,
            ..Default::default()
        };
        let action = decide(&network(Some(404)), counters);
        assert_eq!(action.kind(), "not-found-fatal");
        assert!(action.is_terminal());
    }

    #[test]
    fn not_found_next_count_follows_current_one() {
        for n in 0..MAX_NOT_FOUND_RETRIES {
            let counters = RecoveryCounters {
                not_found_retry_count: n,
                ..Default::default()
            };
            match decide(&network(Some(404)), counters) {
                FatalErrorAction::NotFoundRetry {
                    next_not_found_retry_count,
                    delay_ms,
                    ..
                } => {
                    assert_eq!(next_not_found_retry_count, n + 1);
                    assert!(delay_ms <= MAX_NOT_FOUND_DELAY_MS);
                }
                other => panic!("unexpected action {:?}", other),
            }
        }
    }

    #[test]
    fn network_retry_for_server_side_errors() {
        let counters = RecoveryCounters {
            retry_count: 1,
            ..Default::default()
        };
        match decide(&network(Some(503)), counters) {
            FatalErrorAction::NetworkRetry {
                next_retry_count,
                delay_ms,
                message,
            } => {
                assert_eq!(next_retry_count, 2);
                assert_eq!(delay_ms, 1000);
                assert!(message.contains("HTTP 503"));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn network_retry_without_status_has_no_code_suffix() {
        let action = decide(&network(None), RecoveryCounters::default());
        assert_eq!(
            action.message(),
            Some("Network issue detected. Retrying (1/5)...")
        );
        let action = decide(&network(Some(0)), RecoveryCounters::default());
        assert_eq!(action.kind(), "network-retry");
        assert!(!action.message().unwrap_or_default().contains("HTTP"));
    }

    #[test]
    fn client_errors_skip_simple_retries() {
        let action = decide(&network(Some(410)), RecoveryCounters::default());
        match action {
            FatalErrorAction::NetworkFullReload {
                next_fatal_reload_count,
                delay_ms,
                message,
            } => {
                assert_eq!(next_fatal_reload_count, 1);
                assert_eq!(delay_ms, 1500);
                assert!(message.contains("(HTTP 410)"));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn exhausted_network_retries_escalate_to_full_reloads() {
        let counters = RecoveryCounters {
            retry_count: MAX_NETWORK_RETRIES,
            fatal_reload_count: 2,
            ..Default::default()
        };
        let action = decide(&network(Some(502)), counters);
        assert_eq!(action.kind(), "network-full-reload");

        let counters = RecoveryCounters {
            retry_count: MAX_NETWORK_RETRIES,
            fatal_reload_count: MAX_FATAL_RELOADS,
            ..Default::default()
        };
        let action = decide(&network(Some(502)), counters);
        assert_eq!(
            action,
            FatalErrorAction::Fatal {
                message: "Fatal playback error. (HTTP 502)".to_owned()
            }
        );
    }

    #[test]
    fn attempts_media_recovery_before_escalating() {
        let counters = RecoveryCounters {
            media_recovery_count: MAX_MEDIA_RECOVERIES - 1,
            ..Default::default()
        };
        assert_eq!(decide(&media(), counters).kind(), "media-recovery");

        let counters = RecoveryCounters {
            media_recovery_count: MAX_MEDIA_RECOVERIES,
            fatal_reload_count: 1,
            ..Default::default()
        };
        match decide(&media(), counters) {
            FatalErrorAction::MediaFullReload {
                next_fatal_reload_count,
                delay_ms,
                ..
            } => {
                assert_eq!(next_fatal_reload_count, 2);
                assert_eq!(delay_ms, 3000);
            }
            other => panic!("unexpected action {:?}", other),
        }

        let counters = RecoveryCounters {
            media_recovery_count: MAX_MEDIA_RECOVERIES,
            fatal_reload_count: MAX_FATAL_RELOADS,
            ..Default::default()
        };
        let action = decide(&media(), counters);
        assert_eq!(action.kind(), "media-fatal");
        assert!(action.is_terminal());
    }

    #[test]
    fn other_errors_are_fatal_with_details() {
        let input = FatalErrorInput::new(EngineErrorType::from_js_str("muxError"), Some(500))
            .with_details("fragParsingError");
        assert_eq!(
            decide(&input, RecoveryCounters::default()),
            FatalErrorAction::Fatal {
                message: "fragParsingError (HTTP 500)".to_owned()
            }
        );
    }

    #[test]
    fn full_reload_delay_is_capped() {
        assert_eq!(full_reload_delay_ms(1), 1500);
        assert_eq!(full_reload_delay_ms(6), 9000);
        assert_eq!(full_reload_delay_ms(11), MAX_FATAL_RELOAD_DELAY_MS);
    }

    #[test]
    fn parses_engine_error_types() {
        assert_eq!(EngineErrorType::from_js_str("networkError"), EngineErrorType::Network);
        assert_eq!(EngineErrorType::from_js_str("mediaError"), EngineErrorType::Media);
        assert_eq!(
            EngineErrorType::from_js_str("keySystemError"),
            EngineErrorType::Other("keySystemError".to_owned())
        );
    }
}
