use crate::{
    error_policy::{full_reload_delay_ms, MAX_FATAL_RELOADS},
    media_element::MediaObservation,
    session::{PlaybackConfiguration, RecoveryCounters},
};

/// How the media currently reaches the media element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlaybackPath {
    /// Through a streaming engine instance.
    Engine,

    /// The media element plays the manifest URL by itself.
    Native,

    /// Neither yet: the engine module is being loaded or a full reload is pending.
    Pending,
}

/// Remedy chosen for a stall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StallAction {
    /// Ask the engine to restart loading (`restart_network`) or to recover its decoder, then
    /// play again.
    ResumeLoading { restart_network: bool },

    /// Detach then re-attach the manifest URL to the media element, then play again.
    ReattachSource,

    /// Rebuild the engine after `delay_ms`.
    FullReload {
        next_fatal_reload_count: u32,
        delay_ms: u32,
    },

    /// Give up on this playback attempt.
    Fatal,
}

/// Outcome of a watchdog check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WatchdogVerdict {
    /// Nothing to report.
    Idle,

    /// Playback progressed (or is deliberately not progressing): stall recovery attempts
    /// should be reset.
    Progressed,

    /// Playback is stalled.
    Stalled {
        next_stall_recovery_attempts: u32,
        action: StallAction,
    },
}

/// Detects playback which stopped progressing without the streaming engine reporting it.
#[derive(Clone, Debug)]
pub(crate) struct StallWatchdog {
    /// Position at the last tick where progress was seen.
    last_position: f64,

    /// Monotonic time, in milliseconds, at which the current stall window began.
    last_progress_at_ms: f64,
}

impl StallWatchdog {
    pub(crate) fn new(position: f64, now_ms: f64) -> Self {
        let mut watchdog = Self {
            last_position: 0.,
            last_progress_at_ms: now_ms,
        };
        watchdog.mark_progress(position, now_ms);
        watchdog
    }

    /// Record `position` as progress, starting a new stall window.
    pub(crate) fn mark_progress(&mut self, position: f64, now_ms: f64) {
        if position.is_finite() {
            self.last_position = position;
        }
        self.last_progress_at_ms = now_ms;
    }

    /// Check progress since the last call.
    ///
    /// At most one stall is declared per `stall_trigger_ms` window without position change:
    /// the window restarts every time one is declared.
    pub(crate) fn on_tick(
        &mut self,
        observation: &MediaObservation,
        now_ms: f64,
        counters: RecoveryCounters,
        path: PlaybackPath,
        config: &PlaybackConfiguration,
    ) -> WatchdogVerdict {
        let position = observation.current_time();
        if observation.paused() || observation.ended() {
            self.mark_progress(position, now_ms);
            return WatchdogVerdict::Progressed;
        }
        if !position.is_finite() {
            return WatchdogVerdict::Idle;
        }
        if (position - self.last_position).abs() > config.progress_epsilon_sec {
            self.mark_progress(position, now_ms);
            return WatchdogVerdict::Progressed;
        }
        if now_ms - self.last_progress_at_ms < config.stall_trigger_ms {
            return WatchdogVerdict::Idle;
        }

        self.last_progress_at_ms = now_ms;
        if path == PlaybackPath::Pending {
            return WatchdogVerdict::Idle;
        }

        let next_stall_recovery_attempts = counters.stall_recovery_attempts + 1;
        let can_recover_in_place =
            next_stall_recovery_attempts <= config.max_stall_recovery_attempts;
        let action = match path {
            PlaybackPath::Engine if can_recover_in_place => StallAction::ResumeLoading {
                restart_network: observation.buffer_gap() < config.stall_low_buffer_sec,
            },
            PlaybackPath::Native if can_recover_in_place => StallAction::ReattachSource,
            PlaybackPath::Engine if counters.fatal_reload_count < MAX_FATAL_RELOADS => {
                let next_fatal_reload_count = counters.fatal_reload_count + 1;
                StallAction::FullReload {
                    next_fatal_reload_count,
                    delay_ms: full_reload_delay_ms(next_fatal_reload_count),
                }
            }
            _ => StallAction::Fatal,
        };
        WatchdogVerdict::Stalled {
            next_stall_recovery_attempts,
            action,
        }
    }
}
