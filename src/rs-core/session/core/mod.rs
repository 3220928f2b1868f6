use crate::{
    bindings::{EngineId, PlayReason, TimerId, TimerReason},
    error_policy::{self, FatalErrorAction, FatalErrorInput, MAX_FATAL_RELOADS},
    live_sync,
    media_element::MediaObservation,
    metrics,
    watchdog::{PlaybackPath, StallAction, WatchdogVerdict},
    Logger,
};

use super::{
    PendingRetry, PlaybackError, PlaybackHost, PlaybackSession, PlaybackStatus, StreamingEngine,
};

/// Reaction to every event a session receives.
///
/// Each entry point checks the `disposed` flag first: a disposed session ignores everything.
impl<H: PlaybackHost> PlaybackSession<H> {
    /// Begin playback: listen to the media element, start periodic checks and load the
    /// streaming engine module.
    pub(crate) fn start(&mut self) {
        if self.disposed || self.status != PlaybackStatus::Idle {
            return;
        }
        Logger::lazy_info(&|| format!("Session: starting playback of {}", self.manifest_url));
        self.set_status(PlaybackStatus::Loading, None);
        self.host.announce_metrics(self.metrics);
        self.host.add_listeners();
        self.metrics_interval = Some(
            self.host
                .start_interval(self.config.metrics_interval_ms, TimerReason::MetricsTick),
        );
        self.watchdog_interval = Some(
            self.host
                .start_interval(self.config.watchdog_interval_ms, TimerReason::WatchdogTick),
        );
        self.mark_progress();
        self.host.request_engine_module();
    }

    /// The streaming engine module finished loading.
    ///
    /// # Arguments
    ///
    /// * `engine_supported` - The engine can run in this environment.
    ///
    /// * `native_supported` - The media element can play HLS by itself.
    pub(crate) fn on_engine_module_loaded(&mut self, engine_supported: bool, native_supported: bool) {
        if self.disposed || self.status.is_terminal() || self.engine.is_some() {
            return;
        }
        if !engine_supported {
            if native_supported {
                Logger::info("Session: streaming engine unsupported, playing natively");
                self.is_native = true;
                self.host.set_source(self.manifest_url.get_ref());
                self.set_status(PlaybackStatus::Ready, None);
                self.host.play(PlayReason::Autoplay);
            } else {
                self.terminate(PlaybackError::HlsUnsupported);
            }
            return;
        }

        match self.host.create_engine(&self.engine_config) {
            Ok(mut engine) => {
                Logger::lazy_debug(&|| format!("Session: created engine {}", engine.id()));
                engine.load_source(self.manifest_url.get_ref());
                engine.attach_media();
                self.engine = Some(engine);
            }
            Err(err) => self.terminate(err.into()),
        }
    }

    /// The streaming engine module could not be loaded.
    pub(crate) fn on_engine_module_failed(&mut self, message: Option<String>) {
        if self.disposed || self.status.is_terminal() {
            return;
        }
        let message = message.unwrap_or_else(|| "Unknown Error.".to_owned());
        self.terminate(PlaybackError::EngineModuleLoad { message });
    }

    /// The engine `engine_id` parsed its manifest: the playback attempt succeeded so far.
    pub(crate) fn on_manifest_parsed(&mut self, engine_id: EngineId) {
        if self.disposed || !self.is_current_engine(engine_id) {
            return;
        }
        Logger::info("Session: manifest parsed, resetting recovery counters");
        self.counters.reset();
        self.set_status(PlaybackStatus::Ready, None);
        self.mark_progress();
        self.host.play(PlayReason::Autoplay);
        self.refresh_metrics();
    }

    /// The engine `engine_id` reported an error. Only fatal ones are acted upon.
    pub(crate) fn on_engine_error(&mut self, engine_id: EngineId, fatal: bool, input: FatalErrorInput) {
        if self.disposed || !self.is_current_engine(engine_id) {
            return;
        }
        if !fatal {
            Logger::lazy_debug(&|| format!("Session: ignoring non-fatal engine error {:?}", input));
            return;
        }
        let action = error_policy::decide(&input, self.counters);
        if !action.is_terminal() {
            Logger::lazy_warn(&|| {
                format!(
                    "Session: fatal {:?} engine error (HTTP {:?}) handled as {}: {}",
                    input.error_type,
                    input.http_code,
                    action.kind(),
                    action.message().unwrap_or_default()
                )
            });
        }
        self.apply_fatal_action(action);
    }

    /// A timer or interval started through the host ended.
    pub(crate) fn on_timer_ended(&mut self, id: TimerId, reason: TimerReason) {
        if self.disposed {
            return;
        }
        match reason {
            TimerReason::MetricsTick if self.metrics_interval == Some(id) => self.on_metrics_tick(),
            TimerReason::WatchdogTick if self.watchdog_interval == Some(id) => {
                self.on_watchdog_tick()
            }
            TimerReason::RetryLoad | TimerReason::FullReload
                if self.pending_retry.map(|p| p.timer_id) == Some(id) =>
            {
                self.pending_retry = None;
                if reason == TimerReason::RetryLoad {
                    self.resume_loading();
                } else {
                    self.reload_engine();
                }
            }
            _ => Logger::lazy_debug(&|| format!("Session: ignoring unknown timer {}", id)),
        }
    }

    /// A `play` call made with `reason` resolved (`success`) or was rejected.
    pub(crate) fn on_play_result(&mut self, reason: PlayReason, success: bool) {
        if self.disposed || self.status.is_terminal() {
            return;
        }
        match (reason, success) {
            (PlayReason::Autoplay, true) => self.set_status(PlaybackStatus::Playing, None),
            (PlayReason::Autoplay, false) | (PlayReason::NativeReload, false) => {
                Logger::info("Session: play request rejected");
                self.set_status(PlaybackStatus::Ready, None);
            }
            _ => {}
        }
    }

    /// The media element waits for data.
    pub(crate) fn on_media_waiting(&mut self) {
        if self.disposed || self.status.is_terminal() {
            return;
        }
        self.stall_count += 1;
        let message = self.error_message.clone();
        self.set_status(PlaybackStatus::Buffering, message);
        self.refresh_metrics();
    }

    /// The media element resumed playback.
    pub(crate) fn on_media_playing(&mut self) {
        if self.disposed || self.status.is_terminal() {
            return;
        }
        self.mark_progress();
        self.set_status(PlaybackStatus::Playing, None);
        self.refresh_metrics();
    }

    /// The media element reported an error of its own.
    pub(crate) fn on_media_error(&mut self) {
        if self.disposed || self.status.is_terminal() {
            return;
        }
        self.terminate(PlaybackError::VideoElement);
        self.refresh_metrics();
    }

    /// Stop everything and release the media element. Idempotent.
    pub(crate) fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        Logger::debug("Session: disposing");
        self.clear_pending_retry();
        if let Some(id) = self.metrics_interval.take() {
            self.host.clear_timer(id);
        }
        if let Some(id) = self.watchdog_interval.take() {
            self.host.clear_timer(id);
        }
        self.destroy_engine();
        self.host.remove_listeners();
        self.host.set_playback_rate(1.);
        self.host.pause();
        self.host.remove_source();
    }

    fn apply_fatal_action(&mut self, action: FatalErrorAction) {
        match action {
            FatalErrorAction::Unauthorized => self.terminate(PlaybackError::Unauthorized),
            FatalErrorAction::NotFoundRetry {
                next_not_found_retry_count,
                delay_ms,
                message,
            } => {
                self.counters.not_found_retry_count = next_not_found_retry_count;
                self.schedule_retry(delay_ms, TimerReason::RetryLoad, message);
            }
            FatalErrorAction::NetworkRetry {
                next_retry_count,
                delay_ms,
                message,
            } => {
                self.counters.retry_count = next_retry_count;
                self.schedule_retry(delay_ms, TimerReason::RetryLoad, message);
            }
            FatalErrorAction::NetworkFullReload {
                next_fatal_reload_count,
                delay_ms,
                message,
            }
            | FatalErrorAction::MediaFullReload {
                next_fatal_reload_count,
                delay_ms,
                message,
            } => {
                self.counters.fatal_reload_count = next_fatal_reload_count.min(MAX_FATAL_RELOADS);
                self.schedule_retry(delay_ms, TimerReason::FullReload, message);
            }
            FatalErrorAction::MediaRecovery {
                next_media_recovery_count,
                message,
            } => {
                self.counters.media_recovery_count = next_media_recovery_count;
                self.set_status(PlaybackStatus::MediaRecovery, Some(message));
                if let Some(engine) = self.engine.as_mut() {
                    engine.recover_media_error();
                }
            }
            FatalErrorAction::NotFoundFatal { message }
            | FatalErrorAction::MediaFatal { message }
            | FatalErrorAction::Fatal { message } => {
                self.stop_with(PlaybackStatus::FatalError, message)
            }
        }
    }

    fn on_metrics_tick(&mut self) {
        let observation = self.host.observe_media();
        let live_edge = self.update_metrics(&observation);

        if self.status.is_terminal() || self.playback_path() != PlaybackPath::Engine {
            return;
        }
        let decision = live_sync::check_live_edge(&observation, live_edge, &self.config);
        if decision.is_noop() {
            return;
        }
        if let Some(position) = decision.seek_to {
            Logger::lazy_info(&|| {
                format!(
                    "Sync: too far from live edge, seeking from {} to {}",
                    observation.current_time(),
                    position
                )
            });
            self.host.seek(position);
            let now = self.host.now_ms();
            self.watchdog.mark_progress(position, now);
            self.counters.stall_recovery_attempts = 0;
        }
        if let Some(rate) = decision.playback_rate {
            Logger::lazy_debug(&|| format!("Sync: updating playback rate to {}", rate));
            self.host.set_playback_rate(rate);
        }
    }

    fn on_watchdog_tick(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        let observation = self.host.observe_media();
        let now = self.host.now_ms();
        let path = self.playback_path();
        let verdict = self
            .watchdog
            .on_tick(&observation, now, self.counters, path, &self.config);
        match verdict {
            WatchdogVerdict::Idle => {}
            WatchdogVerdict::Progressed => self.counters.stall_recovery_attempts = 0,
            WatchdogVerdict::Stalled {
                next_stall_recovery_attempts,
                action,
            } => {
                self.stall_count += 1;
                self.counters.stall_recovery_attempts = next_stall_recovery_attempts;
                Logger::lazy_warn(&|| {
                    format!(
                        "Watchdog: no progress at {} (attempt {}), applying {:?}",
                        observation.current_time(),
                        next_stall_recovery_attempts,
                        action
                    )
                });
                self.apply_stall_action(action);
                self.refresh_metrics();
            }
        }
    }

    fn apply_stall_action(&mut self, action: StallAction) {
        let attempt = self.counters.stall_recovery_attempts;
        let max_attempts = self.config.max_stall_recovery_attempts;
        match action {
            StallAction::ResumeLoading { restart_network } => {
                self.set_status(
                    PlaybackStatus::NetworkRetry,
                    Some(format!(
                        "Playback stalled. Recovering... ({}/{})",
                        attempt, max_attempts
                    )),
                );
                if let Some(engine) = self.engine.as_mut() {
                    if restart_network {
                        engine.start_load();
                    } else {
                        engine.recover_media_error();
                    }
                }
                self.host.play(PlayReason::StallRecovery);
            }
            StallAction::ReattachSource => {
                self.set_status(
                    PlaybackStatus::NetworkRetry,
                    Some(format!(
                        "Playback stalled. Reloading native HLS... ({}/{})",
                        attempt, max_attempts
                    )),
                );
                self.host.pause();
                self.host.remove_source();
                self.host.set_source(self.manifest_url.get_ref());
                self.host.play(PlayReason::NativeReload);
            }
            StallAction::FullReload {
                next_fatal_reload_count,
                delay_ms,
            } => {
                self.counters.fatal_reload_count = next_fatal_reload_count;
                let message = format!(
                    "Playback repeatedly stalled. Reinitializing player ({}/{})...",
                    next_fatal_reload_count, MAX_FATAL_RELOADS
                );
                self.schedule_retry(delay_ms, TimerReason::FullReload, message);
            }
            StallAction::Fatal => self.terminate(PlaybackError::RepeatedStalls),
        }
    }

    /// Switch to `network-retry` and arm the single retry timer, replacing any pending one.
    fn schedule_retry(&mut self, delay_ms: u32, reason: TimerReason, message: String) {
        self.set_status(PlaybackStatus::NetworkRetry, Some(message));
        self.clear_pending_retry();
        let timer_id = self.host.start_timer(f64::from(delay_ms), reason);
        self.pending_retry = Some(PendingRetry { timer_id, reason });
        self.metrics = self.metrics.with_counters(self.stall_count, self.counters);
        self.host.announce_metrics(self.metrics);
    }

    fn resume_loading(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            Logger::debug("Session: resuming engine loading");
            engine.start_load();
        }
    }

    /// Replace the current engine by a new one, loaded from scratch.
    fn reload_engine(&mut self) {
        Logger::info("Session: reinitializing streaming engine");
        self.destroy_engine();
        self.mark_progress();
        self.host.request_engine_module();
    }

    fn terminate(&mut self, error: PlaybackError) {
        self.stop_with(error.status(), error.to_string());
    }

    /// Enter the terminal `status`: nothing is retried anymore.
    fn stop_with(&mut self, status: PlaybackStatus, message: String) {
        Logger::lazy_error(&|| format!("Session: stopping playback ({}): {}", status, message));
        self.clear_pending_retry();
        self.destroy_engine();
        self.set_status(status, Some(message));
    }

    fn clear_pending_retry(&mut self) {
        if let Some(pending) = self.pending_retry.take() {
            self.host.clear_timer(pending.timer_id);
        }
    }

    fn destroy_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
    }

    fn is_current_engine(&self, engine_id: EngineId) -> bool {
        self.engine_id() == Some(engine_id)
    }

    /// Consider the current position as progress, resetting stall recovery attempts.
    fn mark_progress(&mut self) {
        let position = self.host.observe_media().current_time();
        let now = self.host.now_ms();
        self.watchdog.mark_progress(position, now);
        self.counters.stall_recovery_attempts = 0;
    }

    fn refresh_metrics(&mut self) {
        let observation = self.host.observe_media();
        self.update_metrics(&observation);
    }

    /// Collect and announce metrics from `observation`, returning the live edge used.
    fn update_metrics(&mut self, observation: &MediaObservation) -> Option<f64> {
        let live_edge = self
            .engine
            .as_ref()
            .and_then(|engine| engine.live_sync_position());
        self.metrics =
            metrics::collect_metrics(observation, live_edge, self.stall_count, self.counters);
        self.host.announce_metrics(self.metrics);
        live_edge
    }

    fn set_status(&mut self, status: PlaybackStatus, error_message: Option<String>) {
        if self.status == status && self.error_message == error_message {
            return;
        }
        Logger::lazy_debug(&|| format!("Session: status {} -> {}", self.status, status));
        self.status = status;
        self.error_message = error_message;
        self.host
            .announce_status(self.status, self.error_message.as_deref());
    }
}
