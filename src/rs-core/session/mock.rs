//! Recording `PlaybackHost` with a manual clock, for tests.

use std::{cell::RefCell, rc::Rc};

use crate::{
    bindings::{EngineId, PlayReason, TimerId, TimerReason},
    media_element::MediaObservation,
    metrics::PlaybackMetrics,
};

use super::{
    EngineConfiguration, EngineCreationError, MediaSink, PlaybackHost, PlaybackSession,
    PlaybackStatus, StreamingEngine, TimerScheduler,
};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum HostCall {
    RequestEngineModule,
    CreateEngine(EngineId),
    EngineLoadSource(EngineId, String),
    EngineAttachMedia(EngineId),
    EngineStartLoad(EngineId),
    EngineRecoverMediaError(EngineId),
    EngineDestroy(EngineId),
    Play(PlayReason),
    Pause,
    Seek(f64),
    SetPlaybackRate(f64),
    SetSource(String),
    RemoveSource,
    AddListeners,
    RemoveListeners,
    StartTimer(TimerReason, f64),
    StartInterval(TimerReason, f64),
    ClearTimer(TimerId),
}

#[derive(Clone, Debug)]
pub(crate) struct MockTimer {
    pub(crate) id: TimerId,
    pub(crate) reason: TimerReason,
    pub(crate) due_ms: f64,
    pub(crate) period_ms: Option<f64>,
}

/// State of the fake media element.
#[derive(Clone, Debug)]
pub(crate) struct MockMedia {
    pub(crate) current_time: f64,
    pub(crate) paused: bool,
    pub(crate) seeking: bool,
    pub(crate) ended: bool,
    pub(crate) playback_rate: f64,
    pub(crate) buffered: Vec<f64>,
    pub(crate) dropped_frames: u32,

    /// When `true` and not paused, the position moves forward with the clock.
    pub(crate) progressing: bool,
}

impl Default for MockMedia {
    fn default() -> Self {
        Self {
            current_time: 0.,
            paused: true,
            seeking: false,
            ended: false,
            playback_rate: 1.,
            buffered: vec![],
            dropped_frames: 0,
            progressing: false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub(crate) now_ms: f64,
    pub(crate) calls: Vec<HostCall>,
    pub(crate) timers: Vec<MockTimer>,
    pub(crate) media: MockMedia,

    /// Live edge position at `now_ms == 0`, moving forward with the clock.
    pub(crate) live_edge_origin: Option<f64>,
    pub(crate) statuses: Vec<(PlaybackStatus, Option<String>)>,
    pub(crate) metrics: Vec<PlaybackMetrics>,
    pub(crate) engine_creation_error: Option<EngineCreationError>,
    next_timer_id: u32,
    next_engine_id: EngineId,
}

impl MockState {
    pub(crate) fn live_edge(&self) -> Option<f64> {
        self.live_edge_origin.map(|origin| origin + self.now_ms / 1000.)
    }

    pub(crate) fn last_status(&self) -> Option<PlaybackStatus> {
        self.statuses.last().map(|(status, _)| *status)
    }

    pub(crate) fn last_message(&self) -> Option<String> {
        self.statuses.last().and_then(|(_, message)| message.clone())
    }

    pub(crate) fn count_calls(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub(crate) fn pending_timers(&self, reason: TimerReason) -> usize {
        self.timers.iter().filter(|t| t.reason == reason).count()
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockHost {
    pub(crate) state: Rc<RefCell<MockState>>,
}

pub(crate) struct MockEngine {
    id: EngineId,
    state: Rc<RefCell<MockState>>,
}

impl StreamingEngine for MockEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    fn load_source(&mut self, url: &str) {
        let call = HostCall::EngineLoadSource(self.id, url.to_owned());
        self.state.borrow_mut().calls.push(call);
    }

    fn attach_media(&mut self) {
        let call = HostCall::EngineAttachMedia(self.id);
        self.state.borrow_mut().calls.push(call);
    }

    fn start_load(&mut self) {
        let call = HostCall::EngineStartLoad(self.id);
        self.state.borrow_mut().calls.push(call);
    }

    fn recover_media_error(&mut self) {
        let call = HostCall::EngineRecoverMediaError(self.id);
        self.state.borrow_mut().calls.push(call);
    }

    fn live_sync_position(&self) -> Option<f64> {
        self.state.borrow().live_edge()
    }

    fn destroy(&mut self) {
        let call = HostCall::EngineDestroy(self.id);
        self.state.borrow_mut().calls.push(call);
    }
}

impl TimerScheduler for MockHost {
    fn now_ms(&self) -> f64 {
        self.state.borrow().now_ms
    }

    fn start_timer(&mut self, duration_ms: f64, reason: TimerReason) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_timer_id += 1;
        let id = f64::from(state.next_timer_id);
        let due_ms = state.now_ms + duration_ms;
        state.timers.push(MockTimer {
            id,
            reason,
            due_ms,
            period_ms: None,
        });
        state.calls.push(HostCall::StartTimer(reason, duration_ms));
        id
    }

    fn start_interval(&mut self, period_ms: f64, reason: TimerReason) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_timer_id += 1;
        let id = f64::from(state.next_timer_id);
        let due_ms = state.now_ms + period_ms;
        state.timers.push(MockTimer {
            id,
            reason,
            due_ms,
            period_ms: Some(period_ms),
        });
        state.calls.push(HostCall::StartInterval(reason, period_ms));
        id
    }

    fn clear_timer(&mut self, id: TimerId) {
        let mut state = self.state.borrow_mut();
        state.timers.retain(|t| t.id != id);
        state.calls.push(HostCall::ClearTimer(id));
    }
}

impl MediaSink for MockHost {
    fn observe_media(&self) -> MediaObservation {
        let state = self.state.borrow();
        let media = &state.media;
        MediaObservation::new(
            media.current_time,
            media.paused,
            media.seeking,
            media.ended,
            media.playback_rate,
            &media.buffered,
            media.dropped_frames,
        )
    }

    fn play(&mut self, reason: PlayReason) {
        self.state.borrow_mut().calls.push(HostCall::Play(reason));
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.media.paused = true;
        state.calls.push(HostCall::Pause);
    }

    fn seek(&mut self, position: f64) {
        let mut state = self.state.borrow_mut();
        state.media.current_time = position;
        state.calls.push(HostCall::Seek(position));
    }

    fn set_playback_rate(&mut self, rate: f64) {
        let mut state = self.state.borrow_mut();
        state.media.playback_rate = rate;
        state.calls.push(HostCall::SetPlaybackRate(rate));
    }

    fn set_source(&mut self, url: &str) {
        let call = HostCall::SetSource(url.to_owned());
        self.state.borrow_mut().calls.push(call);
    }

    fn remove_source(&mut self) {
        self.state.borrow_mut().calls.push(HostCall::RemoveSource);
    }

    fn add_listeners(&mut self) {
        self.state.borrow_mut().calls.push(HostCall::AddListeners);
    }

    fn remove_listeners(&mut self) {
        self.state.borrow_mut().calls.push(HostCall::RemoveListeners);
    }
}

impl PlaybackHost for MockHost {
    type Engine = MockEngine;

    fn request_engine_module(&mut self) {
        self.state
            .borrow_mut()
            .calls
            .push(HostCall::RequestEngineModule);
    }

    fn create_engine(
        &mut self,
        _config: &EngineConfiguration,
    ) -> Result<MockEngine, EngineCreationError> {
        let mut state = self.state.borrow_mut();
        if let Some(err) = state.engine_creation_error.take() {
            return Err(err);
        }
        state.next_engine_id += 1;
        let id = state.next_engine_id;
        state.calls.push(HostCall::CreateEngine(id));
        Ok(MockEngine {
            id,
            state: Rc::clone(&self.state),
        })
    }

    fn announce_status(&mut self, status: PlaybackStatus, error_message: Option<&str>) {
        self.state
            .borrow_mut()
            .statuses
            .push((status, error_message.map(str::to_owned)));
    }

    fn announce_metrics(&mut self, metrics: PlaybackMetrics) {
        self.state.borrow_mut().metrics.push(metrics);
    }
}

/// Move the fake clock forward by `duration_ms`, firing due timers in order.
pub(crate) fn advance_time(session: &mut PlaybackSession<MockHost>, host: &MockHost, duration_ms: f64) {
    let target = host.state.borrow().now_ms + duration_ms;
    loop {
        let next = {
            let mut state = host.state.borrow_mut();
            let next_idx = state
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due_ms <= target)
                .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms))
                .map(|(idx, _)| idx);
            match next_idx {
                None => None,
                Some(idx) => {
                    let due_ms = state.timers[idx].due_ms;
                    move_clock(&mut state, due_ms);
                    let timer = state.timers[idx].clone();
                    match timer.period_ms {
                        Some(period) => state.timers[idx].due_ms += period,
                        None => {
                            state.timers.remove(idx);
                        }
                    }
                    Some((timer.id, timer.reason))
                }
            }
        };
        match next {
            Some((id, reason)) => session.on_timer_ended(id, reason),
            None => break,
        }
    }
    move_clock(&mut host.state.borrow_mut(), target);
}

fn move_clock(state: &mut MockState, to_ms: f64) {
    let elapsed_sec = (to_ms - state.now_ms) / 1000.;
    if state.media.progressing && !state.media.paused {
        state.media.current_time += elapsed_sec * state.media.playback_rate;
    }
    state.now_ms = to_ms;
}
