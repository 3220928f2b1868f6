use crate::{media_element::MediaObservation, session::PlaybackConfiguration};

/// What the live-edge synchronization wants done on the media element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct LiveSyncDecision {
    /// Position to seek to, if any.
    pub(crate) seek_to: Option<f64>,

    /// New playback rate, only set when it differs from the current one.
    pub(crate) playback_rate: Option<f64>,
}

impl LiveSyncDecision {
    pub(crate) fn is_noop(&self) -> bool {
        self.seek_to.is_none() && self.playback_rate.is_none()
    }
}

/// Compare the current position to the live edge and decide how to get closer to it.
///
/// Nothing is decided while paused or seeking. An unknown live edge or a position ahead of it
/// brings the playback rate back to `1`.
///
/// Past `latency_hard_seek_sec`, a single seek to `live_edge_backoff_sec` before the live edge
/// is asked for, as long as it moves forward by more than `min_seek_gain_sec`. The soft
/// catch-up check then runs against the latency resulting from that seek.
pub(crate) fn check_live_edge(
    observation: &MediaObservation,
    live_edge: Option<f64>,
    config: &PlaybackConfiguration,
) -> LiveSyncDecision {
    if observation.paused() || observation.seeking() {
        return LiveSyncDecision::default();
    }

    let current_time = observation.current_time();
    let latency = live_edge
        .filter(|edge| edge.is_finite())
        .map(|edge| (edge, edge - current_time))
        .filter(|(_, latency)| latency.is_finite() && *latency >= 0.);

    let (live_edge, mut latency) = match latency {
        Some(values) => values,
        None => return with_rate(None, observation, 1.),
    };

    let mut seek_to = None;
    if latency >= config.latency_hard_seek_sec {
        let target = (live_edge - config.live_edge_backoff_sec).max(0.);
        if target > current_time + config.min_seek_gain_sec {
            seek_to = Some(target);
            latency = live_edge - target;
        }
    }

    let wanted_rate = if latency >= config.latency_soft_catchup_sec {
        config.catchup_playback_rate
    } else {
        1.
    };
    with_rate(seek_to, observation, wanted_rate)
}

fn with_rate(
    seek_to: Option<f64>,
    observation: &MediaObservation,
    wanted_rate: f64,
) -> LiveSyncDecision {
    let playback_rate = if observation.playback_rate() == wanted_rate {
        None
    } else {
        Some(wanted_rate)
    };
    LiveSyncDecision {
        seek_to,
        playback_rate,
    }
}
