use crate::{media_element::MediaObservation, session::RecoveryCounters, wasm_bindgen};

/// Latest playback quality snapshot, replaced as a whole every time it is collected.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackMetrics {
    latency_sec: Option<f64>,
    buffer_sec: f64,
    dropped_frames: u32,
    stall_count: u32,
    retry_count: u32,
}

#[wasm_bindgen]
impl PlaybackMetrics {
    /// Distance in seconds between the live edge and the current position.
    ///
    /// `undefined` when the live edge is not known (e.g. native playback or engine not
    /// ready yet).
    #[wasm_bindgen(getter)]
    pub fn latency_sec(&self) -> Option<f64> {
        self.latency_sec
    }

    /// Seconds of media buffered ahead of the current position.
    #[wasm_bindgen(getter)]
    pub fn buffer_sec(&self) -> f64 {
        self.buffer_sec
    }

    #[wasm_bindgen(getter)]
    pub fn dropped_frames(&self) -> u32 {
        self.dropped_frames
    }

    /// Stalls seen since the session started, never reset.
    #[wasm_bindgen(getter)]
    pub fn stall_count(&self) -> u32 {
        self.stall_count
    }

    /// Network retries (server-side and "not found") of the current playback attempt.
    #[wasm_bindgen(getter)]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }
}

impl PlaybackMetrics {
    /// Copy of these metrics with only the counters refreshed.
    ///
    /// Used when counters change between two ticks, so observers see them right away
    /// without a new media observation.
    pub(crate) fn with_counters(self, stall_count: u32, counters: RecoveryCounters) -> Self {
        Self {
            stall_count,
            retry_count: counters.total_network_retries(),
            ..self
        }
    }
}

/// Distance in seconds between `live_edge` and `current_time`.
///
/// `None` if either is unknown, never negative otherwise.
pub(crate) fn compute_latency(live_edge: Option<f64>, current_time: f64) -> Option<f64> {
    let live_edge = live_edge.filter(|edge| edge.is_finite())?;
    if !current_time.is_finite() {
        return None;
    }
    Some((live_edge - current_time).max(0.))
}

/// Derive a new metrics snapshot from a media observation.
pub(crate) fn collect_metrics(
    observation: &MediaObservation,
    live_edge: Option<f64>,
    stall_count: u32,
    counters: RecoveryCounters,
) -> PlaybackMetrics {
    PlaybackMetrics {
        latency_sec: compute_latency(live_edge, observation.current_time()),
        buffer_sec: observation.buffer_gap(),
        dropped_frames: observation.dropped_frames(),
        stall_count,
        retry_count: counters.total_network_retries(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_is_unknown_without_live_edge() {
        assert_eq!(compute_latency(None, 10.), None);
        assert_eq!(compute_latency(Some(f64::NAN), 10.), None);
        assert_eq!(compute_latency(Some(f64::INFINITY), 10.), None);
        assert_eq!(compute_latency(Some(20.), f64::NAN), None);
    }

    #[test]
    fn latency_is_never_negative() {
        assert_eq!(compute_latency(Some(20.), 14.5), Some(5.5));
        assert_eq!(compute_latency(Some(20.), 21.), Some(0.));
    }

    #[test]
    fn collects_every_field() {
        let obs = MediaObservation::new(30., false, false, false, 1., &[25., 33.], 7);
        let counters = RecoveryCounters {
            retry_count: 2,
            not_found_retry_count: 3,
            ..Default::default()
        };
        let metrics = collect_metrics(&obs, Some(36.), 4, counters);
        assert_eq!(metrics.latency_sec(), Some(6.));
        assert_eq!(metrics.buffer_sec(), 3.);
        assert_eq!(metrics.dropped_frames(), 7);
        assert_eq!(metrics.stall_count(), 4);
        assert_eq!(metrics.retry_count(), 5);
    }

    #[test]
    fn refreshing_counters_keeps_observed_values() {
        let obs = MediaObservation::new(30., false, false, false, 1., &[25., 33.], 7);
        let metrics = collect_metrics(&obs, Some(36.), 1, RecoveryCounters::default());
        let counters = RecoveryCounters {
            not_found_retry_count: 1,
            ..Default::default()
        };
        let refreshed = metrics.with_counters(2, counters);
        assert_eq!(refreshed.latency_sec(), Some(6.));
        assert_eq!(refreshed.buffer_sec(), 3.);
        assert_eq!(refreshed.stall_count(), 2);
        assert_eq!(refreshed.retry_count(), 1);
    }
}
