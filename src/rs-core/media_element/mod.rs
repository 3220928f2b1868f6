use crate::{utils::time_ranges::TimeRanges, wasm_bindgen};

/// Snapshot of the state of the `HTMLMediaElement` a session plays on, taken synchronously by
/// the JavaScript-side each time Rust asks for it through `jsObserveMedia`.
#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct MediaObservation {
    current_time: f64,
    paused: bool,
    seeking: bool,
    ended: bool,
    playback_rate: f64,
    buffered: TimeRanges,
    dropped_frames: u32,
}

#[wasm_bindgen]
impl MediaObservation {
    /// Construct a new `MediaObservation`.
    ///
    /// # Arguments
    ///
    /// * `current_time` - The media element's `currentTime` attribute, in seconds.
    ///
    /// * `paused` - The media element's `paused` attribute.
    ///
    /// * `seeking` - The media element's `seeking` attribute.
    ///
    /// * `ended` - The media element's `ended` attribute.
    ///
    /// * `playback_rate` - The media element's `playbackRate` attribute.
    ///
    /// * `buffered` - The media element's `buffered` attribute, flattened as `start, end`
    ///   couples in seconds.
    ///
    /// * `dropped_frames` - `droppedVideoFrames` from `getVideoPlaybackQuality()`, `0` when
    ///   the browser does not expose it.
    #[wasm_bindgen(constructor)]
    pub fn new(
        current_time: f64,
        paused: bool,
        seeking: bool,
        ended: bool,
        playback_rate: f64,
        buffered: &[f64],
        dropped_frames: u32,
    ) -> Self {
        Self {
            current_time,
            paused,
            seeking,
            ended,
            playback_rate,
            buffered: TimeRanges::from_flat_pairs(buffered),
            dropped_frames,
        }
    }
}

impl MediaObservation {
    pub(crate) fn current_time(&self) -> f64 {
        self.current_time
    }

    pub(crate) fn paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn seeking(&self) -> bool {
        self.seeking
    }

    pub(crate) fn ended(&self) -> bool {
        self.ended
    }

    pub(crate) fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub(crate) fn dropped_frames(&self) -> u32 {
        self.dropped_frames
    }

    /// Seconds of media buffered contiguously ahead of the current position.
    ///
    /// That is, the amount of seconds that may be played before going into buffer starvation
    /// if no new segment is loaded. `0` when nothing is buffered at the current position.
    pub(crate) fn buffer_gap(&self) -> f64 {
        self.buffered.buffered_ahead(self.current_time)
    }
}
