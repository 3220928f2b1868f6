/// Represent a range of time, from a start to an end, generally in seconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TimeRange {
    start: f64,
    end: f64,
}

/// Abstracts non-contiguous chronological ranges of time, generally expressed in seconds.
///
/// This is the Rust-side view of an `HTMLMediaElement`'s `buffered` attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TimeRanges {
    ranges: Vec<TimeRange>,
}

impl TimeRanges {
    /// Build a `TimeRanges` from a flat list of `start, end` couples, as the JavaScript-side
    /// transmits them.
    ///
    /// A trailing lone value (an odd-length slice) and ranges whose end is not after their
    /// start are ignored.
    pub(crate) fn from_flat_pairs(flat: &[f64]) -> Self {
        let ranges = flat
            .chunks_exact(2)
            .filter(|pair| pair[0].is_finite() && pair[1] > pair[0])
            .map(|pair| TimeRange {
                start: pair[0],
                end: pair[1],
            })
            .collect();
        Self { ranges }
    }

    /// Returns the range containing the given position.
    ///
    /// Returns `None` if no range in this `TimeRanges` object contains it.
    pub(crate) fn range_for(&self, pos: f64) -> Option<&TimeRange> {
        self.ranges
            .iter()
            .find(|range| pos >= range.start && pos < range.end)
    }

    /// Seconds of media buffered contiguously ahead of `pos`.
    ///
    /// `0` when `pos` is outside of every range.
    pub(crate) fn buffered_ahead(&self, pos: f64) -> f64 {
        match self.range_for(pos) {
            Some(range) => (range.end - pos).max(0.),
            None => 0.,
        }
    }
}
