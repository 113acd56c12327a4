//! Frame-range compression
//!
//! Collapses an unordered collection of frame numbers into the minimal list
//! of contiguous intervals, and renders intervals the way shot lists and
//! work orders write them (`"100"` or `"100-105"`).

use tracing::{debug, instrument, trace};

use crate::common::FrameInterval;

/// Compress frame numbers into sorted, maximally merged intervals
///
/// Duplicates collapse and input order is irrelevant. Negative values are
/// valid set members here; rejecting them is the converter's concern.
///
/// # Example
/// ```rust
/// use vfx_frames::{compress, render_all};
///
/// let intervals = compress([8, 1, 2, 3, 7, 10, 2]);
/// assert_eq!(render_all(&intervals), vec!["1-3", "7-8", "10"]);
/// ```
#[instrument(skip(frames))]
pub fn compress<I>(frames: I) -> Vec<FrameInterval>
where
    I: IntoIterator<Item = i64>,
{
    let mut sorted: Vec<i64> = frames.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut intervals = Vec::new();
    let mut values = sorted.iter().copied();

    let Some(first) = values.next() else {
        debug!("No frames to compress");
        return intervals;
    };

    let (mut run_start, mut run_end) = (first, first);
    for frame in values {
        if run_end.checked_add(1) == Some(frame) {
            run_end = frame;
        } else {
            trace!("Closing run {}-{} at break {}", run_start, run_end, frame);
            intervals.push(FrameInterval::new(run_start, run_end));
            run_start = frame;
            run_end = frame;
        }
    }
    intervals.push(FrameInterval::new(run_start, run_end));

    debug!("Compressed {} distinct frames into {} intervals", sorted.len(), intervals.len());

    intervals
}

/// Render one interval as `"start"` or `"start-end"`
pub fn render(interval: &FrameInterval) -> String {
    interval.to_string()
}

/// Render every interval in order
pub fn render_all(intervals: &[FrameInterval]) -> Vec<String> {
    intervals.iter().map(render).collect()
}

/// Expand intervals back into individual frame numbers
pub fn expand(intervals: &[FrameInterval]) -> Vec<i64> {
    intervals
        .iter()
        .flat_map(|interval| interval.start()..=interval.end())
        .collect()
}
