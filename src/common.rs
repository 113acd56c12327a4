//! Common types, constants, and error handling for the frame utilities.
//!
//! This module provides the value types shared by the range compressor and
//! the timecode converter: frame intervals, frame rates, timecodes, and the
//! crate-wide error type.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use tracing::{instrument, trace};

/// Frame rate substituted whenever upstream metadata reports an unusable value
pub const DEFAULT_FPS: f64 = 24.0;

/// A closed, contiguous run of frame numbers
///
/// Intervals produced by [`crate::compress`] are sorted ascending, never
/// overlap, and are never adjacent (`a.end() + 1 < b.start()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FrameInterval {
    start: i64,
    end: i64,
}

impl FrameInterval {
    /// Create a new interval covering `start..=end`
    ///
    /// # Panics
    /// Panics if `start > end` (fail-fast approach)
    pub fn new(start: i64, end: i64) -> Self {
        assert!(start <= end, "Interval start must not exceed end, got: {}-{}", start, end);
        Self { start, end }
    }

    /// Interval holding a single frame
    pub fn single(frame: i64) -> Self {
        Self { start: frame, end: frame }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Number of frames covered (always at least 1)
    pub fn len(&self) -> u64 {
        self.end.abs_diff(self.start) + 1
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, frame: i64) -> bool {
        (self.start..=self.end).contains(&frame)
    }
}

impl fmt::Display for FrameInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Frames per second of a clip
///
/// A `FrameRate` is always usable: finite, positive, and rounding to a
/// timebase of at least one frame per second. Raw values that fail this
/// check are rejected by [`FrameRate::new`] so the converter can substitute
/// its default.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct FrameRate(f64);

impl FrameRate {
    /// Wrap a raw frame rate, returning `None` when it is unusable
    pub fn new(fps: f64) -> Option<Self> {
        if Self::is_usable(fps) {
            Some(Self(fps))
        } else {
            None
        }
    }

    /// Whether `fps` can serve as a frame rate
    pub fn is_usable(fps: f64) -> bool {
        fps.is_finite() && fps > 0.0 && fps.round() >= 1.0
    }

    /// Get the raw frames-per-second value
    pub fn fps(&self) -> f64 {
        self.0
    }

    /// Integer frame count per timecode second (`round(fps)`)
    pub fn timebase(&self) -> u64 {
        self.0.round() as u64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self(DEFAULT_FPS)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{:.3}", self.0)
        }
    }
}

/// A broadcast timecode `HH:MM:SS:FF`
///
/// Minutes and seconds are always below 60. The frame field is bounded by
/// the timebase of whatever frame rate produced it, which the timecode
/// itself does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Timecode {
    hours: u64,
    minutes: u64,
    seconds: u64,
    frames: u64,
}

impl Timecode {
    /// Create a timecode from its fields
    ///
    /// # Errors
    /// * `Format` - If minutes or seconds are 60 or more
    pub fn new(hours: u64, minutes: u64, seconds: u64, frames: u64) -> Result<Self> {
        if minutes >= 60 || seconds >= 60 {
            return Err(FrameRangeError::format_error(
                format!("{:02}:{:02}:{:02}:{:02}", hours, minutes, seconds, frames),
                "minutes and seconds must be below 60",
            ));
        }

        Ok(Self { hours, minutes, seconds, frames })
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Whole seconds since 00:00:00:00, ignoring the frame field
    ///
    /// Returns `None` when the hours field is too large to count in seconds.
    pub fn total_seconds(&self) -> Option<u64> {
        self.hours
            .checked_mul(60)?
            .checked_add(self.minutes)?
            .checked_mul(60)?
            .checked_add(self.seconds)
    }

    /// Absolute zero-based frame count at `fps`
    ///
    /// Computes `total_seconds * fps + frames` and rounds to the nearest
    /// integer, ties away from zero. The index is bounded by `i64::MAX` so it
    /// can always be passed back to [`crate::TimecodeConverter::to_timecode`].
    ///
    /// # Errors
    /// * `Domain` - If the frame count exceeds `i64::MAX`
    #[instrument(skip(self), fields(timecode = %self))]
    pub fn to_frame_index(&self, fps: FrameRate) -> Result<u64> {
        let overflow = || {
            FrameRangeError::domain_error(
                i64::MAX,
                format!("timecode {} at {}fps exceeds the largest frame index", self, fps),
            )
        };

        let total_seconds = self.total_seconds().ok_or_else(overflow)?;
        let exact = (total_seconds as f64 * fps.fps() + self.frames as f64).round();

        // i64::MAX as f64 rounds up to 2^63, so equality is already out of range
        if !exact.is_finite() || exact >= i64::MAX as f64 {
            return Err(overflow());
        }

        let index = exact as u64;
        trace!("{} at {}fps = frame {}", self, fps, index);
        Ok(index)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

impl FromStr for Timecode {
    type Err = FrameRangeError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.trim().split(':').collect();
        if fields.len() != 4 {
            return Err(FrameRangeError::format_error(
                s,
                format!("expected 4 colon-separated fields, found {}", fields.len()),
            ));
        }

        let mut values = [0u64; 4];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = field.parse().map_err(|_| {
                FrameRangeError::format_error(s, format!("field '{}' is not a number", field))
            })?;
        }

        let [hours, minutes, seconds, frames] = values;
        Timecode::new(hours, minutes, seconds, frames)
            .map_err(|_| FrameRangeError::format_error(s, "minutes and seconds must be below 60"))
    }
}

impl Serialize for Timecode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// All possible errors from frame and timecode conversion
///
/// Failures are local to a single conversion; batch helpers return one
/// result per item so a bad range never aborts the rest.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameRangeError {
    #[error("Malformed input '{input}': {reason}")]
    Format { input: String, reason: String },

    #[error("Frame {frame} is out of range: {reason}")]
    Domain { frame: i64, reason: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl FrameRangeError {
    /// Create a format error for a malformed timecode or frame-rate string
    pub fn format_error(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a domain error for a frame total that cannot be represented
    pub fn domain_error(frame: i64, reason: impl Into<String>) -> Self {
        Self::Domain {
            frame,
            reason: reason.into(),
        }
    }

    /// Create a configuration error with a descriptive message
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }
}

/// Convenient Result type for frame operations
pub type Result<T> = std::result::Result<T, FrameRangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_creation() {
        let interval = FrameInterval::new(100, 105);
        assert_eq!(interval.start(), 100);
        assert_eq!(interval.end(), 105);
        assert_eq!(interval.len(), 6);
        assert!(!interval.is_single());
        assert!(interval.contains(103));
        assert!(!interval.contains(106));
    }

    #[test]
    #[should_panic(expected = "Interval start must not exceed end")]
    fn test_interval_invalid_order() {
        FrameInterval::new(10, 9);
    }

    #[test]
    fn test_interval_display() {
        assert_eq!(FrameInterval::single(100).to_string(), "100");
        assert_eq!(FrameInterval::new(100, 105).to_string(), "100-105");
        assert_eq!(FrameInterval::new(-3, -1).to_string(), "-3--1");
    }

    #[test]
    fn test_frame_rate_usability() {
        assert!(FrameRate::new(24.0).is_some());
        assert!(FrameRate::new(23.976).is_some());
        assert!(FrameRate::new(0.0).is_none());
        assert!(FrameRate::new(-25.0).is_none());
        assert!(FrameRate::new(f64::NAN).is_none());
        assert!(FrameRate::new(f64::INFINITY).is_none());
        // Rounds to a zero timebase
        assert!(FrameRate::new(0.4).is_none());
    }

    #[test]
    fn test_frame_rate_timebase() {
        assert_eq!(FrameRate::default().timebase(), 24);
        assert_eq!(FrameRate::new(29.97).unwrap().timebase(), 30);
        assert_eq!(FrameRate::new(23.976).unwrap().timebase(), 24);
        assert_eq!(FrameRate::new(59.94).unwrap().timebase(), 60);
    }

    #[test]
    fn test_frame_rate_display() {
        assert_eq!(FrameRate::new(25.0).unwrap().to_string(), "25");
        assert_eq!(FrameRate::new(24000.0 / 1001.0).unwrap().to_string(), "23.976");
    }

    #[test]
    fn test_timecode_parse_and_display() {
        let tc: Timecode = "01:02:03:04".parse().unwrap();
        assert_eq!(tc.hours(), 1);
        assert_eq!(tc.minutes(), 2);
        assert_eq!(tc.seconds(), 3);
        assert_eq!(tc.frames(), 4);
        assert_eq!(tc.to_string(), "01:02:03:04");

        let tc: Timecode = " 0:0:0:7 ".parse().unwrap();
        assert_eq!(tc.to_string(), "00:00:00:07");
    }

    #[test]
    fn test_timecode_parse_wrong_field_count() {
        let err = "1:2:3".parse::<Timecode>().unwrap_err();
        assert!(matches!(err, FrameRangeError::Format { .. }));
        assert!(err.to_string().contains("found 3"));

        assert!("01:00:00:00:00".parse::<Timecode>().is_err());
        assert!("".parse::<Timecode>().is_err());
    }

    #[test]
    fn test_timecode_parse_non_numeric() {
        let err = "01:aa:00:00".parse::<Timecode>().unwrap_err();
        assert!(matches!(err, FrameRangeError::Format { .. }));
        assert!("01:00:00;00".parse::<Timecode>().is_err());
        assert!("-1:00:00:00".parse::<Timecode>().is_err());
    }

    #[test]
    fn test_timecode_field_limits() {
        assert!(Timecode::new(0, 60, 0, 0).is_err());
        assert!(Timecode::new(0, 0, 60, 0).is_err());
        assert!("00:59:59:23".parse::<Timecode>().is_ok());
        assert!("00:00:75:00".parse::<Timecode>().is_err());
    }

    #[test]
    fn test_timecode_to_frame_index() {
        let tc: Timecode = "01:00:00:00".parse().unwrap();
        assert_eq!(tc.to_frame_index(FrameRate::default()).unwrap(), 86_400);

        let tc: Timecode = "00:00:01:05".parse().unwrap();
        assert_eq!(tc.to_frame_index(FrameRate::new(25.0).unwrap()).unwrap(), 30);

        // 10s at 23.976 = 239.76, rounds to 240
        let tc: Timecode = "00:00:10:00".parse().unwrap();
        assert_eq!(tc.to_frame_index(FrameRate::new(23.976).unwrap()).unwrap(), 240);
    }

    #[test]
    fn test_timecode_total_seconds_overflow() {
        let tc = Timecode::new(1, 2, 3, 0).unwrap();
        assert_eq!(tc.total_seconds(), Some(3723));

        let tc = Timecode::new(u64::MAX / 60, 59, 59, 0).unwrap();
        assert_eq!(tc.total_seconds(), None);
    }

    #[test]
    fn test_timecode_to_frame_index_huge_hours() {
        // Parses fine but cannot be counted in seconds
        let tc: Timecode = "1000000000000000000:00:00:00".parse().unwrap();
        let err = tc.to_frame_index(FrameRate::default()).unwrap_err();
        assert!(matches!(err, FrameRangeError::Domain { .. }));

        // Fits in seconds but not as a frame index
        let tc: Timecode = "1000000000000000:00:00:00".parse().unwrap();
        assert!(matches!(
            tc.to_frame_index(FrameRate::default()),
            Err(FrameRangeError::Domain { .. })
        ));
    }

    #[test]
    fn test_timecode_to_frame_index_huge_fps() {
        let tc: Timecode = "01:00:00:00".parse().unwrap();
        let err = tc.to_frame_index(FrameRate::new(1e300).unwrap()).unwrap_err();
        assert!(matches!(err, FrameRangeError::Domain { .. }));
    }

    #[test]
    fn test_timecode_serializes_as_string() {
        let tc = Timecode::new(0, 1, 2, 3).unwrap();
        assert_eq!(serde_json::to_string(&tc).unwrap(), "\"00:01:02:03\"");
    }

    #[test]
    fn test_error_types() {
        let error = FrameRangeError::format_error("1:2:3", "bad");
        assert!(matches!(error, FrameRangeError::Format { .. }));

        let error = FrameRangeError::domain_error(-1, "negative");
        assert!(matches!(error, FrameRangeError::Domain { frame: -1, .. }));

        let error = FrameRangeError::config_error("default fps must be positive");
        assert!(matches!(error, FrameRangeError::InvalidConfig { .. }));
    }

    #[test]
    fn test_error_display() {
        let error = FrameRangeError::domain_error(-1, "negative frame total");
        assert_eq!(error.to_string(), "Frame -1 is out of range: negative frame total");

        let error = FrameRangeError::config_error("default fps must be positive");
        assert_eq!(error.to_string(), "Invalid configuration: default fps must be positive");
    }
}
