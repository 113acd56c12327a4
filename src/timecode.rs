//! TimecodeConverter - frame index and `HH:MM:SS:FF` conversion
//!
//! Converts between zero-based frame indices and broadcast timecodes at a
//! given frame rate, optionally relative to a clip's start offset. Frame
//! rates reported by media-inspection tools are unreliable, so an unusable
//! rate is replaced by the converter's default and logged rather than
//! treated as an error.

use tracing::{debug, instrument, trace, warn};

use crate::common::{FrameInterval, FrameRangeError, FrameRate, Result, Timecode};

/// What to do when `frame_index + base` is negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeFramePolicy {
    /// Fail with a domain error
    #[default]
    Reject,
    /// Treat the total as frame 0
    ClampToZero,
}

/// Converts frame indices to timecodes and back
///
/// The converter holds only immutable configuration, so it is `Copy` and
/// can be shared freely across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimecodeConverter {
    default_fps: FrameRate,
    negative_policy: NegativeFramePolicy,
}

impl Default for TimecodeConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl TimecodeConverter {
    /// Create a converter with a 24 fps default and fail-fast negative handling
    pub fn new() -> Self {
        Self {
            default_fps: FrameRate::default(),
            negative_policy: NegativeFramePolicy::default(),
        }
    }

    /// Create a converter with custom settings
    ///
    /// # Arguments
    /// * `default_fps` - Frame rate substituted for unusable input rates
    /// * `negative_policy` - Handling of negative frame totals
    ///
    /// # Errors
    /// * `InvalidConfig` - If `default_fps` is not itself a usable frame rate
    #[instrument]
    pub fn new_with_config(default_fps: f64, negative_policy: NegativeFramePolicy) -> Result<Self> {
        let default_fps = FrameRate::new(default_fps).ok_or_else(|| {
            FrameRangeError::config_error(format!(
                "default frame rate must be finite and at least 0.5, got: {}",
                default_fps
            ))
        })?;

        debug!(
            "Created TimecodeConverter: default_fps={}, negative_policy={:?}",
            default_fps, negative_policy
        );

        Ok(Self {
            default_fps,
            negative_policy,
        })
    }

    pub fn default_fps(&self) -> FrameRate {
        self.default_fps
    }

    pub fn negative_policy(&self) -> NegativeFramePolicy {
        self.negative_policy
    }

    /// Return a copy of this converter using `policy` for negative totals
    pub fn with_negative_policy(mut self, policy: NegativeFramePolicy) -> Self {
        self.negative_policy = policy;
        self
    }

    /// Resolve a raw frame rate, substituting the default when unusable
    pub fn resolve_fps(&self, fps: f64) -> FrameRate {
        FrameRate::new(fps).unwrap_or_else(|| {
            warn!("Unusable frame rate {}, substituting default {}fps", fps, self.default_fps);
            self.default_fps
        })
    }

    /// Frame rate from a numerator/denominator pair (e.g. `24000/1001`)
    ///
    /// A zero denominator or an unusable quotient yields the default rate.
    #[instrument(skip(self))]
    pub fn frame_rate_from_rational(&self, numerator: f64, denominator: f64) -> FrameRate {
        if denominator == 0.0 {
            warn!(
                "Frame rate {}/{} has a zero denominator, substituting default {}fps",
                numerator, denominator, self.default_fps
            );
            return self.default_fps;
        }

        self.resolve_fps(numerator / denominator)
    }

    /// Parse a frame rate as reported by media-inspection tools
    ///
    /// Accepts either a rational (`"30000/1001"`) or a plain number
    /// (`"25"`, `"23.976"`).
    ///
    /// # Errors
    /// * `Format` - If a part is not a number or there are too many `/`
    #[instrument(skip(self))]
    pub fn parse_frame_rate(&self, rate: &str) -> Result<FrameRate> {
        let parts: Vec<&str> = rate.trim().split('/').collect();
        let number = |part: &str| -> Result<f64> {
            part.trim().parse::<f64>().map_err(|_| {
                FrameRangeError::format_error(rate, format!("'{}' is not a number", part))
            })
        };

        match parts.as_slice() {
            [fps] => Ok(self.resolve_fps(number(*fps)?)),
            [numerator, denominator] => {
                Ok(self.frame_rate_from_rational(number(*numerator)?, number(*denominator)?))
            }
            _ => Err(FrameRangeError::format_error(
                rate,
                "expected a number or a numerator/denominator pair",
            )),
        }
    }

    /// Convert a timecode string to an absolute frame index
    ///
    /// The index is `((hh*60 + mm)*60 + ss) * fps + ff`, rounded to the
    /// nearest integer with ties away from zero. An unusable `fps` is
    /// replaced by the default.
    ///
    /// # Errors
    /// * `Format` - Wrong field count, non-numeric field, or minutes/seconds
    ///   of 60 or more. The converter never substitutes a fallback index;
    ///   callers decide whether to treat a malformed timecode as frame 0.
    /// * `Domain` - If the frame index would exceed `i64::MAX`
    ///
    /// # Example
    /// ```rust
    /// use vfx_frames::TimecodeConverter;
    ///
    /// let converter = TimecodeConverter::new();
    /// assert_eq!(converter.to_frame_index("01:00:00:00", 24.0)?, 86_400);
    /// # Ok::<(), vfx_frames::FrameRangeError>(())
    /// ```
    #[instrument(skip(self))]
    pub fn to_frame_index(&self, timecode: &str, fps: f64) -> Result<u64> {
        let timecode: Timecode = timecode.parse()?;
        timecode.to_frame_index(self.resolve_fps(fps))
    }

    /// Frame offset of a clip whose first frame carries `start_timecode`
    pub fn base_offset(&self, start_timecode: &str, fps: f64) -> Result<u64> {
        self.to_frame_index(start_timecode, fps)
    }

    /// Convert a frame index to a timecode
    ///
    /// The timecode describes `frame_index + base`, using `round(fps)` as the
    /// frames-per-second modulus.
    ///
    /// # Errors
    /// * `Domain` - If the total is negative under [`NegativeFramePolicy::Reject`],
    ///   or if `frame_index + base` overflows
    ///
    /// # Example
    /// ```rust
    /// use vfx_frames::TimecodeConverter;
    ///
    /// let converter = TimecodeConverter::new();
    /// let timecode = converter.to_timecode(86_400, 24.0, 0)?;
    /// assert_eq!(timecode.to_string(), "01:00:00:00");
    /// # Ok::<(), vfx_frames::FrameRangeError>(())
    /// ```
    #[instrument(skip(self))]
    pub fn to_timecode(&self, frame_index: i64, fps: f64, base: u64) -> Result<Timecode> {
        let total = i64::try_from(base)
            .ok()
            .and_then(|base| frame_index.checked_add(base))
            .ok_or_else(|| {
                FrameRangeError::domain_error(
                    frame_index,
                    format!("frame index plus base offset {} overflows", base),
                )
            })?;

        let total = match (u64::try_from(total), self.negative_policy) {
            (Ok(total), _) => total,
            (Err(_), NegativeFramePolicy::ClampToZero) => {
                debug!("Clamping negative frame total {} to 0", total);
                0
            }
            (Err(_), NegativeFramePolicy::Reject) => {
                return Err(FrameRangeError::domain_error(
                    total,
                    "frame total must not be negative",
                ));
            }
        };

        let timebase = self.resolve_fps(fps).timebase();

        let frames = total % timebase;
        let total_seconds = total / timebase;
        let seconds = total_seconds % 60;
        let total_minutes = total_seconds / 60;
        let minutes = total_minutes % 60;
        let hours = total_minutes / 60;

        let timecode = Timecode::new(hours, minutes, seconds, frames)?;
        trace!("Frame {} (+{}) at timebase {} = {}", frame_index, base, timebase, timecode);

        Ok(timecode)
    }

    /// Render an interval's endpoints as `"TC"` or `"TC-TC"`
    pub fn interval_to_timecode_range(
        &self,
        interval: &FrameInterval,
        fps: f64,
        base: u64,
    ) -> Result<String> {
        let start = self.to_timecode(interval.start(), fps, base)?;
        if interval.is_single() {
            return Ok(start.to_string());
        }

        let end = self.to_timecode(interval.end(), fps, base)?;
        Ok(format!("{}-{}", start, end))
    }

    /// Render every interval as a timecode range, one result per interval
    ///
    /// A failing interval yields an `Err` in its slot and never aborts the
    /// remaining intervals.
    #[instrument(skip(self, intervals), fields(count = intervals.len()))]
    pub fn timecode_ranges(
        &self,
        intervals: &[FrameInterval],
        fps: f64,
        base: u64,
    ) -> Vec<Result<String>> {
        let results: Vec<Result<String>> = intervals
            .iter()
            .map(|interval| self.interval_to_timecode_range(interval, fps, base))
            .collect();

        let failed = results.iter().filter(|result| result.is_err()).count();
        if failed > 0 {
            warn!("{} of {} intervals could not be converted to timecode", failed, results.len());
        }

        results
    }
}

/// Frame rate from a rational pair using the standard [`crate::DEFAULT_FPS`] default
pub fn frame_rate_from_rational(numerator: f64, denominator: f64) -> FrameRate {
    TimecodeConverter::new().frame_rate_from_rational(numerator, denominator)
}
