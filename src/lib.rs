//! Frame-range compression and timecode conversion for VFX pipeline tools
//!
//! Shot lists, grading exports and work orders all describe frames the same
//! way: as sorted runs (`"1001-1048"`) and as broadcast timecodes
//! (`"01:00:02:00"`). This crate provides the two conversions behind those
//! renderings, plus the export parsing and output naming that surround them.
//!
//! # Quick Start
//!
//! ```rust
//! use vfx_frames::{compress, render_all, TimecodeConverter};
//!
//! let intervals = compress([1, 2, 3, 7, 8, 10]);
//! assert_eq!(render_all(&intervals), vec!["1-3", "7-8", "10"]);
//!
//! let converter = TimecodeConverter::new();
//! let base = converter.base_offset("01:00:00:00", 24.0)?;
//! let ranges = converter.timecode_ranges(&intervals, 24.0, base);
//! assert_eq!(ranges[0].as_deref().unwrap(), "01:00:00:01-01:00:00:03");
//! # Ok::<(), vfx_frames::FrameRangeError>(())
//! ```

mod common;
mod export;
mod range_compressor;
mod timecode;
mod versioning;

// Re-export main types for public API
pub use common::{FrameInterval, FrameRangeError, FrameRate, Result, Timecode, DEFAULT_FPS};
pub use export::{
    build_match_table, parse_baselight_export, parse_baselight_line, parse_xytech_locations,
    strip_storage_prefix, BaselightEntry, MatchRow, XytechLocation,
};
pub use range_compressor::{compress, expand, render, render_all};
pub use timecode::{frame_rate_from_rational, NegativeFramePolicy, TimecodeConverter};
pub use versioning::{base_stem, next_version_name};

use serde::Serialize;
use tracing::{debug, info, instrument};

/// One compressed range with its optional timecode rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeReport {
    pub interval: FrameInterval,
    pub range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timecode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Compress frame numbers and render each run as `"start"` or `"start-end"`
///
/// # Example
/// ```rust
/// use vfx_frames::frame_ranges;
///
/// assert_eq!(frame_ranges([10, 1, 2, 3]), vec!["1-3", "10"]);
/// ```
pub fn frame_ranges<I>(frames: I) -> Vec<String>
where
    I: IntoIterator<Item = i64>,
{
    render_all(&compress(frames))
}

/// Compress frame numbers and render every run as a range and, when a
/// converter is supplied, as a timecode range
///
/// A run that cannot be converted carries its error message instead of a
/// timecode; the remaining runs are still converted.
///
/// # Arguments
/// * `frames` - Frame numbers in any order
/// * `timecodes` - Converter, frame rate and base offset for timecode output
#[instrument(skip(frames))]
pub fn range_report<I>(frames: I, timecodes: Option<(&TimecodeConverter, f64, u64)>) -> Vec<RangeReport>
where
    I: IntoIterator<Item = i64>,
{
    let intervals = compress(frames);

    let reports: Vec<RangeReport> = intervals
        .iter()
        .map(|interval| {
            let mut report = RangeReport {
                interval: *interval,
                range: render(interval),
                timecode: None,
                error: None,
            };

            if let Some((converter, fps, base)) = timecodes {
                match converter.interval_to_timecode_range(interval, fps, base) {
                    Ok(timecode) => report.timecode = Some(timecode),
                    Err(e) => {
                        debug!("Range {} has no timecode: {}", report.range, e);
                        report.error = Some(e.to_string());
                    }
                }
            }

            report
        })
        .collect();

    info!("Reported {} ranges", reports.len());

    reports
}

/// Initialize tracing for the library
///
/// Call this once at the start of your application to enable log output.
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Arguments
/// * `level` - Tracing level filter (e.g., "debug", "info", "warn", "error")
pub fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .init();

    debug!("Tracing initialized at level: {}", level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_ranges() {
        assert_eq!(frame_ranges([1, 2, 3, 7, 8, 10]), vec!["1-3", "7-8", "10"]);
        assert!(frame_ranges(Vec::new()).is_empty());
    }

    #[test]
    fn test_range_report_without_timecodes() {
        let reports = range_report([5, 6, 9], None);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].range, "5-6");
        assert_eq!(reports[0].interval, FrameInterval::new(5, 6));
        assert!(reports[0].timecode.is_none());
        assert!(reports[1].error.is_none());
    }

    #[test]
    fn test_range_report_with_timecodes() {
        let converter = TimecodeConverter::new();
        let reports = range_report([-3, -2, 24, 25, 26], Some((&converter, 24.0, 0)));

        assert_eq!(reports.len(), 2);
        assert!(reports[0].timecode.is_none());
        assert!(reports[0].error.as_deref().unwrap().contains("negative"));
        assert_eq!(reports[1].timecode.as_deref(), Some("00:00:01:00-00:00:01:02"));
    }

    #[test]
    fn test_range_report_json() {
        let converter = TimecodeConverter::new();
        let reports = range_report([48], Some((&converter, 24.0, 0)));
        let json = serde_json::to_value(&reports).unwrap();

        assert_eq!(json[0]["range"], "48");
        assert_eq!(json[0]["timecode"], "00:00:02:00");
        assert_eq!(json[0]["interval"]["start"], 48);
        assert!(json[0].get("error").is_none());
    }

    #[test]
    fn test_reexports_exist() {
        let _ = FrameRate::default();
        let _ = NegativeFramePolicy::ClampToZero;
        assert_eq!(DEFAULT_FPS, 24.0);
        assert_eq!(frame_rate_from_rational(25.0, 0.0).fps(), DEFAULT_FPS);
    }
}
