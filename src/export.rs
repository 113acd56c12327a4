//! Grading export and work-order parsing
//!
//! The frame sets fed to the range compressor come from a color-grading
//! export (one shot per line: a storage path followed by frame numbers) and
//! are matched against the `Location:` section of a facility work order.
//! Both sides name the same shots under different storage roots, so paths
//! are normalized before matching.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::range_compressor::{compress, render_all};

/// Storage segment after which the shot-relative path begins
const PRODUCTION_SEGMENT: &str = "production";

/// Marker line opening the work order's location list
const LOCATION_HEADER: &str = "Location:";

/// One shot line from a grading export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselightEntry {
    pub raw_path: String,
    pub norm_path: String,
    pub frames: Vec<i64>,
}

/// One storage path listed in a work order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XytechLocation {
    pub raw_path: String,
    pub norm_path: String,
}

/// A work-order location together with the rendered frame ranges graded there
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRow {
    pub location: String,
    pub norm_path: String,
    pub frame_ranges: Vec<String>,
}

/// Strip the storage root from a path so both sources can be compared
///
/// Everything after a `production` segment is kept; without one, the first
/// segment is dropped (unless it is the only one). Empty segments are
/// ignored.
pub fn strip_storage_prefix(path: &str) -> String {
    let parts: Vec<&str> = path.trim().split('/').filter(|part| !part.is_empty()).collect();

    let keep_from = match parts.iter().position(|part| *part == PRODUCTION_SEGMENT) {
        Some(idx) => idx + 1,
        None if parts.len() > 1 => 1,
        None => 0,
    };

    parts[keep_from..].join("/")
}

/// Parse a single grading export line
///
/// Returns `None` for blank lines. Tokens that are not integers (such as
/// `<err>` or `<null>` markers) are skipped.
pub fn parse_baselight_line(line: &str) -> Option<BaselightEntry> {
    let mut tokens = line.split_whitespace();
    let raw_path = tokens.next()?;

    let frames = tokens
        .filter_map(|token| match token.parse::<i64>() {
            Ok(frame) => Some(frame),
            Err(_) => {
                trace!("Skipping non-frame token '{}' for {}", token, raw_path);
                None
            }
        })
        .collect();

    Some(BaselightEntry {
        raw_path: raw_path.to_string(),
        norm_path: strip_storage_prefix(raw_path),
        frames,
    })
}

/// Parse every non-blank line of a grading export
#[instrument(skip(text))]
pub fn parse_baselight_export(text: &str) -> Vec<BaselightEntry> {
    let entries: Vec<BaselightEntry> = text.lines().filter_map(parse_baselight_line).collect();
    debug!("Parsed {} grading export entries", entries.len());
    entries
}

/// Parse the location list of a work order
///
/// Locations start on the line after the first `Location:` header and end
/// at the next blank line.
#[instrument(skip(text))]
pub fn parse_xytech_locations(text: &str) -> Vec<XytechLocation> {
    let locations: Vec<XytechLocation> = text
        .lines()
        .skip_while(|line| !line.trim().starts_with(LOCATION_HEADER))
        .skip(1)
        .take_while(|line| !line.trim().is_empty())
        .map(|line| {
            let raw_path = line.trim();
            XytechLocation {
                raw_path: raw_path.to_string(),
                norm_path: strip_storage_prefix(raw_path),
            }
        })
        .collect();

    debug!("Parsed {} work order locations", locations.len());
    locations
}

/// Join work-order locations with the grading export
///
/// Each location whose normalized path appears in the export gets one row
/// holding the compressed ranges of every frame graded under that path.
/// Locations without a match are omitted; row order follows the work order.
#[instrument(skip_all, fields(entries = entries.len(), locations = locations.len()))]
pub fn build_match_table(entries: &[BaselightEntry], locations: &[XytechLocation]) -> Vec<MatchRow> {
    let mut by_path: HashMap<&str, Vec<&BaselightEntry>> = HashMap::new();
    for entry in entries {
        by_path.entry(entry.norm_path.as_str()).or_default().push(entry);
    }

    let rows: Vec<MatchRow> = locations
        .iter()
        .filter_map(|location| {
            let matched = by_path.get(location.norm_path.as_str())?;
            let frames = matched.iter().flat_map(|entry| entry.frames.iter().copied());

            Some(MatchRow {
                location: location.raw_path.clone(),
                norm_path: location.norm_path.clone(),
                frame_ranges: render_all(&compress(frames)),
            })
        })
        .collect();

    debug!("Matched {} of {} locations", rows.len(), locations.len());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
/baselightfilesystem1/Dune2/reel1/partA/1920x1080 43 44 45 46 47 48 <err> 50 51
/baselightfilesystem1/Dune2/reel1/VFX/Hydraulx 1260 1261 1262 1267

/baselightfilesystem1/Dune2/reel1/partA/1920x1080 49 <null> 52
";

    const WORK_ORDER: &str = "\
Xytech Workorder 1109

Producer: Jane Doe
Operator: John Doe

Location:
/hpsans13/production/Dune2/reel1/partA/1920x1080
/hpsans12/production/Dune2/reel1/VFX/Hydraulx
/hpsans15/production/Dune2/reel1/VFX/Framestore

Notes:
Grade the shots listed above.
";

    #[test]
    fn test_strip_storage_prefix_production() {
        assert_eq!(
            strip_storage_prefix("/hpsans13/production/Dune2/reel1/partA"),
            "Dune2/reel1/partA"
        );
    }

    #[test]
    fn test_strip_storage_prefix_first_segment() {
        assert_eq!(
            strip_storage_prefix("/baselightfilesystem1/Dune2/reel1//partA/"),
            "Dune2/reel1/partA"
        );
        assert_eq!(strip_storage_prefix("single"), "single");
        assert_eq!(strip_storage_prefix("  /  "), "");
    }

    #[test]
    fn test_parse_baselight_line_skips_error_tokens() {
        let entry = parse_baselight_line("/root/show/shot 1 2 <err> 4 <null>").unwrap();
        assert_eq!(entry.raw_path, "/root/show/shot");
        assert_eq!(entry.norm_path, "show/shot");
        assert_eq!(entry.frames, vec![1, 2, 4]);
    }

    #[test]
    fn test_parse_baselight_line_blank() {
        assert!(parse_baselight_line("").is_none());
        assert!(parse_baselight_line("   \t").is_none());
    }

    #[test]
    fn test_parse_baselight_export() {
        let entries = parse_baselight_export(EXPORT);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].frames, vec![1260, 1261, 1262, 1267]);
    }

    #[test]
    fn test_parse_xytech_locations() {
        let locations = parse_xytech_locations(WORK_ORDER);
        assert_eq!(locations.len(), 3);
        assert_eq!(locations[0].raw_path, "/hpsans13/production/Dune2/reel1/partA/1920x1080");
        assert_eq!(locations[0].norm_path, "Dune2/reel1/partA/1920x1080");
    }

    #[test]
    fn test_parse_xytech_without_header() {
        assert!(parse_xytech_locations("Producer: Jane Doe\n/some/path\n").is_empty());
    }

    #[test]
    fn test_build_match_table() {
        let entries = parse_baselight_export(EXPORT);
        let locations = parse_xytech_locations(WORK_ORDER);

        let rows = build_match_table(&entries, &locations);
        assert_eq!(rows.len(), 2);

        // Both export lines for partA merge into one frame set
        assert_eq!(rows[0].location, "/hpsans13/production/Dune2/reel1/partA/1920x1080");
        assert_eq!(rows[0].frame_ranges, vec!["43-52"]);

        assert_eq!(rows[1].norm_path, "Dune2/reel1/VFX/Hydraulx");
        assert_eq!(rows[1].frame_ranges, vec!["1260-1262", "1267"]);
    }

    #[test]
    fn test_match_row_json() {
        let row = MatchRow {
            location: "/a/production/shot".to_string(),
            norm_path: "shot".to_string(),
            frame_ranges: vec!["1-3".to_string()],
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["frame_ranges"][0], "1-3");
    }
}
