//! Command-line interface for the frame utilities
//!
//! Compresses frame lists into ranges, converts between frame numbers and
//! timecodes, and matches a grading export against a work order.

use std::env;
use std::fs;
use std::process;

use anyhow::{bail, Context};
use tracing::{debug, info, warn};
use vfx_frames::{
    build_match_table, init_tracing, parse_baselight_export, parse_xytech_locations,
    range_report, FrameRate, NegativeFramePolicy, TimecodeConverter, DEFAULT_FPS,
};

const USAGE: &str = "\
Usage: vfx-frames <command> [ARGS] [OPTIONS]

Commands:
  ranges <frame>...        Compress frame numbers into ranges
  timecode <frame>...      Convert frame numbers to timecodes
  frames <timecode>...     Convert timecodes to frame numbers
  match                    Match a grading export against a work order

Options:
  --fps <rate>             Frame rate: 25, 23.976 or 24000/1001 (default: 24)
  --start <timecode>       Clip start timecode used as base offset
  --timecodes              (ranges) also render each range as timecodes
  --clamp                  Clamp negative frame totals to 0 instead of failing
  --baselight <file>       (match) grading export file
  --xytech <file>          (match) work order file
  --format <fmt>           Output format: simple|detailed|json (default: simple)
  --verbose                Enable debug logging
  --help                   Show this help message

Examples:
  vfx-frames ranges 1 2 3 7 8 10
  vfx-frames timecode 0 86400 --fps 24000/1001
  vfx-frames ranges 1001 1002 1010 --timecodes --start 01:00:00:00
  vfx-frames match --baselight export.txt --xytech workorder.txt --format json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ranges,
    Timecode,
    Frames,
    Match,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Simple,   // One item per line
    Detailed, // Items with their inputs and a summary
    Json,     // JSON format for integration
}

/// Command-line arguments structure
#[derive(Debug)]
struct Args {
    command: Command,
    inputs: Vec<String>,
    fps: Option<String>,
    start: Option<String>,
    baselight: Option<String>,
    xytech: Option<String>,
    with_timecodes: bool,
    clamp: bool,
    verbose: bool,
    output_format: OutputFormat,
}

impl Args {
    fn new(command: Command) -> Self {
        Self {
            command,
            inputs: Vec::new(),
            fps: None,
            start: None,
            baselight: None,
            xytech: None,
            with_timecodes: false,
            clamp: false,
            verbose: false,
            output_format: OutputFormat::Simple,
        }
    }
}

fn main() {
    let argv: Vec<String> = env::args().skip(1).collect();

    if let Err(e) = run(&argv) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(argv: &[String]) -> anyhow::Result<()> {
    let args = match parse_args(argv) {
        Ok(args) => args,
        Err(message) => bail!("{}", message),
    };

    let log_level = if args.verbose { "debug" } else { "warn" };
    init_tracing(log_level);

    info!("vfx-frames v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let policy = if args.clamp {
        NegativeFramePolicy::ClampToZero
    } else {
        NegativeFramePolicy::Reject
    };
    let converter = TimecodeConverter::new_with_config(DEFAULT_FPS, policy)?;

    let fps = match &args.fps {
        Some(rate) => converter
            .parse_frame_rate(rate)
            .with_context(|| format!("Invalid --fps value '{}'", rate))?,
        None => converter.default_fps(),
    };

    let base = start_offset(&converter, args.start.as_deref(), fps);

    match args.command {
        Command::Ranges => output_ranges(&args, &converter, fps, base),
        Command::Timecode => output_timecodes(&args, &converter, fps, base),
        Command::Frames => output_frames(&args, &converter, fps),
        Command::Match => output_matches(&args),
    }
}

/// Base offset for `--start`
///
/// A start timecode that cannot be converted is treated as frame 0 so the
/// remaining conversions still run.
fn start_offset(converter: &TimecodeConverter, start: Option<&str>, fps: FrameRate) -> u64 {
    let Some(start) = start else {
        return 0;
    };

    converter.base_offset(start, fps.fps()).unwrap_or_else(|e| {
        warn!("Ignoring start timecode: {}; using base offset 0", e);
        0
    })
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let Some(command) = argv.first() else {
        return Err(USAGE.to_string());
    };

    let command = match command.as_str() {
        "ranges" => Command::Ranges,
        "timecode" => Command::Timecode,
        "frames" => Command::Frames,
        "match" => Command::Match,
        "--help" | "-h" => return Err(USAGE.to_string()),
        other => return Err(format!("Unknown command: {}\n\n{}", other, USAGE)),
    };

    let mut parsed_args = Args::new(command);

    let mut i = 1;
    while i < argv.len() {
        let value = |name: &str| -> Result<String, String> {
            argv.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("{} requires a value", name))
        };

        match argv[i].as_str() {
            "--fps" => {
                parsed_args.fps = Some(value("--fps")?);
                i += 2;
            }
            "--start" => {
                parsed_args.start = Some(value("--start")?);
                i += 2;
            }
            "--baselight" => {
                parsed_args.baselight = Some(value("--baselight")?);
                i += 2;
            }
            "--xytech" => {
                parsed_args.xytech = Some(value("--xytech")?);
                i += 2;
            }
            "--format" => {
                parsed_args.output_format = match value("--format")?.as_str() {
                    "simple" => OutputFormat::Simple,
                    "detailed" => OutputFormat::Detailed,
                    "json" => OutputFormat::Json,
                    _ => return Err("Invalid format. Use 'simple', 'detailed', or 'json'".to_string()),
                };
                i += 2;
            }
            "--timecodes" => {
                parsed_args.with_timecodes = true;
                i += 1;
            }
            "--clamp" => {
                parsed_args.clamp = true;
                i += 1;
            }
            "--verbose" => {
                parsed_args.verbose = true;
                i += 1;
            }
            "--help" => return Err(USAGE.to_string()),
            // Negative frame numbers are inputs, not options
            arg if arg.starts_with("--") => return Err(format!("Unknown option: {}", arg)),
            arg => {
                parsed_args.inputs.push(arg.to_string());
                i += 1;
            }
        }
    }

    match parsed_args.command {
        Command::Match => {
            if parsed_args.baselight.is_none() || parsed_args.xytech.is_none() {
                return Err("match requires --baselight and --xytech".to_string());
            }
        }
        _ if parsed_args.inputs.is_empty() => {
            return Err(format!("{:?} requires at least one input", parsed_args.command).to_lowercase());
        }
        _ => {}
    }

    Ok(parsed_args)
}

fn parse_frames(inputs: &[String]) -> anyhow::Result<Vec<i64>> {
    inputs
        .iter()
        .map(|input| {
            input
                .parse::<i64>()
                .with_context(|| format!("'{}' is not a frame number", input))
        })
        .collect()
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{}", text);
    Ok(())
}

fn output_ranges(
    args: &Args,
    converter: &TimecodeConverter,
    fps: FrameRate,
    base: u64,
) -> anyhow::Result<()> {
    let frames = parse_frames(&args.inputs)?;
    let timecodes = args.with_timecodes.then_some((converter, fps.fps(), base));
    let reports = range_report(frames.iter().copied(), timecodes);

    match args.output_format {
        OutputFormat::Simple => {
            for report in &reports {
                match (&report.timecode, &report.error) {
                    (Some(timecode), _) => println!("{}\t{}", report.range, timecode),
                    (None, Some(error)) => println!("{}\terror: {}", report.range, error),
                    (None, None) => println!("{}", report.range),
                }
            }
        }
        OutputFormat::Detailed => {
            println!("Frame Ranges:");
            println!("  Frames given: {}", frames.len());
            println!("  Ranges: {}", reports.len());
            if args.with_timecodes {
                println!("  Frame rate: {} fps", fps);
                println!("  Base offset: {} frames", base);
            }
            for (i, report) in reports.iter().enumerate() {
                print!("    Range {}: {} ({} frames)", i + 1, report.range, report.interval.len());
                match (&report.timecode, &report.error) {
                    (Some(timecode), _) => println!(" -> {}", timecode),
                    (None, Some(error)) => println!(" -> error: {}", error),
                    (None, None) => println!(),
                }
            }
        }
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "frame_count": frames.len(),
                "fps": fps.fps(),
                "base_offset": base,
                "ranges": reports,
            }))?;
        }
    }

    Ok(())
}

fn output_timecodes(
    args: &Args,
    converter: &TimecodeConverter,
    fps: FrameRate,
    base: u64,
) -> anyhow::Result<()> {
    let frames = parse_frames(&args.inputs)?;

    let results: Vec<(i64, Result<String, String>)> = frames
        .iter()
        .map(|&frame| {
            let result = converter
                .to_timecode(frame, fps.fps(), base)
                .map(|timecode| timecode.to_string())
                .map_err(|e| e.to_string());
            (frame, result)
        })
        .collect();

    match args.output_format {
        OutputFormat::Simple | OutputFormat::Detailed => {
            if args.output_format == OutputFormat::Detailed {
                println!("Timecodes at {} fps (base offset {}):", fps, base);
            }
            for (frame, result) in &results {
                match result {
                    Ok(timecode) => println!("{} -> {}", frame, timecode),
                    Err(error) => println!("{} -> error: {}", frame, error),
                }
            }
        }
        OutputFormat::Json => {
            let items: Vec<serde_json::Value> = results
                .iter()
                .map(|(frame, result)| match result {
                    Ok(timecode) => serde_json::json!({ "frame": frame, "timecode": timecode }),
                    Err(error) => serde_json::json!({ "frame": frame, "error": error }),
                })
                .collect();
            print_json(&serde_json::json!({
                "fps": fps.fps(),
                "base_offset": base,
                "timecodes": items,
            }))?;
        }
    }

    Ok(())
}

fn output_frames(args: &Args, converter: &TimecodeConverter, fps: FrameRate) -> anyhow::Result<()> {
    let results: Vec<(&str, Result<u64, String>)> = args
        .inputs
        .iter()
        .map(|timecode| {
            let result = converter
                .to_frame_index(timecode, fps.fps())
                .map_err(|e| e.to_string());
            (timecode.as_str(), result)
        })
        .collect();

    match args.output_format {
        OutputFormat::Simple | OutputFormat::Detailed => {
            if args.output_format == OutputFormat::Detailed {
                println!("Frame numbers at {} fps:", fps);
            }
            for (timecode, result) in &results {
                match result {
                    Ok(frame) => println!("{} -> {}", timecode, frame),
                    Err(error) => println!("{} -> error: {}", timecode, error),
                }
            }
        }
        OutputFormat::Json => {
            let items: Vec<serde_json::Value> = results
                .iter()
                .map(|(timecode, result)| match result {
                    Ok(frame) => serde_json::json!({ "timecode": timecode, "frame": frame }),
                    Err(error) => serde_json::json!({ "timecode": timecode, "error": error }),
                })
                .collect();
            print_json(&serde_json::json!({ "fps": fps.fps(), "frames": items }))?;
        }
    }

    Ok(())
}

fn output_matches(args: &Args) -> anyhow::Result<()> {
    let (Some(baselight), Some(xytech)) = (&args.baselight, &args.xytech) else {
        bail!("match requires --baselight and --xytech");
    };

    let export = fs::read_to_string(baselight)
        .with_context(|| format!("Failed to read grading export {}", baselight))?;
    let work_order = fs::read_to_string(xytech)
        .with_context(|| format!("Failed to read work order {}", xytech))?;

    let entries = parse_baselight_export(&export);
    let locations = parse_xytech_locations(&work_order);
    let rows = build_match_table(&entries, &locations);

    match args.output_format {
        OutputFormat::Simple => {
            for row in &rows {
                for range in &row.frame_ranges {
                    println!("{}\t{}", row.location, range);
                }
            }
        }
        OutputFormat::Detailed => {
            println!("Match Results:");
            println!("  Export entries: {}", entries.len());
            println!("  Work order locations: {}", locations.len());
            println!("  Matched locations: {}", rows.len());
            for row in &rows {
                println!("    {} ({})", row.location, row.norm_path);
                for range in &row.frame_ranges {
                    println!("      {}", range);
                }
            }
        }
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "baselight": baselight,
                "xytech": xytech,
                "matches": rows,
            }))?;
        }
    }

    info!("Matched {} of {} locations", rows.len(), locations.len());

    Ok(())
}
