//! CAN Signal Decoder CLI Application
//!
//! Command-line front end for the can-signal-decoder library:
//! - Print the `SG_` definitions of loaded DBC files
//! - Decode a single payload given on the command line
//! - Decode a candump log, optionally restricted to a time window
//! - Extract down-sampled plot points for one signal

use anyhow::{bail, Context, Result};
use can_signal_decoder::entries::{self, Entry};
use can_signal_decoder::formats::CandumpParser;
use can_signal_decoder::{
    CanFrame, DecodedEvent, DecodedSignal, Decoder, DecoderConfig, PlotPoint,
};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

mod config;

use config::{AppConfig, OutputFormat};

/// CAN Signal Decoder - decode CAN payloads with DBC signal definitions
#[derive(Parser, Debug)]
#[command(name = "can-signal-cli")]
#[command(about = "Decode CAN frames into physical values using DBC files", long_about = None)]
#[command(version)]
struct Args {
    /// Path to DBC file(s) (can be repeated)
    #[arg(long, value_name = "FILE")]
    dbc: Vec<PathBuf>,

    /// Path to a candump log file to decode
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// CAN ID (hex) of a single payload to decode
    #[arg(long, value_name = "HEX", requires = "data")]
    id: Option<String>,

    /// Payload bytes (hex) of a single frame to decode
    #[arg(long, value_name = "HEX", requires = "id")]
    data: Option<String>,

    /// Print the definitions of all loaded messages
    #[arg(long)]
    signals: bool,

    /// Only decode log frames between START and END seconds from the first frame
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    segment: Option<Vec<f64>>,

    /// Print plot points for this signal instead of decoded frames
    #[arg(long, value_name = "SIGNAL", requires = "log")]
    plot: Option<String>,

    /// Emit JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of frames to decode
    #[arg(long, value_name = "COUNT")]
    max_frames: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// One decoded frame as written to the output
#[derive(Serialize)]
struct OutputRow<'a> {
    time: f64,
    channel: &'a str,
    can_id: u32,
    message: &'a str,
    signals: &'a [DecodedSignal],
    failures: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("CAN Signal Decoder CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", can_signal_decoder::VERSION);

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };
    let format = if args.json { OutputFormat::Json } else { config.output.format };

    let mut decoder = Decoder::new();
    for dbc_path in config.input.dbc_files.iter().chain(&args.dbc) {
        decoder
            .add_dbc(dbc_path)
            .with_context(|| format!("Failed to load DBC {:?}", dbc_path))?;
    }

    let stats = decoder.database_stats();
    log::info!("Signal database: {} messages, {} signals", stats.num_messages, stats.num_signals);

    let decoder_config = decoder_config(&config);
    let log_path = args.log.clone().or_else(|| config.input.log_file.clone());
    let mut did_something = false;

    if args.signals {
        print_definitions(&decoder);
        did_something = true;
    }

    if let (Some(id), Some(data)) = (&args.id, &args.data) {
        decode_single(&decoder, &decoder_config, id, data, format)?;
        did_something = true;
    }

    if let Some(path) = &log_path {
        let frames = read_frames(path, args.max_frames)?;
        let window = segment_window(args.segment.as_deref())?;

        match &args.plot {
            Some(signal) => {
                let points =
                    plot_points(&decoder, &frames, signal, window, config.output.max_points)?;
                print_points(&points, format)?;
            }
            None => {
                for (time, event) in &decode_log(&decoder, &decoder_config, &frames, window) {
                    if let Some(text) = format_event(event, *time, format)? {
                        println!("{}", text);
                    }
                }
            }
        }
        did_something = true;
    }

    if !did_something {
        println!("CAN Signal Decoder - No input specified");
        println!("\nQuick Start:");
        println!("  can-signal-cli --dbc powertrain.dbc --signals");
        println!("  can-signal-cli --dbc powertrain.dbc --id 123 --data B80B7DFF38000000");
        println!("  can-signal-cli --dbc powertrain.dbc --log candump.log --segment 10 20");
        println!("\nUse --help for more options");
    }

    Ok(())
}

fn decoder_config(config: &AppConfig) -> DecoderConfig {
    let mut decoder_config = DecoderConfig::new();
    if let Some(channels) = &config.filtering.channels {
        decoder_config = decoder_config.with_channel_filter(channels.iter().cloned());
    }
    if let Some(ids) = &config.filtering.message_ids {
        decoder_config = decoder_config.with_message_filter(ids.clone());
    }
    decoder_config
}

fn print_definitions(decoder: &Decoder) {
    for message in decoder.database().messages() {
        println!("{}\n", message.text());
    }
}

fn decode_single(
    decoder: &Decoder,
    config: &DecoderConfig,
    id: &str,
    data: &str,
    format: OutputFormat,
) -> Result<()> {
    let can_id = u32::from_str_radix(id.trim_start_matches("0x"), 16)
        .with_context(|| format!("Invalid CAN ID '{}'", id))?;
    let payload = parse_hex(data)?;
    let frame = CanFrame::new(can_id, payload);

    match decoder.decode_frame(&frame, config) {
        Some(event) => {
            if let Some(text) = format_event(&event, 0.0, format)? {
                println!("{}", text);
            }
            Ok(())
        }
        None => bail!("No message definition for CAN ID 0x{:X}", can_id),
    }
}

fn read_frames(path: &Path, max_frames: Option<usize>) -> Result<Vec<CanFrame>> {
    let parser = CandumpParser::parse(path)?;
    let mut frames = Vec::new();
    for result in parser.take(max_frames.unwrap_or(usize::MAX)) {
        match result {
            Ok(frame) => frames.push(frame),
            Err(e) => log::warn!("Skipping log line: {}", e),
        }
    }

    log::info!("Read {} frames from {:?}", frames.len(), path);
    Ok(frames)
}

/// Validated `--segment` bounds, in seconds since the first frame of the log
fn segment_window(segment: Option<&[f64]>) -> Result<Option<(f64, f64)>> {
    let Some(bounds) = segment else {
        return Ok(None);
    };
    let &[start, end] = bounds else {
        bail!("--segment takes exactly two values");
    };
    if start > end {
        bail!("Segment start {} is after its end {}", start, end);
    }
    Ok(Some((start, end)))
}

fn relative_secs(frame: &CanFrame, origin_ns: u64) -> f64 {
    frame.timestamp_ns.saturating_sub(origin_ns) as f64 / 1e9
}

/// Decode all frames in parallel against the shared, read-only decoder
///
/// Times stay relative to the first frame of the whole log, also when a
/// window selects only part of it.
fn decode_log(
    decoder: &Decoder,
    config: &DecoderConfig,
    frames: &[CanFrame],
    window: Option<(f64, f64)>,
) -> Vec<(f64, DecodedEvent)> {
    let origin = frames.first().map(|f| f.timestamp_ns).unwrap_or(0);

    let mut events: Vec<(f64, DecodedEvent)> = frames
        .par_iter()
        .filter_map(|frame| {
            decoder
                .decode_frame(frame, config)
                .map(|event| (relative_secs(frame, origin), event))
        })
        .collect();
    log::info!("Decoded {} of {} frames", events.len(), frames.len());

    if let Some((start, end)) = window {
        let index: Vec<Entry> = events
            .iter()
            .map(|(time, event)| Entry::from_event(*time, event))
            .collect();
        match entries::find_segment_indices(&index, start, end) {
            Some((low, high)) => {
                events.truncate(high + 1);
                events.drain(..low);
            }
            None => events.clear(),
        }
        log::info!("{} events inside {}s..{}s", events.len(), start, end);
    }
    events
}

/// Output text of a message event, `None` for raw frames
fn format_event(event: &DecodedEvent, time: f64, format: OutputFormat) -> Result<Option<String>> {
    let DecodedEvent::Message {
        channel,
        can_id,
        message_name,
        signals,
        failures,
        ..
    } = event
    else {
        return Ok(None);
    };

    let text = match format {
        OutputFormat::Json => {
            let row = OutputRow {
                time,
                channel,
                can_id: *can_id,
                message: message_name,
                signals,
                failures: failures.iter().map(|f| f.name.clone()).collect(),
            };
            serde_json::to_string(&row)?
        }
        OutputFormat::Txt => {
            let mut lines = vec![format!(
                "[{:.6}s] {} 0x{:03X} {}",
                time, channel, can_id, message_name
            )];
            for signal in signals {
                lines.push(format!("    {}  [{}|{}]", signal, signal.min, signal.max));
            }
            for failure in failures {
                lines.push(format!("    {}: <{}>", failure.name, failure.reason));
            }
            lines.join("\n")
        }
    };
    Ok(Some(text))
}

/// Down-sampled plot points of one signal, timed from the first frame of the log
fn plot_points(
    decoder: &Decoder,
    frames: &[CanFrame],
    signal_name: &str,
    window: Option<(f64, f64)>,
    max_points: usize,
) -> Result<Vec<PlotPoint>> {
    let db = decoder.database();
    let Some(&(can_id, signal)) = db.find_signal(signal_name).first() else {
        bail!("Signal '{}' not found in loaded DBC files", signal_name);
    };
    let Some(message) = db.get_message(can_id) else {
        bail!("Message 0x{:X} not found", can_id);
    };

    let series: Vec<Entry> = entries::build_entries(frames, message);
    let segment = match window {
        Some((start, end)) => match entries::find_segment_indices(&series, start, end) {
            Some(bounds) => Some(bounds),
            None => {
                log::warn!("No '{}' samples between {}s and {}s", signal_name, start, end);
                return Ok(Vec::new());
            }
        },
        None => None,
    };
    let selected = match segment {
        Some((low, high)) => &series[low..=high],
        None => &series[..],
    };

    let points = entries::graph_data(selected, signal_name, signal.unit(), max_points);
    log::info!(
        "{} entries over {:.3}s, {} plot points",
        selected.len(),
        entries::seconds_loaded(&series, segment),
        points.len()
    );
    Ok(points)
}

fn print_points(points: &[PlotPoint], format: OutputFormat) -> Result<()> {
    for point in points {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(point)?),
            OutputFormat::Txt => println!("{:.6}\t{}\t{}", point.x, point.y, point.unit),
        }
    }
    Ok(())
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("Payload '{}' has an odd number of hex digits", text);
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|byte| u8::from_str_radix(byte, 16).ok())
                .with_context(|| format!("Invalid payload '{}' at digit {}", text, i))
        })
        .collect()
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
