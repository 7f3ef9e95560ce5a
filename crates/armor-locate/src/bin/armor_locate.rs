//! armor-locate CLI: localize the target in every frame of a recorded sequence.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;

use armor_locate::io::{CycleReport, LocalizeConfig};
use armor_locate::replay::ReplayFrameSource;
use armor_locate::{ColorThresholdDetector, Localization, Localizer, TargetColor};

use std::str::FromStr;

use log::{info, warn, LevelFilter};

#[cfg(feature = "tracing")]
use armor_locate::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use armor_locate::core::init_with_level;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "armor-locate")]
#[command(about = "Estimate the 3D position of a colored armor plate from aligned color + depth frames")]
#[command(version)]
struct Cli {
    /// Replay manifest (JSON) describing the recorded sequence.
    #[arg(long)]
    sequence: Option<PathBuf>,

    /// JSON config; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Armor color to look for.
    #[arg(long, value_enum)]
    color: Option<TargetColor>,

    /// Fraction of the outline trimmed before sampling depth, in [0, 1).
    #[arg(long)]
    shrink_ratio: Option<f32>,

    /// Stop after this many cycles.
    #[arg(long)]
    max_cycles: Option<usize>,

    /// Print one JSON report per cycle instead of captions.
    #[arg(long)]
    json: bool,

    /// Also write JSON-lines reports to this file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,

    /// Emit tracing output as JSON (tracing builds only).
    #[arg(long)]
    log_json: bool,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    #[cfg(not(feature = "tracing"))]
    {
        init_with_level(cli.log_level)?;
        if cli.log_json {
            warn!("--log-json needs a build with the `tracing` feature");
        }
    }

    #[cfg(feature = "tracing")]
    {
        init_tracing(cli.log_json);
        if cli.log_level != LevelFilter::Info {
            warn!("--log-level is ignored in tracing builds, use RUST_LOG");
        }
    }

    run(cli)
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(raw).map_err(|_| {
        format!("unknown log level `{raw}` (expected off, error, warn, info, debug or trace)")
    })
}

fn resolve_config(cli: &Cli) -> CliResult<LocalizeConfig> {
    let mut cfg = match &cli.config {
        Some(path) => LocalizeConfig::load_json(path)?,
        None => LocalizeConfig::default(),
    };
    if let Some(seq) = &cli.sequence {
        cfg.sequence_path = Some(seq.to_string_lossy().into_owned());
    }
    if let Some(color) = cli.color {
        cfg.localizer.target_color = color;
    }
    if let Some(ratio) = cli.shrink_ratio {
        cfg.localizer.shrink_ratio = ratio;
    }
    if let Some(n) = cli.max_cycles {
        cfg.max_cycles = Some(n);
    }
    if let Some(out) = &cli.output {
        cfg.output_path = Some(out.to_string_lossy().into_owned());
    }
    Ok(cfg)
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(cli)))]
fn run(cli: Cli) -> CliResult<()> {
    let cfg = resolve_config(&cli)?;
    let sequence = cfg
        .sequence_path
        .as_deref()
        .ok_or("no sequence given (use --sequence or sequence_path in --config)")?;

    let mut source = ReplayFrameSource::open(sequence)?;
    let localizer = Localizer::from_source(&source, cfg.localizer.clone())?;
    let mut detector = ColorThresholdDetector::new(cfg.detector.clone());
    let k = localizer.intrinsics();
    info!(
        "replaying {} frames from {sequence} ({}x{}, {} m/unit), target {}",
        source.len(),
        k.width,
        k.height,
        source.manifest().depth_units,
        localizer.params().target_color
    );

    let mut report_file = match cfg.output_path() {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut cycles = 0usize;
    let mut detected = 0usize;
    loop {
        if cfg.max_cycles.is_some_and(|max| cycles >= max) {
            break;
        }
        let cycle = match localizer.run_one_cycle(&mut source, &mut detector) {
            Ok(cycle) => cycle,
            Err(err) if err.is_exhausted() => break,
            Err(err) => return Err(err.into()),
        };
        cycles += 1;

        let report = CycleReport::from(&cycle);
        if cli.json {
            writeln!(out, "{}", report.to_json_line()?)?;
        } else {
            match &cycle.outcome {
                Localization::Detected(found) => {
                    writeln!(
                        out,
                        "frame {} {}: {}",
                        cycle.frames.index,
                        found.color,
                        found.to_string().replace('\n', " ")
                    )?;
                }
                Localization::Missed(reason) => {
                    writeln!(out, "frame {}: no detection ({reason})", cycle.frames.index)?
                }
            }
        }
        if cycle.detected() {
            detected += 1;
        }
        if let Some(file) = report_file.as_mut() {
            writeln!(file, "{}", report.to_json_line()?)?;
        }
    }

    if let Some(mut file) = report_file {
        file.flush()?;
    }
    if cycles == 0 {
        warn!("sequence produced no frames");
    }
    info!("{detected}/{cycles} cycles localized the target");
    Ok(())
}
