mod error;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use engine::{Command, Engine, Event, MediaKind, ViewerConfig, content_type_for_path};
use media_ffmpeg::MediaInfo;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::Result;

#[derive(Debug, Parser)]
#[command(name = "media-canvas-cli", version)]
struct Cli {
    #[command(subcommand)]
    cmd: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Print the declared content type and stream summary of a media file.
    Inspect(InspectArgs),
    /// Run the playback clock and print each time readout until it stops.
    Play(PlayArgs),
}

#[derive(Debug, Parser)]
struct InspectArgs {
    path: PathBuf,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Parser)]
struct PlayArgs {
    #[arg(long, allow_hyphen_values = true)]
    start: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    end: Option<i64>,

    /// Media file to load before playing.
    #[arg(long)]
    path: Option<PathBuf>,

    /// Milliseconds between ticks.
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    /// TOML file with initial values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    path: PathBuf,
    content_type: &'static str,
    kind: MediaKind,
    probe: MediaInfo,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.cmd {
        CliCommand::Inspect(args) => cmd_inspect(&args, &mut std::io::stdout().lock()),
        CliCommand::Play(args) => cmd_play(&args, &mut std::io::stdout().lock()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_inspect(args: &InspectArgs, out: &mut impl Write) -> Result<()> {
    let report = inspect(&args.path)?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "path: {}", report.path.display())?;
    writeln!(out, "content type: {}", report.content_type)?;
    writeln!(out, "kind: {:?}", report.kind)?;
    if let Some(format_name) = &report.probe.format_name {
        writeln!(out, "format: {format_name}")?;
    }
    if let Some(duration) = report.probe.duration_seconds {
        writeln!(out, "duration: {duration:.3}s")?;
    }
    for stream in &report.probe.streams {
        write!(
            out,
            "stream #{}: {:?} {}",
            stream.index,
            stream.kind,
            stream.codec_name.as_deref().unwrap_or("unknown")
        )?;
        if let (Some(width), Some(height)) = (stream.width, stream.height) {
            write!(out, " {width}x{height}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<InspectReport> {
    let content_type = content_type_for_path(path);
    let probe = media_ffmpeg::probe_media(path)?;
    Ok(InspectReport {
        path: path.to_path_buf(),
        content_type,
        kind: MediaKind::from_content_type(content_type),
        probe,
    })
}

fn cmd_play(args: &PlayArgs, out: &mut impl Write) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(start) = args.start {
        config.start = start;
    }
    if let Some(end) = args.end {
        config.end = end;
    }

    let mut engine = Engine::new(&config);
    if let Some(path) = &args.path {
        engine.handle_command(Command::Load { path: path.clone() });
    }
    info!(start = config.start, end = config.end, "playing");
    run_clock(&mut engine, Duration::from_millis(args.tick_ms), out)?;
    engine.teardown();
    Ok(())
}

/// Starts playback and feeds ticks every `tick` until the clock stops.
fn run_clock(engine: &mut Engine, tick: Duration, out: &mut impl Write) -> Result<()> {
    let mut schedule = None;
    let mut printed = None;

    let mut events = engine.handle_command(Command::TogglePlayPause);
    loop {
        for event in events {
            match event {
                Event::TickerScheduled { schedule: next } => schedule = Some(next),
                Event::TickerCancelled => schedule = None,
                Event::ClockChanged(clock) => {
                    let readout = clock.readout();
                    if readout != printed {
                        if let Some(text) = &readout {
                            writeln!(out, "{text}")?;
                        }
                        printed = readout;
                    }
                }
                Event::Video(command) => debug!(?command, "video command"),
                _ => {}
            }
        }

        let Some(live) = schedule else {
            return Ok(());
        };
        thread::sleep(tick);
        events = engine.handle_command(Command::Tick { schedule: live });
    }
}
