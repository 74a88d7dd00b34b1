mod app;
mod bridge;
mod widgets;

use std::path::PathBuf;
use std::process::ExitCode;

use app::AppState;
use clap::Parser;
use engine::ViewerConfig;
use tracing::error;

/// Desktop viewer that draws an image at a chosen size or plays a video
/// alongside a simulated seconds clock.
#[derive(Debug, Parser)]
#[command(name = "media-canvas", version)]
struct Args {
    /// TOML file with initial width, height, start, end and indicator policy.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, allow_hyphen_values = true)]
    width: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    height: Option<i64>,

    /// Playback start in whole seconds.
    #[arg(long, allow_hyphen_values = true)]
    start: Option<i64>,

    /// Playback end in whole seconds.
    #[arg(long, allow_hyphen_values = true)]
    end: Option<i64>,

    /// Media file to load on startup.
    path: Option<PathBuf>,
}

impl Args {
    fn viewer_config(&self) -> engine::Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(end) = self.end {
            config.end = end;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();
    let config = match args.viewer_config() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load viewer config");
            return ExitCode::from(2);
        }
    };

    let result = iced::application("Media Canvas", AppState::update, AppState::view)
        .subscription(AppState::subscription)
        .exit_on_close_request(false)
        .run_with(AppState::boot(config, args.path));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "viewer exited with an error");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}
