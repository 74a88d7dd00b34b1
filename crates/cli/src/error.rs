use std::fmt::{Display, Formatter};

pub type Result<T> = std::result::Result<T, CliError>;

/// Failures surfaced by the headless commands.
#[derive(Debug)]
pub enum CliError {
    Engine(engine::EngineError),
    Media(media_ffmpeg::MediaFfmpegError),
    Json(serde_json::Error),
    Output(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "{err}"),
            Self::Media(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "failed to encode report ({err})"),
            Self::Output(err) => write!(f, "failed to write output ({err})"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            Self::Media(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<engine::EngineError> for CliError {
    fn from(value: engine::EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<media_ffmpeg::MediaFfmpegError> for CliError {
    fn from(value: media_ffmpeg::MediaFfmpegError) -> Self {
        Self::Media(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}
