use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, MediaFfmpegError>;

/// Error type for probing and decoding backed by the FFmpeg CLI tools.
#[derive(Debug)]
pub enum MediaFfmpegError {
    InvalidTimestampSeconds(f64),
    InvalidDimensions {
        width: u32,
        height: u32,
    },
    MissingVideoStream(PathBuf),
    MissingVideoDimensions(PathBuf),
    Io {
        context: &'static str,
        source: std::io::Error,
    },
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    ProbeOutput {
        path: PathBuf,
        source: serde_json::Error,
    },
    UnexpectedFrameSize {
        expected: usize,
        actual: usize,
    },
    Parse {
        context: &'static str,
        value: String,
    },
}

impl Display for MediaFfmpegError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimestampSeconds(value) => {
                write!(f, "invalid timestamp seconds: {value}")
            }
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid output dimensions {width}x{height}")
            }
            Self::MissingVideoStream(path) => {
                write!(f, "video stream not found: {}", path.display())
            }
            Self::MissingVideoDimensions(path) => {
                write!(f, "video dimensions missing: {}", path.display())
            }
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::CommandFailed {
                command,
                status,
                stderr,
            } => write!(
                f,
                "command failed ({status}): {command}; stderr: {}",
                stderr.trim()
            ),
            Self::ProbeOutput { path, source } => {
                write!(f, "unreadable ffprobe output for {} ({source})", path.display())
            }
            Self::UnexpectedFrameSize { expected, actual } => {
                write!(f, "decoded rgba size: expected {expected} bytes, got {actual}")
            }
            Self::Parse { context, value } => write!(f, "parse error ({context}): {value}"),
        }
    }
}

impl std::error::Error for MediaFfmpegError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::ProbeOutput { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MediaFfmpegError;

    #[test]
    fn frame_size_error_reports_both_lengths() {
        let error = MediaFfmpegError::UnexpectedFrameSize {
            expected: 16,
            actual: 12,
        };

        assert_eq!(
            error.to_string(),
            "decoded rgba size: expected 16 bytes, got 12"
        );
    }
}
