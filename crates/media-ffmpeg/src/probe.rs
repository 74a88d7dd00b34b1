use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{MediaFfmpegError, Result};

/// Stream kind reported by `ffprobe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Other,
}

/// One stream entry of a probe result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    pub index: u32,
    pub kind: StreamKind,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Media probe result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub format_name: Option<String>,
    pub streams: Vec<StreamInfo>,
    pub duration_seconds: Option<f64>,
}

impl MediaInfo {
    /// Returns the first video stream.
    ///
    /// Still images are reported by ffprobe as a single video stream too.
    ///
    /// # Example
    /// ```no_run
    /// use media_ffmpeg::probe_media;
    ///
    /// let info = probe_media("sample.mp4").expect("probe should succeed");
    /// let _video = info.first_video().expect("video stream exists");
    /// ```
    pub fn first_video(&self) -> Option<&StreamInfo> {
        self.streams
            .iter()
            .find(|stream| stream.kind == StreamKind::Video)
    }

    /// Returns `(width, height)` of the first video stream when both are known.
    pub fn video_dimensions(&self) -> Option<(u32, u32)> {
        let video = self.first_video()?;
        Some((video.width?, video.height?))
    }
}

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

/// Probes a media file via `ffprobe -of json`.
///
/// # Example
/// ```no_run
/// use media_ffmpeg::probe_media;
///
/// let info = probe_media("sample.png").expect("probe should succeed");
/// assert!(!info.streams.is_empty());
/// ```
pub fn probe_media(path: impl AsRef<Path>) -> Result<MediaInfo> {
    let path = path.as_ref();

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "stream=index,codec_type,codec_name,width,height:format=format_name,duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|source| MediaFfmpegError::Io {
            context: "run ffprobe",
            source,
        })?;

    if !output.status.success() {
        return Err(MediaFfmpegError::CommandFailed {
            command: format!("ffprobe {}", path.display()),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    parse_probe_output(path, &output.stdout)
}

fn parse_probe_output(path: &Path, stdout: &[u8]) -> Result<MediaInfo> {
    let document: ProbeDocument =
        serde_json::from_slice(stdout).map_err(|source| MediaFfmpegError::ProbeOutput {
            path: path.to_path_buf(),
            source,
        })?;

    if document.streams.is_empty() {
        return Err(MediaFfmpegError::Parse {
            context: "streams",
            value: "no streams found".to_string(),
        });
    }

    let streams = document
        .streams
        .into_iter()
        .map(|stream| StreamInfo {
            index: stream.index,
            kind: match stream.codec_type.as_deref() {
                Some("video") => StreamKind::Video,
                Some("audio") => StreamKind::Audio,
                _ => StreamKind::Other,
            },
            codec_name: stream.codec_name,
            width: stream.width.filter(|width| *width > 0),
            height: stream.height.filter(|height| *height > 0),
        })
        .collect();

    let (format_name, duration_seconds) = match document.format {
        Some(format) => (format.format_name, parse_duration(format.duration.as_deref())?),
        None => (None, None),
    };

    Ok(MediaInfo {
        path: path.to_path_buf(),
        format_name,
        streams,
        duration_seconds,
    })
}

fn parse_duration(raw: Option<&str>) -> Result<Option<f64>> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() || raw == "N/A" {
        return Ok(None);
    }

    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| MediaFfmpegError::Parse {
            context: "format duration seconds",
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{StreamKind, parse_probe_output};
    use crate::MediaFfmpegError;

    #[test]
    fn parses_video_and_audio_streams_with_duration() {
        let json = br#"{
            "streams": [
                {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 160, "height": 90},
                {"index": 1, "codec_type": "audio", "codec_name": "aac"}
            ],
            "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "1.200000"}
        }"#;

        let info = parse_probe_output(Path::new("demo.mp4"), json).expect("valid probe json");

        assert_eq!(info.streams.len(), 2);
        assert_eq!(info.streams[1].kind, StreamKind::Audio);
        assert_eq!(info.video_dimensions(), Some((160, 90)));
        assert_eq!(info.duration_seconds, Some(1.2));
    }

    #[test]
    fn still_image_has_no_duration() {
        let json = br#"{
            "streams": [{"index": 0, "codec_type": "video", "codec_name": "png", "width": 64, "height": 48}],
            "format": {"format_name": "png_pipe", "duration": "N/A"}
        }"#;

        let info = parse_probe_output(Path::new("still.png"), json).expect("valid probe json");

        assert_eq!(info.duration_seconds, None);
        assert_eq!(info.format_name.as_deref(), Some("png_pipe"));
    }

    #[test]
    fn zero_dimensions_are_reported_as_missing() {
        let json = br#"{"streams": [{"index": 0, "codec_type": "video", "width": 0, "height": 0}]}"#;

        let info = parse_probe_output(Path::new("broken.mkv"), json).expect("valid probe json");

        assert_eq!(info.video_dimensions(), None);
    }

    #[test]
    fn empty_stream_list_is_an_error() {
        let result = parse_probe_output(Path::new("empty.bin"), br#"{"streams": []}"#);

        assert!(matches!(
            result,
            Err(MediaFfmpegError::Parse {
                context: "streams",
                ..
            })
        ));
    }

    #[test]
    fn malformed_json_is_reported_with_path() {
        let result = parse_probe_output(Path::new("weird.bin"), b"not json");

        let Err(MediaFfmpegError::ProbeOutput { path, .. }) = result else {
            panic!("expected ProbeOutput error");
        };
        assert_eq!(path, Path::new("weird.bin"));
    }
}
