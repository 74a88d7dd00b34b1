use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{MediaFfmpegError, Result};
use crate::probe::probe_media;

/// A decoded RGBA frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes the first frame of `path` stretched to exactly `width` x `height`.
///
/// The source aspect ratio is not preserved.
///
/// # Example
/// ```no_run
/// use media_ffmpeg::decode_image_scaled;
///
/// let frame = decode_image_scaled("photo.jpg", 1200, 800).expect("decode should succeed");
/// assert_eq!(frame.rgba.len(), 1200 * 800 * 4);
/// ```
pub fn decode_image_scaled(path: impl AsRef<Path>, width: u32, height: u32) -> Result<RgbaFrame> {
    if width == 0 || height == 0 {
        return Err(MediaFfmpegError::InvalidDimensions { width, height });
    }

    let path = path.as_ref();
    let rgba = run_rawvideo(path, None, &scale_filter(width, height))?;
    check_frame_size(width, height, &rgba)?;
    debug!(path = %path.display(), width, height, "decoded scaled image");

    Ok(RgbaFrame {
        width,
        height,
        rgba,
    })
}

/// Decodes one video frame near `at_seconds` at the stream's native size.
///
/// Seeking uses FFmpeg input seeking, so the returned frame is the first one
/// decoded after the nearest preceding keyframe has been skipped past.
///
/// # Example
/// ```no_run
/// use media_ffmpeg::decode_video_frame_near_seconds;
///
/// let frame = decode_video_frame_near_seconds("sample.mp4", 2.0)
///     .expect("decode should succeed");
/// assert!(!frame.rgba.is_empty());
/// ```
pub fn decode_video_frame_near_seconds(
    path: impl AsRef<Path>,
    at_seconds: f64,
) -> Result<RgbaFrame> {
    if !at_seconds.is_finite() || at_seconds < 0.0 {
        return Err(MediaFfmpegError::InvalidTimestampSeconds(at_seconds));
    }

    let path = path.as_ref();
    let media = probe_media(path)?;
    if media.first_video().is_none() {
        return Err(MediaFfmpegError::MissingVideoStream(path.to_path_buf()));
    }
    let (width, height) = media
        .video_dimensions()
        .ok_or_else(|| MediaFfmpegError::MissingVideoDimensions(path.to_path_buf()))?;

    let rgba = run_rawvideo(path, Some(at_seconds), "format=rgba")?;
    check_frame_size(width, height, &rgba)?;

    Ok(RgbaFrame {
        width,
        height,
        rgba,
    })
}

fn scale_filter(width: u32, height: u32) -> String {
    format!("scale={width}:{height}:flags=bilinear,format=rgba")
}

fn check_frame_size(width: u32, height: u32, rgba: &[u8]) -> Result<()> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(MediaFfmpegError::UnexpectedFrameSize {
            expected,
            actual: rgba.len(),
        });
    }
    Ok(())
}

fn rawvideo_args(path: &Path, seek_seconds: Option<f64>, filter: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-v".into(), "error".into()];
    if let Some(seconds) = seek_seconds {
        args.push("-ss".into());
        args.push(format!("{seconds:.3}").into());
    }
    args.push("-i".into());
    args.push(path.as_os_str().to_owned());
    for arg in [
        "-vf", filter, "-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgba", "-",
    ] {
        args.push(arg.into());
    }
    args
}

fn run_rawvideo(path: &Path, seek_seconds: Option<f64>, filter: &str) -> Result<Vec<u8>> {
    let output = Command::new("ffmpeg")
        .args(rawvideo_args(path, seek_seconds, filter))
        .output()
        .map_err(|source| MediaFfmpegError::Io {
            context: "run ffmpeg decode frame",
            source,
        })?;

    if !output.status.success() {
        return Err(MediaFfmpegError::CommandFailed {
            command: format!("ffmpeg decode frame {}", path.display()),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::Path;

    use super::{check_frame_size, decode_image_scaled, rawvideo_args, scale_filter};
    use crate::MediaFfmpegError;

    #[test]
    fn scale_filter_stretches_to_exact_size() {
        assert_eq!(
            scale_filter(1200, 800),
            "scale=1200:800:flags=bilinear,format=rgba"
        );
    }

    #[test]
    fn seek_is_placed_before_input() {
        let args = rawvideo_args(Path::new("clip.mp4"), Some(2.0), "format=rgba");

        let ss = args
            .iter()
            .position(|arg| arg == "-ss")
            .expect("seek flag present");
        let input = args
            .iter()
            .position(|arg| arg == "-i")
            .expect("input flag present");
        assert!(ss < input);
        assert_eq!(args[ss + 1], OsString::from("2.000"));
    }

    #[test]
    fn zero_dimensions_are_rejected_before_spawning_ffmpeg() {
        let result = decode_image_scaled("never-read.png", 0, 10);

        assert!(matches!(
            result,
            Err(MediaFfmpegError::InvalidDimensions {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn short_output_is_reported() {
        let result = check_frame_size(2, 2, &[0_u8; 12]);

        assert!(matches!(
            result,
            Err(MediaFfmpegError::UnexpectedFrameSize {
                expected: 16,
                actual: 12
            })
        ));
    }
}
