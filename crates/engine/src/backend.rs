use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

/// RGBA pixels ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub bytes: Arc<[u8]>,
}

impl From<media_ffmpeg::RgbaFrame> for RasterFrame {
    fn from(value: media_ffmpeg::RgbaFrame) -> Self {
        Self {
            width: value.width,
            height: value.height,
            bytes: value.rgba.into(),
        }
    }
}

/// Media decoding used by the render worker and the video surface.
pub trait MediaBackend {
    /// Decodes a still image stretched to exactly `width` x `height`.
    fn decode_still(&self, path: &Path, width: u32, height: u32) -> Result<RasterFrame>;

    /// Decodes one video frame near `at_seconds` for a poster image.
    fn decode_poster(&self, path: &Path, at_seconds: f64) -> Result<RasterFrame>;

    /// Returns the container duration in seconds, when the file declares one.
    fn media_duration(&self, path: &Path) -> Result<Option<f64>>;
}

/// FFmpeg CLI-backed backend used by production wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegMediaBackend;

impl MediaBackend for FfmpegMediaBackend {
    fn decode_still(&self, path: &Path, width: u32, height: u32) -> Result<RasterFrame> {
        Ok(media_ffmpeg::decode_image_scaled(path, width, height)?.into())
    }

    fn decode_poster(&self, path: &Path, at_seconds: f64) -> Result<RasterFrame> {
        Ok(media_ffmpeg::decode_video_frame_near_seconds(path, at_seconds.max(0.0))?.into())
    }

    fn media_duration(&self, path: &Path) -> Result<Option<f64>> {
        Ok(media_ffmpeg::probe_media(path)?.duration_seconds)
    }
}
