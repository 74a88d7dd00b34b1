mod error;
mod frames;
mod probe;

pub use error::{MediaFfmpegError, Result};
pub use frames::{RgbaFrame, decode_image_scaled, decode_video_frame_near_seconds};
pub use probe::{MediaInfo, StreamInfo, StreamKind, probe_media};
