use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::locator::ResourceLocator;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const CONTENT_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ico", "image/x-icon"),
    ("avif", "image/avif"),
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("ogv", "video/ogg"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("3gp", "video/3gpp"),
];

/// Which surface a media file is presented on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classifies a declared content type: anything starting with `video` is a video.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("video") {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// Returns the declared content type for `path` based on its extension.
///
/// Unknown extensions map to `application/octet-stream`, which classifies as
/// an image; such files fail later at decode time.
///
/// # Example
/// ```
/// use std::path::Path;
///
/// use engine::{MediaKind, content_type_for_path};
///
/// let content_type = content_type_for_path(Path::new("Clip.MOV"));
/// assert_eq!(content_type, "video/quicktime");
/// assert_eq!(MediaKind::from_content_type(content_type), MediaKind::Video);
/// ```
pub fn content_type_for_path(path: &Path) -> &'static str {
    let Some(extension) = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
    else {
        return FALLBACK_CONTENT_TYPE;
    };

    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, content_type)| *content_type)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// Extensions offered by the file picker for the given kind.
pub fn picker_extensions(kind: MediaKind) -> Vec<&'static str> {
    CONTENT_TYPES
        .iter()
        .filter(|(_, content_type)| MediaKind::from_content_type(content_type) == kind)
        .map(|(extension, _)| *extension)
        .collect()
}

/// The currently loaded media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle {
    pub locator: ResourceLocator,
    pub path: PathBuf,
    pub content_type: &'static str,
    pub kind: MediaKind,
}

impl MediaHandle {
    /// Builds a handle for `path`, classifying it by declared content type.
    pub fn new(locator: ResourceLocator, path: PathBuf) -> Self {
        let content_type = content_type_for_path(&path);
        Self {
            locator,
            path,
            content_type,
            kind: MediaKind::from_content_type(content_type),
        }
    }
}
