use std::path::{Path, PathBuf};

use serde::Serialize;

/// Requested output size of the display surface.
///
/// Holds whatever was last entered, including zero or negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: i64,
    pub height: i64,
}

impl Viewport {
    /// Returns the size as pixel dimensions, or `None` when either side is not drawable.
    ///
    /// # Example
    /// ```
    /// use engine::Viewport;
    ///
    /// assert_eq!(Viewport { width: 1200, height: 800 }.output_size(), Some((1200, 800)));
    /// assert_eq!(Viewport { width: 0, height: 800 }.output_size(), None);
    /// assert_eq!(Viewport { width: -5, height: 800 }.output_size(), None);
    /// ```
    pub fn output_size(&self) -> Option<(u32, u32)> {
        let width = u32::try_from(self.width).ok().filter(|width| *width > 0)?;
        let height = u32::try_from(self.height).ok().filter(|height| *height > 0)?;
        Some((width, height))
    }
}

/// One decode-and-draw job for the raster surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub generation: u64,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Tracks which render generation is current.
///
/// Every issued request and every invalidation moves to a new generation, so a
/// completion carrying an older generation is known to be superseded.
#[derive(Debug, Default)]
pub struct RenderTracker {
    latest: u64,
}

impl RenderTracker {
    /// Starts a new generation and returns a request for it when `viewport` is drawable.
    pub fn issue(&mut self, path: &Path, viewport: Viewport) -> Option<RenderRequest> {
        self.invalidate();
        let (width, height) = viewport.output_size()?;
        Some(RenderRequest {
            generation: self.latest,
            path: path.to_path_buf(),
            width,
            height,
        })
    }

    /// Supersedes every request issued so far.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{RenderTracker, Viewport};

    #[test]
    fn later_request_supersedes_earlier_one() {
        let mut tracker = RenderTracker::default();
        let viewport = Viewport {
            width: 10,
            height: 10,
        };

        let first = tracker
            .issue(Path::new("a.png"), viewport)
            .expect("drawable viewport");
        let second = tracker
            .issue(Path::new("a.png"), viewport)
            .expect("drawable viewport");

        assert!(!tracker.is_current(first.generation));
        assert!(tracker.is_current(second.generation));
    }

    #[test]
    fn undrawable_viewport_still_supersedes_in_flight_requests() {
        let mut tracker = RenderTracker::default();
        let in_flight = tracker
            .issue(
                Path::new("a.png"),
                Viewport {
                    width: 10,
                    height: 10,
                },
            )
            .expect("drawable viewport");

        let request = tracker.issue(
            Path::new("a.png"),
            Viewport {
                width: 10,
                height: 0,
            },
        );

        assert!(request.is_none());
        assert!(!tracker.is_current(in_flight.generation));
    }

    #[test]
    fn oversized_dimensions_are_not_drawable() {
        let viewport = Viewport {
            width: i64::from(u32::MAX) + 1,
            height: 10,
        };

        assert_eq!(viewport.output_size(), None);
    }
}
