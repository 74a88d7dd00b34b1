use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Opaque reference to a loaded media file.
///
/// Locators are handed out by [`LocatorRegistry::acquire`] and stop resolving
/// once released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceLocator(u64);

impl Display for ResourceLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "media://{}", self.0)
    }
}

/// Registry of live resource locators.
///
/// # Example
/// ```
/// use std::path::Path;
///
/// use engine::LocatorRegistry;
///
/// let mut registry = LocatorRegistry::default();
/// let locator = registry.acquire(Path::new("clip.mp4"));
/// assert_eq!(registry.resolve(locator), Some(Path::new("clip.mp4")));
///
/// assert!(registry.release(locator));
/// assert_eq!(registry.resolve(locator), None);
/// ```
#[derive(Debug, Default)]
pub struct LocatorRegistry {
    next_id: u64,
    live: HashMap<ResourceLocator, PathBuf>,
}

impl LocatorRegistry {
    /// Registers `path` and returns a fresh locator for it.
    pub fn acquire(&mut self, path: &Path) -> ResourceLocator {
        self.next_id += 1;
        let locator = ResourceLocator(self.next_id);
        self.live.insert(locator, path.to_path_buf());
        locator
    }

    /// Returns the path behind a live locator.
    pub fn resolve(&self, locator: ResourceLocator) -> Option<&Path> {
        self.live.get(&locator).map(PathBuf::as_path)
    }

    /// Releases a locator. Returns false when it was not live.
    pub fn release(&mut self, locator: ResourceLocator) -> bool {
        self.live.remove(&locator).is_some()
    }

    /// Number of locators not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
