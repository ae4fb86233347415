//! Browser driver discovery and bootstrap patching
//!
//! Scripts normally bootstrap their browser driver with
//! `ChromeDriverManager().install()`, which downloads a driver on every run.
//! When a driver is already cached locally, that expression is replaced with
//! the cached executable's path. Lookup never fails a job: anything that goes
//! wrong is reported as [`DriverLookup::NotFound`].

use crate::literal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Expressions replaced by the discovered driver path
pub const BOOTSTRAP_EXPRESSIONS: [&str; 2] = [
    "ChromeDriverManager().install()",
    "ChromeDriverManager().install( )",
];

/// Layouts searched inside a version directory, in order
pub const CANDIDATE_LAYOUTS: [&str; 9] = [
    "chromedriver-win32/chromedriver.exe",
    "chromedriver-win64/chromedriver.exe",
    "chromedriver/chromedriver.exe",
    "chromedriver.exe",
    "chromedriver-linux64/chromedriver",
    "chromedriver-mac-arm64/chromedriver",
    "chromedriver-mac-x64/chromedriver",
    "chromedriver/chromedriver",
    "chromedriver",
];

/// Outcome of a driver lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverLookup {
    /// Path to a cached driver executable
    Found(PathBuf),
    /// No usable driver
    NotFound,
}

/// Locates a cached driver executable
pub trait DriverLocator: Send + Sync {
    /// Look for a driver. Must not fail; problems map to `NotFound`.
    fn locate(&self) -> DriverLookup;
}

/// Locator that never finds anything, disabling the patch step
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDriverLocator;

impl DriverLocator for NoDriverLocator {
    fn locate(&self) -> DriverLookup {
        DriverLookup::NotFound
    }
}

/// Searches a driver cache laid out as `<root>/<version>/<layout>`
#[derive(Debug, Clone)]
pub struct CachedDriverLocator {
    root: PathBuf,
}

impl CachedDriverLocator {
    /// Create a locator over `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root being searched
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn versions(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut versions: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        // Newest version first; names compare lexicographically
        versions.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        versions
    }
}

impl DriverLocator for CachedDriverLocator {
    fn locate(&self) -> DriverLookup {
        for version in self.versions() {
            for layout in CANDIDATE_LAYOUTS {
                let candidate = version.join(layout);
                if candidate.is_file() {
                    debug!("Found cached driver at {}", candidate.display());
                    return DriverLookup::Found(candidate);
                }
            }
        }
        DriverLookup::NotFound
    }
}

/// Replace every bootstrap expression with the found driver's path
///
/// `NotFound` returns the text unchanged.
pub fn patch_driver_bootstrap(text: &str, lookup: &DriverLookup) -> String {
    let DriverLookup::Found(path) = lookup else {
        return text.to_string();
    };

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.clone());
    let replacement = literal::quote(&absolute.to_string_lossy());

    let mut patched = text.to_string();
    for expression in BOOTSTRAP_EXPRESSIONS {
        patched = patched.replace(expression, &replacement);
    }
    if patched != text {
        info!("Patched driver bootstrap to {}", absolute.display());
    }
    patched
}
