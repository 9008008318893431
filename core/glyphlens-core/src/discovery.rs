//! Locating font files on disk (made by FontLab https://www.fontlab.com/)
//!
//! Roots may be font files or directories. Directories are walked
//! recursively; hidden subdirectories (`.git`, fontconfig caches and the
//! like) are not entered. The result is a sorted set of locations, so a file
//! reachable through several roots is reported once.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::{DirEntry, WalkDir};

/// Extensions of the sfnt containers a variant can be loaded from, lowercase.
pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc", "otc"];

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("font root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),
    #[error("walking {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A font file worth opening.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontLocation {
    pub path: PathBuf,
}

pub trait FontDiscovery {
    fn discover(&self) -> Result<Vec<FontLocation>>;
}

/// Font files named directly or found below directory roots.
#[derive(Debug, Clone)]
pub struct PathDiscovery {
    roots: Vec<PathBuf>,
    follow_symlinks: bool,
}

impl PathDiscovery {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            follow_symlinks: false,
        }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    fn scan_root(&self, root: &Path, into: &mut BTreeSet<PathBuf>) -> Result<(), DiscoveryError> {
        if root.is_file() {
            // An explicit file is loaded whatever its extension.
            into.insert(root.to_path_buf());
            return Ok(());
        }
        if !root.exists() {
            return Err(DiscoveryError::MissingRoot(root.to_path_buf()));
        }

        let walker = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry));
        for entry in walker {
            let entry = entry.map_err(|source| DiscoveryError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file() && has_font_extension(entry.path()) {
                into.insert(entry.into_path());
            }
        }
        Ok(())
    }
}

impl FontDiscovery for PathDiscovery {
    fn discover(&self) -> Result<Vec<FontLocation>> {
        let mut paths = BTreeSet::new();
        for root in &self.roots {
            self.scan_root(root, &mut paths)?;
        }
        log::debug!(
            "{} font file(s) under {} root(s)",
            paths.len(),
            self.roots.len()
        );
        Ok(paths.into_iter().map(|path| FontLocation { path }).collect())
    }
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FONT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}
