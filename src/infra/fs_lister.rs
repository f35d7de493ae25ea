// ============================================================
// Layer 6 — Filesystem Directory Lister
// ============================================================
// The production implementation of the DirectoryLister trait:
// returns the immediate subdirectories of a scan root, sorted
// by name so repeated runs visit directories in the same order.
//
// Recording sessions are organised as dated subfolders under a
// track folder (e.g. 170609_data/JungleTrack/<date>/), so one
// level of listing per scan root is all the discovery the
// training driver needs. Tests use a stub lister instead.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::traits::DirectoryLister;

pub struct FsDirectoryLister;

impl DirectoryLister for FsDirectoryLister {
    fn subdirectories(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();

        for entry in fs::read_dir(root)
            .with_context(|| format!("Cannot read scan root '{}'", root.display()))?
        {
            let entry = entry?;
            let path  = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }

        dirs.sort();
        Ok(dirs)
    }
}
