use std::fs::{read_dir, File};
use std::path::{Path, PathBuf};

use crate::defs::{IntoResult, Result};

pub fn open_file<P: AsRef<Path>>(path: P) -> Result<File> {
    let path = path.as_ref();
    File::open(path)
        .res(|| format!("failed to open file '{}'", path.display()))
}

pub fn create_file<P: AsRef<Path>>(path: P) -> Result<File> {
    let path = path.as_ref();
    File::create(path)
        .res(|| format!("failed to create file '{}'", path.display()))
}

// Lexicographic order, directories skipped.
pub fn read_dir_sorted<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let describe = || format!("failed to read directory '{}'", path.display());

    let mut paths = Vec::new();
    for entry in read_dir(path).res(describe)? {
        let entry_path = entry.res(describe)?.path();
        if entry_path.is_file() {
            paths.push(entry_path);
        }
    }

    paths.sort();
    Ok(paths)
}
