// THEORY:
// The `FrameSequence` is the time axis of the analysis. It is resolved exactly once,
// when the builder is created: the directory is listed, non-files are dropped, the
// remaining names are sorted lexicographically and the caller's filter is applied.
// The result is stored as a plain value, so frame `i` means the same file for the
// whole lifetime of the builder no matter what happens to the directory afterwards.

use crate::error::{HeatmapError, HeatmapResult};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// An ordered, immutable snapshot of the frame files to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    directory: PathBuf,
    frames: Vec<PathBuf>,
}

impl FrameSequence {
    /// Lists the regular files directly inside `directory`, sorted by file name and
    /// kept only when `filter` accepts the file name.
    pub fn resolve<F>(directory: impl AsRef<Path>, filter: F) -> HeatmapResult<Self>
    where
        F: Fn(&str) -> bool,
    {
        let directory = directory.as_ref().to_path_buf();
        let mut names: Vec<OsString> = Vec::new();
        for entry in fs::read_dir(&directory)? {
            let entry = entry?;
            // Follows symlinks, like a plain `is_file` check on the joined path.
            if !entry.path().is_file() {
                continue;
            }
            names.push(entry.file_name());
        }
        // Byte order on the raw name, so non UTF-8 names keep a stable position.
        names.sort();

        let frames: Vec<PathBuf> = names
            .into_iter()
            .filter(|name| filter(&name.to_string_lossy()))
            .map(|name| directory.join(name))
            .collect();

        if frames.is_empty() {
            return Err(HeatmapError::EmptySequence(directory));
        }
        log::debug!("Resolved {} frames in {}", frames.len(), directory.display());
        Ok(Self { directory, frames })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The first frame. A resolved sequence is never empty.
    pub fn first(&self) -> &Path {
        &self.frames[0]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.frames
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.frames.iter().map(PathBuf::as_path)
    }
}
