use std::path::{Path, PathBuf};

use crate::error::TaskFailure;

/// One archive and the directory it extracts into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTask {
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
}

impl ArchiveTask {
    /// Bind an archive to `<output_root>/<file stem>`.
    ///
    /// Only the last extension is stripped, so `shard.v2.zip` maps to `shard.v2`.
    pub fn new(source_path: PathBuf, output_root: &Path) -> Self {
        let stem = source_path.file_stem().unwrap_or(source_path.as_os_str());
        let output_dir = output_root.join(stem);
        Self {
            source_path,
            output_dir,
        }
    }
}

/// Result of one finished task, consumed by the engine's aggregation
pub type ExtractionResult = std::result::Result<(), TaskFailure>;
