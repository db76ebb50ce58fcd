//! Datasets the tool knows about and the resolved run configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokio::fs;

use crate::error::{ExtractError, Result};

/// Datasets whose shards are distributed as directories of ZIP archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Cglm,
    Cloc,
    ImageNet2K,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Cglm, Dataset::Cloc, Dataset::ImageNet2K];

    /// Directory name used under the source root
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Cglm => "CGLM",
            Dataset::Cloc => "CLOC",
            Dataset::ImageNet2K => "ImageNet2K",
        }
    }

    /// Where this dataset's archives live: `<src_root>/<name>/data`
    pub fn archive_dir(&self, src_root: &Path) -> PathBuf {
        src_root.join(self.name()).join("data")
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        Dataset::ALL
            .into_iter()
            .find(|dataset| dataset.name() == s)
            .ok_or_else(|| ExtractError::UnknownDataset {
                name: s.to_string(),
                expected: Dataset::ALL.map(|d| d.name()).join(", "),
            })
    }
}

/// Fully resolved input of one extraction run
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub dataset: Dataset,
    pub source_dir: PathBuf,
    pub output_root: PathBuf,
}

impl ExtractConfig {
    pub fn new(dataset: Dataset, src_root: &Path, output_root: &Path) -> Self {
        Self {
            dataset,
            source_dir: dataset.archive_dir(src_root),
            output_root: output_root.to_path_buf(),
        }
    }

    /// Confirm the dataset's `data` directory exists before any work starts
    pub async fn check_layout(&self) -> Result<()> {
        match fs::metadata(&self.source_dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(ExtractError::MissingDataDir {
                dataset: self.dataset.name(),
                path: self.source_dir.clone(),
            }),
        }
    }
}
