use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single archive's extraction
#[derive(Debug)]
pub struct TaskFailure {
    pub archive: PathBuf,
    pub source: anyhow::Error,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.archive.display(), self.source)
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("source directory not found or unreadable: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown dataset '{name}' (expected one of: {expected})")]
    UnknownDataset { name: String, expected: String },

    #[error(
        "no data directory for dataset {dataset} at {} (expected <src-directory>/{dataset}/data)",
        .path.display()
    )]
    MissingDataDir { dataset: &'static str, path: PathBuf },

    #[error("cannot create output directory {}", .path.display())]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{} and {} would both extract into {}",
        .first.display(),
        .second.display(),
        .output_dir.display()
    )]
    DuplicateOutput {
        output_dir: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{} of {total} archives failed, first: {}", .failures.len(), first_failure(.failures))]
    Aggregate {
        failures: Vec<TaskFailure>,
        total: usize,
    },
}

fn first_failure(failures: &[TaskFailure]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

impl ExtractError {
    /// Failed tasks in completion order, empty for the other kinds
    pub fn failures(&self) -> &[TaskFailure] {
        match self {
            ExtractError::Aggregate { failures, .. } => failures,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
