//! Parallel extraction of many archives into isolated output directories.
//!
//! Every archive becomes one task on a tokio [`JoinSet`]. A [`Semaphore`]
//! sized to the number of CPUs bounds how many tasks extract at once. The
//! engine drains completions one by one, so progress reports are
//! serialized even though extraction is not. A failing task never stops
//! its siblings; failures are collected and returned together once every
//! task has finished.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{ExtractError, Result, TaskFailure};
use crate::io::LocalFileReader;
use crate::locator::locate_archives;
use crate::progress::{NoProgress, ProgressCounter, ProgressReporter};
use crate::task::{ArchiveTask, ExtractionResult};
use crate::zip::ZipExtractor;

/// Totals of a run in which every archive extracted cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub archives: usize,
    pub files: usize,
}

pub struct ExtractionEngine {
    output_root: PathBuf,
    workers: usize,
    reporter: Arc<dyn ProgressReporter>,
}

impl ExtractionEngine {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            workers: num_cpus::get().max(1),
            reporter: Arc::new(NoProgress),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Size of the worker pool
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Locate the archives in `source_dir` and extract them all.
    ///
    /// A missing source directory fails before the output root is created.
    pub async fn extract_directory(&self, source_dir: &Path) -> Result<ExtractionSummary> {
        let archives = locate_archives(source_dir).await?;
        info!(
            source = %source_dir.display(),
            archives = archives.len(),
            "located archives"
        );
        self.run(archives).await
    }

    /// Extract each archive into `<output root>/<archive stem>`.
    ///
    /// Two archives with the same stem would share an output directory, so
    /// such input is rejected before anything is created.
    pub async fn run(&self, archives: Vec<PathBuf>) -> Result<ExtractionSummary> {
        let tasks = self.plan(archives)?;

        fs::create_dir_all(&self.output_root)
            .await
            .map_err(|source| ExtractError::OutputRoot {
                path: self.output_root.clone(),
                source,
            })?;

        let total = tasks.len();
        info!(
            output = %self.output_root.display(),
            archives = total,
            workers = self.workers,
            "extracting archives"
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(total);

        for task in tasks {
            let archive = task.source_path.clone();
            let semaphore = Arc::clone(&semaphore);

            let handle = set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (
                        Err(TaskFailure {
                            archive: task.source_path,
                            source: anyhow!("worker pool shut down"),
                        }),
                        0,
                    );
                };
                run_task(task).await
            });
            in_flight.insert(handle.id(), archive);
        }

        let counter = ProgressCounter::new();
        let mut failures = Vec::new();
        let mut files = 0;

        while let Some(joined) = set.join_next_with_id().await {
            let outcome = match joined {
                Ok((id, (outcome, written))) => {
                    in_flight.remove(&id);
                    files += written;
                    outcome
                }
                Err(join_error) => Err(TaskFailure {
                    archive: in_flight.remove(&join_error.id()).unwrap_or_default(),
                    source: anyhow!("extraction task aborted: {}", join_error),
                }),
            };

            let completed = counter.increment();
            self.reporter.report(completed, total);

            if let Err(failure) = outcome {
                warn!(
                    archive = %failure.archive.display(),
                    error = %format!("{:#}", failure.source),
                    "archive failed"
                );
                failures.push(failure);
            }
        }

        if !failures.is_empty() {
            return Err(ExtractError::Aggregate { failures, total });
        }

        info!(archives = total, files, "extraction complete");
        Ok(ExtractionSummary {
            archives: total,
            files,
        })
    }

    fn plan(&self, archives: Vec<PathBuf>) -> Result<Vec<ArchiveTask>> {
        let mut owners: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(archives.len());
        let mut tasks = Vec::with_capacity(archives.len());

        for source_path in archives {
            let task = ArchiveTask::new(source_path, &self.output_root);
            if let Some(first) = owners.insert(task.output_dir.clone(), task.source_path.clone()) {
                return Err(ExtractError::DuplicateOutput {
                    output_dir: task.output_dir,
                    first,
                    second: task.source_path,
                });
            }
            tasks.push(task);
        }

        Ok(tasks)
    }
}

/// Run one task, returning its outcome and the number of files it wrote
async fn run_task(task: ArchiveTask) -> (ExtractionResult, usize) {
    debug!(archive = %task.source_path.display(), "extracting");

    match extract_archive(&task).await {
        Ok(written) => {
            debug!(
                archive = %task.source_path.display(),
                files = written,
                "extracted"
            );
            (Ok(()), written)
        }
        Err(source) => (
            Err(TaskFailure {
                archive: task.source_path,
                source,
            }),
            0,
        ),
    }
}

async fn extract_archive(task: &ArchiveTask) -> anyhow::Result<usize> {
    fs::create_dir_all(&task.output_dir)
        .await
        .with_context(|| format!("cannot create {}", task.output_dir.display()))?;

    let reader = Arc::new(LocalFileReader::open(&task.source_path)?);
    ZipExtractor::new(reader).extract_all(&task.output_dir).await
}
