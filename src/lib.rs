//! # fanzip
//!
//! Extracts every ZIP archive of a directory in parallel, each into its own
//! folder named after the archive.
//!
//! The pipeline has two stages:
//!
//! - [`locate_archives`] lists the `.zip` files directly inside a source directory
//! - [`ExtractionEngine`] extracts them on a bounded pool of tokio tasks, reports
//!   each completion to a [`ProgressReporter`], and returns every failure once all
//!   archives have been processed
//!
//! ZIP decoding is done by the in-crate `zip` module (STORED and DEFLATE,
//! ZIP64, zip-slip protected).
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use fanzip::ExtractionEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = ExtractionEngine::new("/mnt/out").with_reporter(Arc::new(
//!         |done: usize, total: usize| eprintln!("{done}/{total}"),
//!     ));
//!     let summary = engine.extract_directory(Path::new("/mnt/raw/CLOC/data")).await?;
//!     println!("{} archives, {} files", summary.archives, summary.files);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod locator;
pub mod progress;
pub mod task;
pub mod zip;

pub use cli::Cli;
pub use config::{Dataset, ExtractConfig};
pub use engine::{ExtractionEngine, ExtractionSummary};
pub use error::{ExtractError, Result, TaskFailure};
pub use io::{LocalFileReader, ReadAt};
pub use locator::locate_archives;
pub use progress::{ArchiveProgressBar, NoProgress, ProgressCounter, ProgressReporter};
pub use task::{ArchiveTask, ExtractionResult};
pub use self::zip::{ZipExtractor, ZipFileEntry};
