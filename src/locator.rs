use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{ExtractError, Result};

/// Extension of the files picked up by [`locate_archives`]
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// List the ZIP archives directly inside `source_dir`.
///
/// The scan is not recursive. Only regular files (or links to them) whose
/// name ends in `.zip` are returned, sorted by path. A missing or
/// unreadable directory is [`ExtractError::NotFound`]; a directory with no
/// archives yields an empty list.
pub async fn locate_archives(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let not_found = |source: std::io::Error| ExtractError::NotFound {
        path: source_dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(source_dir).await.map_err(not_found)?;
    let mut archives = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(not_found)? {
        let name = entry.file_name();
        if !name.to_string_lossy().ends_with(ARCHIVE_EXTENSION) {
            continue;
        }

        let path = entry.path();
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => archives.push(path),
            Ok(_) => debug!(path = %path.display(), "skipping non-file archive name"),
            Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable entry"),
        }
    }

    archives.sort();
    Ok(archives)
}
