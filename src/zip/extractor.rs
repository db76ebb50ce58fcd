use flate2::read::DeflateDecoder;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::task;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};

use super::parser::ZipParser;
use super::sanitize::entry_relative_path;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Extracts the entries of one ZIP archive
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all entries in the archive
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser.list_files().await
    }

    /// Read and decompress an entry into memory.
    ///
    /// Sizes from the central directory are untrusted: the stored data must
    /// lie inside the archive and inflation stops one byte past the
    /// declared size.
    pub async fn extract_to_memory(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.is_encrypted() {
            bail!("{} is encrypted", entry.file_name);
        }

        let data_offset = self.parser.get_data_offset(entry).await?;
        let archive_size = self.parser.reader().size();
        if data_offset
            .checked_add(entry.compressed_size)
            .is_none_or(|end| end > archive_size)
        {
            bail!(
                "{} claims {} bytes of data at offset {}, past the end of the archive ({} bytes)",
                entry.file_name,
                entry.compressed_size,
                data_offset,
                archive_size
            );
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser.reader().read_at(data_offset, &mut raw).await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => {
                let expected = entry.uncompressed_size;
                task::spawn_blocking(move || inflate(&raw, expected))
                    .await
                    .context("inflate task failed")?
                    .with_context(|| format!("corrupt deflate stream in {}", entry.file_name))?
            }
            CompressionMethod::Unknown(method) => bail!(
                "Unsupported compression method {} for {} (only STORED and DEFLATE are supported)",
                method,
                entry.file_name
            ),
        };

        if data.len() as u64 != entry.uncompressed_size {
            bail!(
                "{} holds {} bytes, expected {}",
                entry.file_name,
                data.len(),
                entry.uncompressed_size
            );
        }
        Ok(data)
    }

    /// Extract an entry to `output_path`, replacing any existing file
    pub async fn extract_to_file(&self, entry: &ZipFileEntry, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let data = self.extract_to_memory(entry).await?;

        let mut file = fs::File::create(output_path)
            .await
            .with_context(|| format!("cannot create {}", output_path.display()))?;
        file.write_all(&data).await?;
        file.flush().await?;

        Ok(())
    }

    /// Extract every entry under `dest`, keeping the archive's relative paths.
    ///
    /// Returns the number of files written.
    pub async fn extract_all(&self, dest: &Path) -> Result<usize> {
        let entries = self.list_files().await?;
        let mut written = 0;

        for entry in &entries {
            let target = dest.join(entry_relative_path(&entry.file_name)?);
            if entry.is_directory {
                fs::create_dir_all(&target)
                    .await
                    .with_context(|| format!("cannot create {}", target.display()))?;
            } else {
                self.extract_to_file(entry, &target).await?;
                written += 1;
            }
        }

        Ok(written)
    }
}

/// Deflate cannot expand data by more than this factor
const MAX_DEFLATE_RATIO: u64 = 1032;

/// Inflate `raw`, reading at most one byte more than `expected`
fn inflate(raw: &[u8], expected: u64) -> std::io::Result<Vec<u8>> {
    let capacity = expected.min((raw.len() as u64).saturating_mul(MAX_DEFLATE_RATIO));
    let mut data = Vec::with_capacity(capacity as usize);
    DeflateDecoder::new(raw)
        .take(expected.saturating_add(1))
        .read_to_end(&mut data)?;
    Ok(data)
}
