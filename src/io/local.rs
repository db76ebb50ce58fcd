use super::ReadAt;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

/// Archive on the local filesystem, read with positional I/O.
///
/// Reads run on tokio's blocking pool so extraction never stalls the
/// async workers.
pub struct LocalFileReader {
    file: Arc<File>,
    path: PathBuf,
    size: u64,
}

impl LocalFileReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let size = file.metadata()?.len();
        Ok(Self {
            file: Arc::new(file),
            path: path.to_path_buf(),
            size,
        })
    }
}

#[cfg(unix)]
fn pread(file: &File, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn pread(file: &File, mut offset: u64, mut buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset)? {
            0 => return Err(std::io::ErrorKind::UnexpectedEof.into()),
            n => {
                buf = &mut std::mem::take(&mut buf)[n..];
                offset += n as u64;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        if offset.saturating_add(buf.len() as u64) > self.size {
            bail!(
                "read of {} bytes at offset {} past end of {} ({} bytes)",
                buf.len(),
                offset,
                self.path.display(),
                self.size
            );
        }

        let file = Arc::clone(&self.file);
        let len = buf.len();
        let data = task::spawn_blocking(move || {
            let mut data = vec![0u8; len];
            pread(&file, offset, &mut data).map(|()| data)
        })
        .await
        .context("read task failed")?
        .with_context(|| format!("read failed in {}", self.path.display()))?;

        buf.copy_from_slice(&data);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}
