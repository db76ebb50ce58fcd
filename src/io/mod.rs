mod local;

pub use local::LocalFileReader;

use anyhow::Result;
use async_trait::async_trait;

/// Random access reads from an archive source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Fails if the source ends before the buffer is full.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Total size of the source in bytes
    fn size(&self) -> u64;
}
