//! ZIP archive parsing and extraction.
//!
//! - [`structures`]: records of the ZIP format (EOCD, ZIP64 EOCD, entries)
//! - [`parser`]: reads those records through a [`ReadAt`](crate::io::ReadAt) source
//! - [`extractor`]: decompresses entries and writes them below a destination
//!
//! Supported: standard and ZIP64 archives, STORED and DEFLATE entries.
//! Not supported: encryption, multi-disk archives, other compression methods.
//! Entry names are resolved relative to the destination and may not escape it.

mod extractor;
mod parser;
mod sanitize;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use sanitize::entry_relative_path;
pub use structures::*;
