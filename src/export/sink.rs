//! Archive packing and file save primitives.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use log::info;

use crate::{Error, Result};

/// One named raster inside an archived export
#[derive(Debug, Clone, PartialEq)]
pub struct NamedBuffer {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Where a saved file ended up
#[derive(Debug, Clone, PartialEq)]
pub struct SavedFile {
    pub location: String,
    pub bytes: usize,
}

/// Packs named buffers into one archive, preserving entry order.
#[async_trait]
pub trait ArchiveWriter: Send + Sync {
    async fn pack(&self, entries: &[NamedBuffer]) -> Result<Vec<u8>>;
}

/// Persists one finished artifact.
#[async_trait]
pub trait SaveSink: Send + Sync {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<SavedFile>;
}

/// Zip archive with stored (uncompressed) entries; PNG data is already compressed.
#[cfg(feature = "archive")]
#[derive(Debug, Clone, Default)]
pub struct ZipArchiveWriter;

#[cfg(feature = "archive")]
#[async_trait]
impl ArchiveWriter for ZipArchiveWriter {
    async fn pack(&self, entries: &[NamedBuffer]) -> Result<Vec<u8>> {
        use std::io::{Cursor, Write};
        use zip::write::SimpleFileOptions;

        let fail = |e: &dyn std::fmt::Display| Error::ArchiveFailed(e.to_string());
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for entry in entries {
            zip.start_file(entry.name.clone(), options).map_err(|e| fail(&e))?;
            zip.write_all(&entry.bytes).map_err(|e| fail(&e))?;
        }
        let cursor = zip.finish().map_err(|e| fail(&e))?;
        Ok(cursor.into_inner())
    }
}

/// Writes artifacts into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SaveSink for DirectorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<SavedFile> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(Error::SaveFailed(format!("invalid file name '{}'", file_name)));
        }
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        info!("saved {} ({} bytes)", path.display(), bytes.len());
        Ok(SavedFile {
            location: path.display().to_string(),
            bytes: bytes.len(),
        })
    }
}

/// Keeps saved artifacts in memory; handy for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<NamedBuffer>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<NamedBuffer> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SaveSink for MemorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<SavedFile> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| Error::SaveFailed("memory sink lock poisoned".into()))?;
        saved.push(NamedBuffer {
            name: file_name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(SavedFile {
            location: format!("memory:{}", file_name),
            bytes: bytes.len(),
        })
    }
}
