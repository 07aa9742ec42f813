//! Append-only record log.

use std::{io, path::Path};

use tokio::{
    fs::{File, OpenOptions},
    io::AsyncWriteExt,
};

/// Record log file. Created if absent, never truncated.
#[derive(Debug)]
pub struct RecordLog {
    file: File,
}

impl RecordLog {
    /// Open `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the file cannot be created or opened.
    pub async fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path).await?;
        tracing::debug!(path = %path.display(), "record log open");
        Ok(Self { file })
    }

    /// Append one formatted line and flush it.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the write fails.
    pub async fn append(&mut self, line: &[u8]) -> io::Result<()> {
        self.file.write_all(line).await?;
        self.file.flush().await
    }
}
