use std::{future::Future, io::ErrorKind, ops::Deref, path::PathBuf};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use super::entities::LogEntry;

/// Spreadsheet applications only detect UTF-8 when the file starts with a signature.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADER: [&str; 4] = ["date", "weekday", "label", "filename"];

/// Interface for abstracting persistence of the food log.
pub trait LogStorage {
    /// Reads every entry of the persisted log in the order they were saved.
    fn load(&self) -> impl Future<Output = Result<Vec<LogEntry>>>;

    /// Replaces the persisted log with `entries`. The whole file is rewritten each time.
    fn overwrite(&self, entries: &[LogEntry]) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> LogStorage for T
where
    T::Target: LogStorage,
{
    fn load(&self) -> impl Future<Output = Result<Vec<LogEntry>>> {
        self.deref().load()
    }

    fn overwrite(&self, entries: &[LogEntry]) -> impl Future<Output = Result<()>> {
        self.deref().overwrite(entries)
    }
}

/// The main realization of [LogStorage]. Stores the log as a comma separated file with a header.
pub struct CsvLogStorage {
    path: PathBuf,
}

impl CsvLogStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl LogStorage for CsvLogStorage {
    async fn load(&self) -> Result<Vec<LogEntry>> {
        debug!("Loading log {:?}", self.path);
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e).with_context(|| format!("Failed to open {:?}", self.path)),
        };

        file.lock_shared()?;
        let mut content = Vec::new();
        let read = file.read_to_end(&mut content).await;
        file.unlock_async().await?;
        read.with_context(|| format!("Failed to read {:?}", self.path))?;

        Ok(decode_entries(&content))
    }

    async fn overwrite(&self, entries: &[LogEntry]) -> Result<()> {
        let buffer = encode_entries(entries)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {:?}", self.path))?;

        // Truncation happens under the lock so a concurrent reader never sees a half written file.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.rewind().await?;
            file.write_all(&buffer).await?;
            file.flush().await?;
            Ok::<_, std::io::Error>(())
        }
        .await;
        file.unlock_async().await?;
        result.with_context(|| format!("Failed to write {:?}", self.path))?;

        debug!("Rewrote {:?} with {} entries", self.path, entries.len());
        Ok(())
    }
}

fn encode_entries(entries: &[LogEntry]) -> Result<Vec<u8>> {
    let mut buffer = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buffer);
        writer.write_record(HEADER)?;
        for entry in entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

fn decode_entries(content: &[u8]) -> Vec<LogEntry> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut reader = csv::Reader::from_reader(content);
    let mut entries = vec![];
    for row in reader.deserialize::<LogEntry>() {
        match row {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                // A row edited by hand shouldn't make the whole log unreadable
                warn!("Skipping illegal log row: {e}")
            }
        }
    }
    entries
}
