//! A session owns the food log and is the only thing allowed to grow it. Every saved photo goes
//! through [Session::record], which keeps the partitioned photo store, the in-memory [Log] and the
//! persisted log file in step.

pub mod log;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::{
    storage::{
        entities::LogEntry,
        image_store::{decode_rgb, ImageStorage},
        log_file::LogStorage,
    },
    utils::clock::Clock,
    views::analysis::{count_labels, FoodCounts},
};

pub use log::Log;

pub struct Session<L: LogStorage, I: ImageStorage> {
    log: Log,
    log_storage: L,
    image_storage: I,
    clock: Box<dyn Clock>,
}

impl<L: LogStorage, I: ImageStorage> Session<L, I> {
    /// Starts with an empty log. The first save overwrites whatever the log file contained.
    pub fn new(log_storage: L, image_storage: I, clock: Box<dyn Clock>) -> Self {
        Self {
            log: Log::default(),
            log_storage,
            image_storage,
            clock,
        }
    }

    /// Starts with the entries that are already persisted.
    pub async fn resume(log_storage: L, image_storage: I, clock: Box<dyn Clock>) -> Result<Self> {
        let entries = log_storage.load().await?;
        debug!("Resuming session with {} entries", entries.len());
        Ok(Self {
            log: Log::from_entries(entries),
            log_storage,
            image_storage,
            clock,
        })
    }

    pub fn log(&self) -> &Log {
        &self.log
    }

    /// Moment used for new entries and for resolving relative dates.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Counts are derived from the log every time, so they can't drift away from it.
    pub fn food_counts(&self) -> FoodCounts {
        count_labels(self.log.entries())
    }

    /// Saves a photo under `label` and logs it.
    ///
    /// Returns `Ok(None)` without touching anything when the label is empty or there is no photo.
    /// A photo that can't be decoded, or can't be written, leaves the log unchanged. If only the
    /// log file rewrite fails, the entry stays in memory and is persisted by the next successful
    /// save.
    #[instrument(skip(self, image_bytes))]
    pub async fn record(
        &mut self,
        image_bytes: Option<&[u8]>,
        label: &str,
    ) -> Result<Option<LogEntry>> {
        let Some(image_bytes) = image_bytes else {
            debug!("No photo supplied, skipping");
            return Ok(None);
        };
        if label.is_empty() {
            debug!("No label supplied, skipping");
            return Ok(None);
        }

        let image = decode_rgb(image_bytes)?;
        let filename = self.image_storage.save(label, &image).await?;

        let entry = LogEntry::captured_at(self.clock.time(), Arc::from(label), filename);
        self.log.append(entry.clone());

        if let Err(e) = self.log_storage.overwrite(self.log.entries()).await {
            warn!("Log file is behind the session by at least one entry: {e:?}");
            return Err(e);
        }

        info!("Saved {} as {}", entry.label, entry.filename);
        Ok(Some(entry))
    }
}
