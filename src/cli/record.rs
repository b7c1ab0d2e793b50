use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::FoodSession;

#[derive(Debug, Clone, clap::Args)]
pub struct RecordCommand {
    #[arg(short, long, help = "Name of the food, for example kimchi, apple or ramen")]
    label: Option<String>,
    #[arg(short, long, help = "Photo taken with a camera")]
    camera: Option<PathBuf>,
    #[arg(
        short,
        long,
        help = "Photo file to upload. Takes precedence over --camera when both are given"
    )]
    upload: Option<PathBuf>,
}

impl RecordCommand {
    /// An uploaded file wins over a camera capture.
    fn photo_path(&self) -> Option<&Path> {
        self.upload.as_deref().or(self.camera.as_deref())
    }
}

/// Command to process `record` command. Nothing is saved when either the label or the photo is
/// missing.
pub async fn process_record_command(session: &mut FoodSession, command: RecordCommand) -> Result<()> {
    let photo = match command.photo_path() {
        Some(path) => Some(
            tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read photo {path:?}"))?,
        ),
        None => None,
    };
    let label = command.label.as_deref().unwrap_or_default();

    let Some(entry) = session.record(photo.as_deref(), label).await? else {
        debug!("Nothing to record");
        return Ok(());
    };

    println!(
        "Saved '{}' photo. {} recorded in total",
        entry.label,
        session.food_counts().get(&entry.label)
    );
    Ok(())
}
