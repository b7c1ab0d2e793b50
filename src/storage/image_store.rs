use std::{future::Future, io::Cursor, ops::Deref, path::PathBuf};

use anyhow::{bail, Context, Result};
use image::{ImageFormat, RgbImage};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

/// Decodes a photo from any format [image] can detect and drops the alpha channel.
pub fn decode_rgb(image_bytes: &[u8]) -> Result<RgbImage> {
    Ok(image::load_from_memory(image_bytes)?.to_rgb8())
}

/// Interface for abstracting where photos end up.
pub trait ImageStorage {
    /// Saves `image` into the partition of `label` and returns the generated file name.
    fn save(&self, label: &str, image: &RgbImage) -> impl Future<Output = Result<String>>;
}

impl<T: Deref> ImageStorage for T
where
    T::Target: ImageStorage,
{
    fn save(&self, label: &str, image: &RgbImage) -> impl Future<Output = Result<String>> {
        self.deref().save(label, image)
    }
}

/// The main realization of [ImageStorage]. Photos are stored as `<dataset>/<label>/<uuid>.jpg`.
pub struct DirectoryImageStorage {
    dataset_dir: PathBuf,
}

impl DirectoryImageStorage {
    pub fn new(dataset_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dataset_dir)?;

        Ok(Self { dataset_dir })
    }

    pub fn partition(&self, label: &str) -> Result<PathBuf> {
        check_partition_name(label)?;
        Ok(self.dataset_dir.join(label))
    }
}

impl ImageStorage for DirectoryImageStorage {
    async fn save(&self, label: &str, image: &RgbImage) -> Result<String> {
        let partition = self.partition(label)?;
        tokio::fs::create_dir_all(&partition)
            .await
            .with_context(|| format!("Failed to create partition {partition:?}"))?;

        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)?;

        let filename = format!("{}.jpg", Uuid::new_v4());
        let path = partition.join(&filename);
        debug!("Writing {} bytes into {path:?}", buffer.len());

        let mut file = File::options()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to create {path:?}"))?;
        file.write_all(&buffer)
            .await
            .with_context(|| format!("Failed to write {path:?}"))?;
        file.flush().await?;

        Ok(filename)
    }
}

/// Labels are free text, but each one has to name exactly one directory inside the dataset.
fn check_partition_name(label: &str) -> Result<()> {
    if label.is_empty() || label == "." || label == ".." || label.contains(['/', '\\']) {
        bail!("Label {label:?} can't be used as a directory name");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use anyhow::Result;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::tempdir;

    use super::{decode_rgb, DirectoryImageStorage, ImageStorage};

    fn png_bytes() -> Vec<u8> {
        let image = RgbaImage::from_pixel(4, 3, Rgba([200, 30, 30, 128]));
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_decode_drops_alpha() -> Result<()> {
        let image = decode_rgb(&png_bytes())?;
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 30, 30]));
        Ok(())
    }

    #[test]
    fn test_decode_corrupt() {
        let error = decode_rgb(b"definitely not a photo").unwrap_err();
        assert!(error.downcast_ref::<image::ImageError>().is_some());
    }

    #[tokio::test]
    async fn test_save_into_partition() -> Result<()> {
        let dir = tempdir()?;
        let storage = DirectoryImageStorage::new(dir.path().join("dataset"))?;
        let image = RgbImage::from_pixel(8, 8, Rgb([10, 200, 10]));

        let first = storage.save("kimchi", &image).await?;
        let second = storage.save("kimchi", &image).await?;
        assert_ne!(first, second);
        assert!(first.ends_with(".jpg"));

        let partition = dir.path().join("dataset").join("kimchi");
        assert_eq!(std::fs::read_dir(&partition)?.count(), 2);

        let stored = image::open(partition.join(&first))?;
        assert_eq!(stored.color(), image::ColorType::Rgb8);
        assert_eq!((stored.width(), stored.height()), (8, 8));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_rejects_escaping_labels() -> Result<()> {
        let dir = tempdir()?;
        let storage = DirectoryImageStorage::new(dir.path().join("dataset"))?;
        let image = RgbImage::new(1, 1);
        for label in ["..", ".", "a/b", "a\\b"] {
            assert!(storage.save(label, &image).await.is_err(), "{label}");
        }
        assert_eq!(std::fs::read_dir(dir.path().join("dataset"))?.count(), 0);
        Ok(())
    }
}
