use anyhow::Result;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::PhotosConfig;

/// Manages the photo directory: game photos and player portraits, all
/// stored as JPEG regardless of the source format.
pub struct PhotoStore {
    dir: PathBuf,
    quality: u8,
}

impl PhotoStore {
    pub fn new(config: &PhotosConfig) -> Self {
        Self {
            dir: config.path.clone(),
            quality: config.jpeg_quality,
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Store one game photo under a fresh name carrying its position.
    /// Returns the stored filename, or None if the source could not be
    /// read or encoded.
    pub fn store_photo(&self, source: &Path, index: usize) -> Option<String> {
        let filename = format!("{}_{}.jpg", Uuid::new_v4(), index);
        self.store(source, &filename)
    }

    /// Store a player portrait under a fresh name. Replacing a portrait
    /// means removing the old file and storing a new one.
    pub fn store_portrait(&self, source: &Path) -> Option<String> {
        let filename = format!("player_{}.jpg", Uuid::new_v4());
        self.store(source, &filename)
    }

    fn store(&self, source: &Path, filename: &str) -> Option<String> {
        match self.write_jpeg(source, filename) {
            Ok(()) => Some(filename.to_string()),
            Err(e) => {
                warn!("Failed to store photo from {}: {}", source.display(), e);
                None
            }
        }
    }

    fn write_jpeg(&self, source: &Path, filename: &str) -> Result<()> {
        self.ensure_dir()?;
        let img = image::open(source)?;
        // JPEG has no alpha channel.
        let rgb = img.to_rgb8();
        let file = fs::File::create(self.path_for(filename))?;
        let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), self.quality);
        rgb.write_with_encoder(encoder)?;
        Ok(())
    }

    /// Load a stored photo. A missing or unreadable file yields the
    /// placeholder instead of an error.
    pub fn load(&self, filename: &str) -> DynamicImage {
        match image::open(self.path_for(filename)) {
            Ok(img) => img,
            Err(e) => {
                debug!("Photo {} not loadable ({}), using placeholder", filename, e);
                Self::placeholder()
            }
        }
    }

    /// Flat gray stand-in shown where a photo should be.
    pub fn placeholder() -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(64, 64, image::Rgb([200, 200, 200])))
    }

    /// Best effort: a filename that is already gone is not an error.
    pub fn remove(&self, filename: &str) {
        if let Err(e) = fs::remove_file(self.path_for(filename)) {
            debug!("Could not remove photo {}: {}", filename, e);
        }
    }

    /// Delete every stored photo. Leaves non-JPEG files in the directory
    /// alone. Returns how many files were removed.
    pub fn clear(&self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_jpg = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("jpg"))
                .unwrap_or(false);
            if is_jpg && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn store_in(dir: &Path) -> PhotoStore {
        PhotoStore::new(&PhotosConfig {
            path: dir.join("photos"),
            jpeg_quality: 70,
        })
    }

    fn sample_png(dir: &Path) -> PathBuf {
        let path = dir.join("source.png");
        let img = image::RgbaImage::from_pixel(10, 8, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_store_photo_reencodes_as_jpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        let source = sample_png(tmp.path());

        let filename = store.store_photo(&source, 0).unwrap();
        assert!(filename.ends_with("_0.jpg"));
        assert!(store.path_for(&filename).exists());

        let loaded = store.load(&filename);
        assert_eq!(loaded.dimensions(), (10, 8));
    }

    #[test]
    fn test_stored_names_are_unique() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        let source = sample_png(tmp.path());

        let first = store.store_photo(&source, 0).unwrap();
        let second = store.store_photo(&source, 0).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_store_portrait_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        let source = sample_png(tmp.path());

        let filename = store.store_portrait(&source).unwrap();
        assert!(filename.starts_with("player_"));
        assert!(filename.ends_with(".jpg"));
        assert!(store.path_for(&filename).exists());
    }

    #[test]
    fn test_store_missing_source_returns_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());

        let result = store.store_photo(tmp.path().join("nope.png").as_path(), 0);
        assert!(result.is_none());
    }

    #[test]
    fn test_load_missing_yields_placeholder() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());

        let img = store.load("missing.jpg");
        assert_eq!(img.dimensions(), PhotoStore::placeholder().dimensions());
    }

    #[test]
    fn test_remove_is_best_effort() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        let source = sample_png(tmp.path());
        let filename = store.store_photo(&source, 0).unwrap();

        store.remove("never-existed.jpg");
        store.remove(&filename);
        assert!(!store.path_for(&filename).exists());
    }

    #[test]
    fn test_clear_removes_only_jpegs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        let source = sample_png(tmp.path());
        store.store_photo(&source, 0).unwrap();
        store.store_photo(&source, 1).unwrap();
        fs::write(store.dir().join("notes.txt"), "keep me").unwrap();

        let removed = store.clear().unwrap();
        assert_eq!(removed, 2);
        assert!(store.dir().join("notes.txt").exists());
    }

    #[test]
    fn test_clear_on_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        assert_eq!(store.clear().unwrap(), 0);
    }
}
