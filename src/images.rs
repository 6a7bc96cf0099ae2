//! Filesystem image store.
//!
//! Uploads are written as `<upload_dir>/<uuid>.<ext>`. Reads decode the stored
//! file, resize it to a square and always answer with JPEG bytes. Decoding and
//! encoding are CPU bound and run on the blocking pool.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ImagesConfig;
use crate::error::{AppError, AppResult};

#[cfg(feature = "heic")]
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "heif"];
#[cfg(feature = "heic")]
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/heic", "image/heif"];

// Without a HEIF decoder such uploads could be stored but never rendered
#[cfg(not(feature = "heic"))]
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
#[cfg(not(feature = "heic"))]
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_upload_bytes: usize,
    max_resolution: u32,
}

/// Metadata of a stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub id: Uuid,
    pub size: usize,
    pub extension: String,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_upload_bytes: usize, max_resolution: u32) -> Self {
        Self { dir: dir.into(), max_upload_bytes, max_resolution }
    }

    pub fn from_config(cfg: &ImagesConfig) -> Self {
        Self::new(&cfg.upload_dir, cfg.max_upload_bytes, cfg.max_resolution)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Validates the client supplied name and content type of an upload and
    /// returns the lower-cased extension to store it under.
    pub fn check_upload(file_name: Option<&str>, content_type: Option<&str>) -> AppResult<String> {
        if let Some(ct) = content_type {
            let ct = ct.to_ascii_lowercase();
            if !ALLOWED_CONTENT_TYPES.contains(&ct.as_str()) {
                return Err(AppError::UnsupportedMediaType(format!("content type '{}' is not allowed", ct)));
            }
        }
        let ext = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| AppError::UnsupportedMediaType("file name has no extension".to_string()))?;
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::UnsupportedMediaType(format!("extension '{}' is not allowed", ext)));
        }
        Ok(ext)
    }

    /// Writes the upload under a fresh id.
    pub async fn save(&self, extension: &str, bytes: &[u8]) -> AppResult<StoredImage> {
        if bytes.len() > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "image is {} bytes, limit is {}",
                bytes.len(),
                self.max_upload_bytes
            )));
        }
        if bytes.is_empty() {
            return Err(AppError::BadRequest("image is empty".to_string()));
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let id = Uuid::new_v4();
        let path = self.dir.join(format!("{}.{}", id, extension));
        tokio::fs::write(&path, bytes).await?;
        debug!(image_id = %id, size = bytes.len(), "image stored");
        Ok(StoredImage { id, size: bytes.len(), extension: extension.to_string() })
    }

    /// Finds the stored file of `id` under any allowed extension.
    pub async fn locate(&self, id: Uuid) -> AppResult<Option<PathBuf>> {
        for ext in ALLOWED_EXTENSIONS {
            for candidate in [ext.to_string(), ext.to_ascii_uppercase()] {
                let path = self.dir.join(format!("{}.{}", id, candidate));
                if tokio::fs::try_exists(&path).await? {
                    return Ok(Some(path));
                }
            }
        }
        Ok(None)
    }

    /// Decodes the stored image, resizes it to `resolution`×`resolution` and
    /// encodes the result as JPEG.
    pub async fn render(&self, id: Uuid, resolution: u32) -> AppResult<Vec<u8>> {
        if resolution == 0 || resolution > self.max_resolution {
            return Err(AppError::ValidationError {
                field: "resolution".to_string(),
                message: format!("must be between 1 and {}", self.max_resolution),
            });
        }
        let path = self.locate(id).await?.ok_or_else(|| AppError::NotFound("image not found".to_string()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let bytes = tokio::fs::read(&path).await?;

        tokio::task::spawn_blocking(move || {
            let img = decode(&ext, &bytes)?;
            encode_square_jpeg(&img, resolution)
        })
        .await
        .map_err(|e| anyhow::anyhow!("image task failed: {}", e))?
    }

    /// Removes the stored file. Returns `false` if nothing was stored under `id`.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        match self.locate(id).await? {
            Some(path) => {
                tokio::fs::remove_file(&path).await?;
                debug!(image_id = %id, "image deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Cleanup after an entity dropped its image reference. Never fails.
    pub async fn remove_quietly(&self, id: Uuid) {
        match self.delete(id).await {
            Ok(true) => {}
            Ok(false) => warn!(image_id = %id, "referenced image was already gone"),
            Err(e) => warn!(image_id = %id, "failed to remove image: {}", e),
        }
    }
}

fn decode(ext: &str, bytes: &[u8]) -> AppResult<DynamicImage> {
    match ext {
        #[cfg(feature = "heic")]
        "heic" | "heif" => decode_heif(bytes),
        _ => image::load_from_memory(bytes)
            .map_err(|e| AppError::UnsupportedMediaType(format!("stored image cannot be decoded: {}", e))),
    }
}

fn encode_square_jpeg(img: &DynamicImage, resolution: u32) -> AppResult<Vec<u8>> {
    let resized = img.resize_exact(resolution, resolution, FilterType::Lanczos3);
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut out = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
        .map_err(|e| anyhow::anyhow!("jpeg encoding failed: {}", e))?;
    Ok(out)
}

#[cfg(feature = "heic")]
fn decode_heif(bytes: &[u8]) -> AppResult<DynamicImage> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let heif_err = |e: libheif_rs::HeifError| AppError::UnsupportedMediaType(format!("heif decoding failed: {}", e));
    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes).map_err(heif_err)?;
    let handle = ctx.primary_image_handle().map_err(heif_err)?;
    let decoded = lib.decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None).map_err(heif_err)?;
    let plane = decoded
        .planes()
        .interleaved
        .ok_or_else(|| AppError::UnsupportedMediaType("heif image has no interleaved plane".to_string()))?;

    let (width, height) = (plane.width, plane.height);
    let row_len = width as usize * 3;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }
    image::RgbImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| AppError::UnsupportedMediaType("heif image has an unexpected layout".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(w, h, |x, y| Rgba([(x % 255) as u8, (y % 255) as u8, 128, 200]));
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
        out
    }

    fn store(dir: &Path) -> ImageStore {
        ImageStore::new(dir, 1024 * 1024, 512)
    }

    #[test]
    fn upload_allow_list() {
        assert_eq!(ImageStore::check_upload(Some("me.JPG"), Some("image/jpeg")).unwrap(), "jpg");
        #[cfg(feature = "heic")]
        assert_eq!(ImageStore::check_upload(Some("scan.heic"), None).unwrap(), "heic");
        #[cfg(not(feature = "heic"))]
        assert!(matches!(
            ImageStore::check_upload(Some("scan.heic"), Some("image/heic")),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            ImageStore::check_upload(Some("doc.pdf"), Some("image/png")),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            ImageStore::check_upload(Some("pic.png"), Some("application/pdf")),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(ImageStore::check_upload(Some("noext"), Some("image/png")).is_err());
        assert!(ImageStore::check_upload(None, Some("image/png")).is_err());
    }

    #[tokio::test]
    async fn png_is_served_as_square_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let saved = store.save("png", &png_bytes(40, 20)).await.unwrap();
        assert!(dir.path().join(format!("{}.png", saved.id)).exists());

        let jpeg = store.render(saved.id, 16).await.unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[tokio::test]
    async fn upper_case_extension_is_located() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let id = Uuid::new_v4();
        std::fs::write(dir.path().join(format!("{}.PNG", id)), png_bytes(8, 8)).unwrap();
        assert!(store.locate(id).await.unwrap().is_some());
        assert!(!store.render(id, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolution_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let saved = store.save("png", &png_bytes(4, 4)).await.unwrap();
        assert!(matches!(store.render(saved.id, 0).await, Err(AppError::ValidationError { .. })));
        assert!(matches!(store.render(saved.id, 513).await, Err(AppError::ValidationError { .. })));
        assert!(store.render(saved.id, 512).await.is_ok());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 10, 64);
        assert!(matches!(store.save("png", &[0u8; 11]).await, Err(AppError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn delete_reports_absence() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let saved = store.save("png", &png_bytes(4, 4)).await.unwrap();
        assert!(store.delete(saved.id).await.unwrap());
        assert!(!store.delete(saved.id).await.unwrap());
        assert!(matches!(store.render(saved.id, 4).await, Err(AppError::NotFound(_))));
        store.remove_quietly(saved.id).await;
    }
}
