//! Storage of uploaded media on the local filesystem.
//!
//! Uploads are written under a generated name (a random token plus the
//! original extension) so that the client-supplied filename never becomes
//! part of a path. Images additionally get their pixel dimensions recorded
//! and a small thumbnail written next to them. Everything here is
//! synchronous; [`MediaStore::store`] and [`MediaStore::remove_all`] move the
//! work onto tokio's blocking pool for callers running inside a runtime.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::FolioError;

/// Extensions accepted for upload, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Longest side of a generated thumbnail, in pixels.
pub const THUMBNAIL_MAX_SIDE: u32 = 200;

/// The public route under which stored files are served.
pub const UPLOAD_URL_PREFIX: &str = "/admin/uploads";

/// Prefix given to the stored name of a thumbnail.
const THUMBNAIL_PREFIX: &str = "thumb_";

/// What an upload is for. Only affects the generated filename, which makes
/// the upload directory easier to eyeball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    General,
    ProfileImage(u8),
    DesignWork,
}

impl UploadKind {
    fn filename_prefix(self) -> String {
        match self {
            UploadKind::General => String::new(),
            UploadKind::ProfileImage(slot) => format!("profile_{slot}_"),
            UploadKind::DesignWork => "design_".to_string(),
        }
    }
}

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub original_filename: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new<S: Into<String>>(original_filename: S, data: Vec<u8>) -> Self {
        Self {
            original_filename: original_filename.into(),
            data,
        }
    }

    /// The original filename without its directory or extension. Used as a
    /// default title for bulk uploads.
    pub fn stem(&self) -> String {
        Path::new(&self.original_filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.original_filename.clone())
    }

    /// Checks the upload is non-empty and has an allowed extension, returning
    /// the normalised (lower-case) extension.
    pub fn validate(&self) -> Result<String, FolioError> {
        let filename = self.original_filename.trim();
        if filename.is_empty() || self.data.is_empty() {
            return Err(FolioError::EmptyUpload);
        }

        let ext = match filename.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return Err(FolioError::UnsupportedType(filename.to_string())),
        };

        if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(FolioError::UnsupportedType(ext))
        }
    }
}

/// Everything learned about a file once it has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMedia {
    pub filename: String,
    #[serde(rename = "url")]
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub file_type: String,
    pub file_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

impl StoredMedia {
    /// The URLs of every file backing this media item.
    pub fn urls(&self) -> Vec<String> {
        let mut urls = vec![self.file_url.clone()];
        urls.extend(self.thumbnail_url.clone());
        urls
    }
}

/// Writes uploads into, and removes them from, a single directory.
#[derive(Debug, Clone)]
pub struct MediaStore {
    upload_dir: PathBuf,
}

impl MediaStore {
    pub fn new<P: Into<PathBuf>>(upload_dir: P) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Returns the public URL for a stored filename.
    pub fn url_for(filename: &str) -> String {
        format!("{UPLOAD_URL_PREFIX}/{filename}")
    }

    /// Maps a bare stored filename to its path in the upload directory.
    /// Anything that could escape the directory gives `None`.
    pub fn path_for_filename(&self, filename: &str) -> Option<PathBuf> {
        if is_plain_file_name(filename) {
            Some(self.upload_dir.join(filename))
        } else {
            None
        }
    }

    /// Maps a public URL produced by [`MediaStore::url_for`] back to a path.
    pub fn path_for_url(&self, file_url: &str) -> Option<PathBuf> {
        let filename = file_url
            .strip_prefix(UPLOAD_URL_PREFIX)?
            .strip_prefix('/')?;
        self.path_for_filename(filename)
    }

    /// The URL a thumbnail for `file_url` would have been given. Whether it
    /// was actually written is not checked.
    pub fn thumbnail_url_for(file_url: &str) -> Option<String> {
        let filename = file_url.strip_prefix(UPLOAD_URL_PREFIX)?.strip_prefix('/')?;
        if filename.starts_with(THUMBNAIL_PREFIX) || !is_plain_file_name(filename) {
            return None;
        }
        Some(Self::url_for(&format!("{THUMBNAIL_PREFIX}{filename}")))
    }

    /// Validates and persists an upload, then derives its image metadata.
    pub fn ingest(&self, upload: &Upload, kind: UploadKind) -> Result<StoredMedia, FolioError> {
        let ext = upload.validate()?;

        std::fs::create_dir_all(&self.upload_dir)?;

        let filename = format!("{}{}.{ext}", kind.filename_prefix(), Uuid::new_v4().simple());
        let path = self.upload_dir.join(&filename);

        // create_new: a generated name must never clobber an existing file.
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(&upload.data)?;
        file.sync_all()?;
        drop(file);

        let file_size = i64::try_from(std::fs::metadata(&path)?.len())
            .map_err(|e| FolioError::Io(std::io::Error::other(e)))?;

        let mut stored = StoredMedia {
            file_url: Self::url_for(&filename),
            filename,
            thumbnail_url: None,
            file_type: ext.clone(),
            file_size,
            width: None,
            height: None,
        };

        match image::load_from_memory(&upload.data) {
            Ok(img) => {
                stored.width = i32::try_from(img.width()).ok();
                stored.height = i32::try_from(img.height()).ok();

                let thumb_name = format!("{THUMBNAIL_PREFIX}{}", stored.filename);
                let thumb_path = self.upload_dir.join(&thumb_name);
                match write_thumbnail(&img, &thumb_path, &ext) {
                    Ok(()) => stored.thumbnail_url = Some(Self::url_for(&thumb_name)),
                    Err(err) => {
                        warn!("Could not create thumbnail for {}: {err}", stored.filename);
                        let _ = std::fs::remove_file(&thumb_path);
                    }
                }
            }
            Err(err) => {
                debug!("{} is not a decodable image: {err}", stored.filename);
            }
        }

        info!(
            "Stored upload {:?} as {} ({} bytes, {:?}x{:?})",
            upload.original_filename, stored.filename, stored.file_size, stored.width, stored.height
        );

        Ok(stored)
    }

    /// Runs [`MediaStore::ingest`] on the blocking thread pool.
    pub async fn store(&self, upload: Upload, kind: UploadKind) -> Result<StoredMedia, FolioError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.ingest(&upload, kind))
            .await
            .map_err(|e| FolioError::Io(std::io::Error::other(e)))?
    }

    /// Best-effort removal of the file behind `file_url`. Failures are
    /// logged and otherwise ignored.
    pub fn remove(&self, file_url: &str) {
        let Some(path) = self.path_for_url(file_url) else {
            warn!("Refusing to remove {file_url:?}, it is not a stored upload");
            return;
        };

        match std::fs::remove_file(&path) {
            Ok(()) => debug!("Removed {path:?}"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("{path:?} was already gone")
            }
            Err(err) => warn!("Could not remove {path:?}: {err}"),
        }
    }

    /// Removes every URL in `file_urls` on the blocking thread pool.
    pub async fn remove_all(&self, file_urls: Vec<String>) {
        if file_urls.is_empty() {
            return;
        }

        let store = self.clone();
        let result = tokio::task::spawn_blocking(move || {
            for url in &file_urls {
                store.remove(url);
            }
        })
        .await;

        if let Err(err) = result {
            warn!("File removal task failed: {err}");
        }
    }
}

/// Writes a copy of `img` no larger than [`THUMBNAIL_MAX_SIDE`] on either
/// side. Images that already fit are copied rather than enlarged.
fn write_thumbnail(img: &DynamicImage, thumb_path: &Path, ext: &str) -> Result<(), image::ImageError> {
    let thumb = if img.width() <= THUMBNAIL_MAX_SIDE && img.height() <= THUMBNAIL_MAX_SIDE {
        img.clone()
    } else {
        img.thumbnail(THUMBNAIL_MAX_SIDE, THUMBNAIL_MAX_SIDE)
    };

    // JPEG has no alpha channel and GIF wants RGBA.
    let thumb = match ext {
        "jpg" | "jpeg" => DynamicImage::ImageRgb8(thumb.to_rgb8()),
        "gif" => DynamicImage::ImageRgba8(thumb.to_rgba8()),
        _ => thumb,
    };

    thumb.save(thumb_path)
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn file_count(dir: &Path) -> usize {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    #[test]
    fn ingest_png_records_size_and_dimensions() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path().join("uploads"));

        let upload = Upload::new("Logo Final.PNG", png_bytes(300, 150));
        let stored = store.ingest(&upload, UploadKind::DesignWork).unwrap();

        assert!(stored.filename.starts_with("design_"));
        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.file_type, "png");
        assert_eq!(stored.width, Some(300));
        assert_eq!(stored.height, Some(150));

        let path = store.path_for_url(&stored.file_url).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as i64, stored.file_size);

        let thumb_url = stored.thumbnail_url.clone().unwrap();
        let thumb = image::open(store.path_for_url(&thumb_url).unwrap()).unwrap();
        assert_eq!(thumb.width(), 200);
        assert_eq!(thumb.height(), 100);
    }

    #[test]
    fn small_images_are_not_enlarged() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path());

        let stored = store
            .ingest(&Upload::new("icon.png", png_bytes(40, 20)), UploadKind::General)
            .unwrap();

        let thumb = image::open(store.path_for_url(&stored.thumbnail_url.unwrap()).unwrap()).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (40, 20));
    }

    #[test]
    fn jpeg_thumbnail_is_written() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path());

        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 400, image::Rgb([1, 2, 3])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();

        let stored = store
            .ingest(&Upload::new("photo.jpeg", buf.into_inner()), UploadKind::ProfileImage(2))
            .unwrap();

        assert!(stored.filename.starts_with("profile_2_"));
        assert_eq!(stored.width, Some(400));
        assert!(stored.thumbnail_url.is_some());
    }

    #[test]
    fn undecodable_file_is_still_stored() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path());

        let upload = Upload::new("broken.png", b"definitely not a png".to_vec());
        let stored = store.ingest(&upload, UploadKind::DesignWork).unwrap();

        assert_eq!(stored.thumbnail_url, None);
        assert_eq!(stored.width, None);
        assert_eq!(stored.height, None);
        assert_eq!(stored.file_size, 20);
        assert!(store.path_for_url(&stored.file_url).unwrap().exists());
        assert_eq!(file_count(temp_dir.path()), 1);
    }

    #[test]
    fn disallowed_extension_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let upload_dir = temp_dir.path().join("uploads");
        let store = MediaStore::new(&upload_dir);

        for name in ["script.exe", "notes.txt", "archive.png.zip", "noextension"] {
            let result = store.ingest(&Upload::new(name, vec![1, 2, 3]), UploadKind::General);
            assert!(matches!(result, Err(FolioError::UnsupportedType(_))), "{name}");
        }

        assert!(!upload_dir.exists());
    }

    #[test]
    fn empty_uploads_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path());

        let no_name = store.ingest(&Upload::new("", png_bytes(2, 2)), UploadKind::General);
        assert!(matches!(no_name, Err(FolioError::EmptyUpload)));

        let no_data = store.ingest(&Upload::new("a.png", Vec::new()), UploadKind::General);
        assert!(matches!(no_data, Err(FolioError::EmptyUpload)));

        assert_eq!(file_count(temp_dir.path()), 0);
    }

    #[test]
    fn generated_names_are_unique() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path());
        let upload = Upload::new("same.gif", b"GIF89a-but-not-really".to_vec());

        let a = store.ingest(&upload, UploadKind::General).unwrap();
        let b = store.ingest(&upload, UploadKind::General).unwrap();

        assert_ne!(a.filename, b.filename);
        assert!(!a.filename.contains("same"));
    }

    #[test]
    fn remove_deletes_file_and_ignores_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path());

        let stored = store
            .ingest(&Upload::new("a.png", png_bytes(10, 10)), UploadKind::General)
            .unwrap();
        for url in stored.urls() {
            store.remove(&url);
        }
        assert_eq!(file_count(temp_dir.path()), 0);

        // Second removal is a no-op rather than a panic or error.
        store.remove(&stored.file_url);
    }

    #[test]
    fn urls_outside_the_upload_dir_are_not_mapped() {
        let store = MediaStore::new("/srv/uploads");

        assert_eq!(
            store.path_for_url("/admin/uploads/abc.png"),
            Some(PathBuf::from("/srv/uploads/abc.png"))
        );
        assert_eq!(store.path_for_url("/admin/uploads/../secret"), None);
        assert_eq!(store.path_for_url("/admin/uploads/a/b.png"), None);
        assert_eq!(store.path_for_url("/etc/passwd"), None);
        assert_eq!(store.path_for_url("/admin/uploads/"), None);
    }

    #[test]
    fn thumbnail_url_follows_naming_convention() {
        assert_eq!(
            MediaStore::thumbnail_url_for("/admin/uploads/profile_1_abc.png").as_deref(),
            Some("/admin/uploads/thumb_profile_1_abc.png")
        );
        assert_eq!(MediaStore::thumbnail_url_for("/admin/uploads/thumb_abc.png"), None);
        assert_eq!(MediaStore::thumbnail_url_for("https://example.com/me.png"), None);
    }

    #[test]
    fn stem_strips_extension() {
        assert_eq!(Upload::new("Brand Sheet.final.png", vec![1]).stem(), "Brand Sheet.final");
        assert_eq!(Upload::new("logo.webp", vec![1]).stem(), "logo");
    }

    #[tokio::test]
    async fn store_runs_off_the_async_thread() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path());

        let stored = store
            .store(Upload::new("a.png", png_bytes(5, 5)), UploadKind::General)
            .await
            .unwrap();
        assert_eq!(stored.width, Some(5));

        store.remove_all(stored.urls()).await;
        assert_eq!(file_count(temp_dir.path()), 0);
    }
}
