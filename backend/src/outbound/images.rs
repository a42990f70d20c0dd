//! Image intake adapter.
//!
//! Uploads are validated (extension allow-list, size limit), decoded,
//! converted to 3-channel RGB, re-encoded as JPEG, and stored under a fresh
//! UUID file name. Rejections happen before anything touches disk, and the
//! generated names never contain the comma used to join image lists on
//! restaurant rows.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use uuid::Uuid;

use crate::domain::ports::{ImageIntakeError, ImageStore, ImageUpload, StoredImage};

/// Maximum accepted upload size (5 MiB), checked against the declared
/// content length before any conversion is attempted.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Decode/encode attempts before the upload is rejected.
const CONVERT_ATTEMPTS: usize = 3;

/// Stores normalised JPEGs in a single flat directory.
#[derive(Debug, Clone)]
pub struct JpegImageStore {
    dir: PathBuf,
}

impl JpegImageStore {
    /// Point the store at an image directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the image directory when absent.
    pub fn bootstrap(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// The directory stored images are served from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageStore for JpegImageStore {
    fn accept(&self, upload: &ImageUpload) -> Result<StoredImage, ImageIntakeError> {
        let extension = Path::new(&upload.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        if !extension
            .as_deref()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext))
        {
            return Err(ImageIntakeError::UnsupportedFormat);
        }

        if upload.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageIntakeError::TooLarge {
                limit_bytes: MAX_IMAGE_BYTES,
            });
        }

        let jpeg = convert_to_jpeg(&upload.bytes)?;
        let file_name = format!("{}.jpg", Uuid::new_v4());
        std::fs::write(self.dir.join(&file_name), jpeg).map_err(|err| ImageIntakeError::Io {
            message: err.to_string(),
        })?;
        Ok(StoredImage { file_name })
    }
}

fn convert_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, ImageIntakeError> {
    let mut last_error = String::new();
    for _ in 0..CONVERT_ATTEMPTS {
        match try_convert(bytes) {
            Ok(encoded) => return Ok(encoded),
            Err(err) => last_error = err.to_string(),
        }
    }
    Err(ImageIntakeError::Processing {
        message: last_error,
    })
}

fn try_convert(bytes: &[u8]) -> image::ImageResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Jpeg)?;
    Ok(out.into_inner())
}
