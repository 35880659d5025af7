//! Uploaded recipe images.
//!
//! An upload is accepted only if its bytes decode as an image. The stored
//! file name is a fresh UUID keeping the lowercased extension of the
//! uploaded file name, or the detected format's extension when the upload
//! carries none. The rest of the client-supplied name never reaches the
//! filesystem.

use std::path::Path;

use image::ImageFormat;
use uuid::Uuid;

use super::RecipeImagePath;

/// Directory, relative to the media root, holding recipe images.
pub const RECIPE_UPLOAD_DIR: &str = "uploads/recipe";

/// Reasons an upload is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageValidationError {
    /// The payload was empty.
    #[error("the submitted file is empty")]
    Empty,
    /// The payload is not a decodable image.
    #[error("upload a valid image")]
    NotAnImage,
}

/// Image bytes that have been decoded successfully.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    extension: String,
}

/// Lowercased extension of an uploaded file name, if it has a usable one.
fn upload_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| ext.to_ascii_lowercase())
}

impl ValidatedImage {
    /// Decode `bytes` to prove they form a well-formed image.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ImageValidationError> {
        Self::from_upload(bytes, None)
    }

    /// Decode `bytes` and keep the extension of the client's `file_name`.
    ///
    /// Falls back to the detected format when the name is absent or has no
    /// alphanumeric extension.
    pub fn from_upload(
        bytes: Vec<u8>,
        file_name: Option<&str>,
    ) -> Result<Self, ImageValidationError> {
        if bytes.is_empty() {
            return Err(ImageValidationError::Empty);
        }
        let format = image::guess_format(&bytes).map_err(|_| ImageValidationError::NotAnImage)?;
        image::load_from_memory_with_format(&bytes, format)
            .map_err(|_| ImageValidationError::NotAnImage)?;
        let extension = file_name.and_then(upload_extension).unwrap_or_else(|| {
            format
                .extensions_str()
                .first()
                .copied()
                .unwrap_or("img")
                .to_owned()
        });
        Ok(Self {
            bytes,
            format,
            extension,
        })
    }

    /// Raw file content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Extension the stored file will carry.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Fresh storage path `uploads/recipe/<uuid>.<ext>`.
    pub fn new_storage_path(&self) -> RecipeImagePath {
        RecipeImagePath::from_stored(format!(
            "{RECIPE_UPLOAD_DIR}/{}.{}",
            Uuid::new_v4(),
            self.extension()
        ))
    }
}

impl std::fmt::Debug for ValidatedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedImage")
            .field("format", &self.format)
            .field("extension", &self.extension)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Tiny encoded images for tests.
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    /// A 10x10 red PNG.
    pub(crate) fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)
            .expect("encode png fixture");
        out.into_inner()
    }

    /// A 10x10 blue JPEG.
    pub(crate) fn jpeg_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg)
            .expect("encode jpeg fixture");
        out.into_inner()
    }
}
