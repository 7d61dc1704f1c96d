//! Checks an image before it is sent to the prediction endpoint.

use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a file")]
    NotAFile { path: PathBuf },
    #[error("file too large: {size} bytes, max {max} MB", max = MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge { size: u64 },
    #[error("unsupported file type for {path}; please use JPG or PNG")]
    UnsupportedType { path: PathBuf },
}

/// A validated image, ready for a multipart upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Accepts JPEG and PNG files up to [`MAX_UPLOAD_BYTES`]. The format is
/// sniffed from the file contents, not the extension.
pub fn validate_image(path: impl AsRef<Path>) -> Result<ImageUpload, UploadError> {
    let path = path.as_ref();
    let io_err = |source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let meta = fs::metadata(path).map_err(io_err)?;
    if !meta.is_file() {
        return Err(UploadError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    if meta.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size: meta.len() });
    }

    let bytes = fs::read(path).map_err(io_err)?;
    let format = match image::guess_format(&bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
        _ => {
            return Err(UploadError::UnsupportedType {
                path: path.to_path_buf(),
            });
        }
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(ImageUpload {
        file_name,
        format,
        bytes,
    })
}
