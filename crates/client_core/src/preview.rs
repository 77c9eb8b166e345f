//! Local file selection and preview decoding. No network access happens here.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::domain::SourceImage;

use crate::error::PreviewError;

/// A file the user picked, already checked to be an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    image: SourceImage,
}

impl SelectedFile {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, PreviewError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| PreviewError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Self::from_bytes(file_name, bytes)
    }

    /// MIME type is guessed from the file name extension.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, PreviewError> {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(PreviewError::NotAnImage {
                file_name,
                mime_type: mime.essence_str().to_string(),
            });
        }
        Ok(Self {
            image: SourceImage::new(file_name, mime.essence_str(), bytes),
        })
    }

    pub fn into_image(self) -> SourceImage {
        self.image
    }
}

/// Displayable form of the selected image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub file_name: String,
    pub data_url: String,
}

impl PreviewImage {
    pub fn encode(image: &SourceImage) -> Self {
        Self {
            file_name: image.file_name.clone(),
            data_url: format!(
                "data:{};base64,{}",
                image.mime_type,
                STANDARD.encode(&image.bytes)
            ),
        }
    }
}

pub(crate) async fn decode_preview(image: SourceImage) -> Result<PreviewImage, PreviewError> {
    tokio::task::spawn_blocking(move || PreviewImage::encode(&image))
        .await
        .map_err(|e| PreviewError::Decode(e.to_string()))
}
