//! Files handed to the uploader.

use std::path::Path;

use super::errors::ClientError;

/// Extensions the verification service accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "tif", "tiff", "webp", "gif", "bmp",
];

/// A local file ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Build from in-memory bytes. The MIME type is guessed from the name.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Read a file from disk, refusing unsupported types before touching it.
    pub async fn read(path: &Path) -> Result<Self, ClientError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        check_extension(&name)?;
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(name, bytes))
    }

    /// Lowercased extension, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }

    /// Is this an image (vs. a PDF document)?
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Reject names whose extension is not in [`ACCEPTED_EXTENSIONS`].
pub fn check_extension(name: &str) -> Result<(), ClientError> {
    match extension_of(name) {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        other => Err(ClientError::UnsupportedFileType {
            extension: other.map(|e| format!(".{e}")).unwrap_or_default(),
            allowed: ACCEPTED_EXTENSIONS
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
