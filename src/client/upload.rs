use std::path::Path;

use crate::error::ValidationError;

/// A file the user picked or dropped, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Reads `path` from disk. Without `mime`, the type is guessed from the
    /// extension.
    pub fn from_path(path: &Path, mime: Option<&str>) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime.map(str::to_string).unwrap_or_else(|| guess_mime(path).to_string());
        Ok(Self { name, mime, bytes })
    }
}

/// Checks the declared type and size; `limit` is inclusive.
pub fn validate(file: &UploadFile, limit: u64) -> Result<(), ValidationError> {
    if !file.mime.starts_with("image/") {
        return Err(ValidationError::NotAnImage {
            mime: file.mime.clone(),
        });
    }
    if file.size() > limit {
        return Err(ValidationError::TooLarge {
            size: file.size(),
            limit,
        });
    }
    Ok(())
}

pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
