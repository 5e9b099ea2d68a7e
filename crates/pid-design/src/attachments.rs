//! Special-instruction attachments: files and voice notes sent inline.

use crate::DesignError;
use base64::Engine as _;
use pid_core::project::AttachedFile;
use std::path::Path;

pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Largest payload sent inline with a request.
pub const MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

/// MIME type from the file extension.
pub fn guess_mime(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html" | "htm") => "text/html",
        Some("json") => "application/json",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("webm") => "audio/webm",
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        _ => DEFAULT_MIME,
    }
}

/// Wrap raw bytes. An empty `mime_type` falls back to `DEFAULT_MIME`.
pub fn attach_bytes(name: impl Into<String>, mime_type: &str, bytes: &[u8]) -> AttachedFile {
    let mime_type = match mime_type.trim() {
        "" => DEFAULT_MIME,
        mime => mime,
    };
    AttachedFile {
        name: name.into(),
        mime_type: mime_type.to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
    }
}

/// Read a file from disk, guessing its MIME type from the extension.
pub fn attach_file(path: impl AsRef<Path>) -> Result<AttachedFile, DesignError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| DesignError::Attachment {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.len() > MAX_INLINE_BYTES {
        return Err(DesignError::AttachmentTooLarge {
            path: path.to_path_buf(),
            size: bytes.len(),
        });
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    log::debug!("attached {name} ({} bytes)", bytes.len());
    Ok(attach_bytes(name.clone(), guess_mime(&name), &bytes))
}

/// Strip a `data:<mime>;base64,` prefix, as produced by browser file readers.
pub fn from_data_url(name: impl Into<String>, url: &str) -> Option<AttachedFile> {
    let rest = url.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    Some(AttachedFile {
        name: name.into(),
        mime_type: if mime.is_empty() { DEFAULT_MIME } else { mime }.to_string(),
        data: data.to_string(),
    })
}
