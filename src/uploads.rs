//! Uploads - Lettura e validazione dei file caricati via multipart

use crate::core::AppError;
use axum::extract::Multipart;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};
use uuid::Uuid;

/// Dimensione massima di un file caricato (10 MB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Limite del body sulle route di upload: poco sopra il limite del file,
/// così i file troppo grandi arrivano alla validazione con un messaggio chiaro
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
];

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("no file was provided in the 'file' field")]
    MissingFile,
    #[error("the uploaded file is empty")]
    Empty,
    #[error("file exceeds the 10MB limit ({0} bytes)")]
    TooLarge(usize),
    #[error("unsupported file type '{0}', allowed: PDF, JPEG, PNG, WEBP, GIF")]
    UnsupportedType(String),
    #[error("file content does not match its declared type '{0}'")]
    ContentMismatch(String),
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Estrae il campo `file` dal body multipart (gli altri campi vengono ignorati)
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_ascii_lowercase();
        let bytes = field.bytes().await?.to_vec();
        return Ok(UploadedFile {
            file_name,
            mime_type,
            bytes,
        });
    }
    Err(UploadError::MissingFile.into())
}

/// Controlla dimensione, tipo dichiarato e firma del contenuto
pub fn validate_upload(file: &UploadedFile) -> Result<(), UploadError> {
    if file.bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        warn!(size = file.bytes.len(), "Upload rejected: too large");
        return Err(UploadError::TooLarge(file.bytes.len()));
    }
    // "image/jpg" non è standard ma alcuni browser lo inviano
    let declared = match file.mime_type.as_str() {
        "image/jpg" => "image/jpeg",
        other => other,
    };
    if !ALLOWED_MIME_TYPES.contains(&declared) {
        warn!(mime = %file.mime_type, "Upload rejected: unsupported type");
        return Err(UploadError::UnsupportedType(file.mime_type.clone()));
    }
    if sniff_mime(&file.bytes) != Some(declared) {
        warn!(mime = %file.mime_type, "Upload rejected: content mismatch");
        return Err(UploadError::ContentMismatch(file.mime_type.clone()));
    }
    Ok(())
}

/// Riconosce il tipo dai magic bytes
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [b'%', b'P', b'D', b'F', b'-', ..] => Some("application/pdf"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

impl UploadedFile {
    /// Tipo MIME normalizzato (image/jpg -> image/jpeg)
    pub fn normalized_mime(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpg" => "image/jpeg",
            other => other,
        }
    }

    /// `data:<mime>;base64,<contenuto>` per i messaggi multimodali
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.normalized_mime(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Path dell'oggetto nel bucket: `<user>/<kind>/<uuid>-<nome ripulito>`
pub fn storage_path(user_id: &Uuid, kind: &str, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_matches('.');
    let safe = if safe.is_empty() { "upload" } else { safe };
    format!("{}/{}/{}-{}", user_id, kind, Uuid::new_v4(), safe)
}
