//! Image fields are sent inline as base64 data URIs

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{RestError, RestResult};

/// Mime type of a PNG, JPEG or GIF, judged by its magic bytes
pub fn mime_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if data.starts_with(b"\xFF\xD8") && data.ends_with(b"\xFF\xD9") {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else {
        None
    }
}

/// `data:<mime>;base64,<payload>` for an image
pub fn data_uri(data: &[u8]) -> RestResult<String> {
    let mime = mime_type(data).ok_or_else(|| RestError::invalid("Unsupported image type"))?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(data)))
}
