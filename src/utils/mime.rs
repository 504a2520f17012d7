//! MIME type detection for uploaded images.
//!
//! Object store uploads carry a `Content-Type` derived from the filename
//! extension through a fixed table.

use std::path::Path;

/// MIME type constants for the image formats the table recognizes.
pub mod types {
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const SVG: &str = "image/svg+xml";
    pub const BMP: &str = "image/bmp";
    pub const ICO: &str = "image/x-icon";

    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Extension assumed when a filename carries none.
pub const DEFAULT_EXTENSION: &str = "png";

/// Guess MIME type from a filename or URL.
///
/// Query string and fragment are ignored. A name without an extension is
/// treated as PNG; an unknown extension maps to `application/octet-stream`.
pub fn from_filename(name: &str) -> &'static str {
    let base = name.split(['?', '#']).next().unwrap_or(name);
    let ext = Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    from_extension(ext.as_deref().or(Some(DEFAULT_EXTENSION)))
}

/// Guess MIME type from a lowercase file extension string.
pub fn from_extension(ext: Option<&str>) -> &'static str {
    match ext {
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("gif") => types::GIF,
        Some("webp") => types::WEBP,
        Some("svg") => types::SVG,
        Some("bmp") => types::BMP,
        Some("ico") => types::ICO,
        _ => types::OCTET_STREAM,
    }
}
