use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{PennyError, Result};
use crate::models::Expense;

/// Receipts are stored inline in the expense blob, so keep them bounded.
pub const MAX_RECEIPT_BYTES: u64 = 5 * 1024 * 1024;

fn content_type(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "pdf" => Ok("application/pdf"),
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(PennyError::Receipt(format!(
            "unsupported file type: {} (use an image or PDF)",
            path.display()
        ))),
    }
}

fn extension(mime: &str) -> &'static str {
    match mime {
        "application/pdf" => "pdf",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Read an image or PDF from disk into a `data:` URL.
pub fn attach(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PennyError::Receipt(format!("file not found: {}", path.display())));
    }
    let mime = content_type(path)?;
    let size = std::fs::metadata(path)?.len();
    if size > MAX_RECEIPT_BYTES {
        return Err(PennyError::Receipt(format!(
            "{} is {}, receipts are limited to {}",
            path.display(),
            crate::fmt::format_bytes(size),
            crate::fmt::format_bytes(MAX_RECEIPT_BYTES)
        )));
    }
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), mime, size, "read receipt");
    Ok(encode(mime, &bytes))
}

pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a `data:` URL into its MIME type and decoded bytes.
pub fn decode(data_url: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| PennyError::Receipt("not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PennyError::Receipt("data URL has no payload".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| PennyError::Receipt("only base64 data URLs are supported".into()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| PennyError::Receipt(format!("corrupt receipt payload: {e}")))?;
    Ok((mime.to_string(), bytes))
}

/// "receipt-<id>.<ext>"
pub fn file_name(id: i64, mime: &str) -> String {
    format!("receipt-{id}.{}", extension(mime))
}

/// Write an expense's receipt to `output` (a file, or a directory to place
/// `receipt-<id>.<ext>` in), defaulting to `default_dir`.
pub fn save(expense: &Expense, output: Option<&Path>, default_dir: &Path) -> Result<PathBuf> {
    let data_url = expense
        .receipt
        .as_deref()
        .ok_or(PennyError::NoReceipt(expense.id))?;
    let (mime, bytes) = decode(data_url)?;
    let path = match output {
        Some(p) if p.is_dir() => p.join(file_name(expense.id, &mime)),
        Some(p) => p.to_path_buf(),
        None => default_dir.join(file_name(expense.id, &mime)),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    Ok(path)
}
