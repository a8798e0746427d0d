//! Credit report file validation.

use std::fs;
use std::path::Path;

use crate::ai::Attachment;

use super::{DisputeError, DisputeResult};

/// Size cap for an uploaded report: 5 MiB.
pub const MAX_REPORT_BYTES: u64 = 5 * 1024 * 1024;

/// Length cap for the report's file name.
pub const MAX_REPORT_NAME_CHARS: usize = 100;

/// A validated credit report, ready to attach to a generation request.
#[derive(Debug, Clone)]
pub struct ReportFile {
    name: String,
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl ReportFile {
    /// Load and validate a report from disk.
    ///
    /// Accepts only `.txt` and `.pdf` files, at most
    /// [`MAX_REPORT_BYTES`] bytes, with a file name of at most
    /// [`MAX_REPORT_NAME_CHARS`] characters.
    pub fn load(path: &Path) -> DisputeResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Size is checked before reading so an oversized file is never
        // pulled into memory.
        let size = fs::metadata(path).map_err(|source| DisputeError::Read { source })?.len();
        if size > MAX_REPORT_BYTES {
            return Err(DisputeError::TooLarge { size, limit: MAX_REPORT_BYTES });
        }

        let bytes = fs::read(path).map_err(|source| DisputeError::Read { source })?;
        Self::from_bytes(&name, &bytes)
    }

    /// Validate an in-memory report.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> DisputeResult<Self> {
        let mime_type = mime_for_name(name)?;

        if name.chars().count() > MAX_REPORT_NAME_CHARS {
            return Err(DisputeError::NameTooLong {
                len: name.chars().count(),
                limit: MAX_REPORT_NAME_CHARS,
            });
        }

        let size = bytes.len() as u64;
        if size > MAX_REPORT_BYTES {
            return Err(DisputeError::TooLarge { size, limit: MAX_REPORT_BYTES });
        }

        Ok(Self { name: name.to_string(), mime_type, bytes: bytes.to_vec() })
    }

    /// The report's file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The detected MIME type.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Encode the report as a request attachment.
    pub fn attachment(&self) -> Attachment {
        Attachment::from_bytes(self.mime_type, &self.bytes)
    }
}

/// Map a file name to an accepted MIME type by extension.
fn mime_for_name(name: &str) -> DisputeResult<&'static str> {
    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => Ok("text/plain"),
        "pdf" => Ok("application/pdf"),
        _ => Err(DisputeError::UnsupportedType(name.to_string())),
    }
}
