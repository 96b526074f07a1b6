use std::fmt;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIME: &str = "image/png";
pub const DEFAULT_UPLOAD_NAME: &str = "upload.png";

/// Where the user's image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    LocalFile(PathBuf),
    RemoteUrl(String),
}

impl ImageSource {
    /// Anything that looks like an http(s) URL is remote, everything else a path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ImageSource::RemoteUrl(trimmed.to_string())
        } else {
            ImageSource::LocalFile(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::LocalFile(path) => write!(f, "{}", path.display()),
            ImageSource::RemoteUrl(url) => write!(f, "{url}"),
        }
    }
}

/// An embeddable image reference: either a `data:` URL or a plain remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_remote_url(&self) -> bool {
        self.0.starts_with("http")
    }

    /// MIME type and payload of a `data:` reference. `None` for URLs or
    /// malformed data.
    pub fn decode_data(&self) -> Option<(String, Vec<u8>)> {
        let rest = self.0.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let mime = header.strip_suffix(";base64")?;
        let bytes = STANDARD.decode(payload.trim()).ok()?;
        let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
        Some((mime.to_string(), bytes))
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.starts_with("data:") {
            let header = self.0.split(',').next().unwrap_or("data:");
            write!(f, "{header},<{} chars>", self.0.len())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// The original file as uploaded, kept so it can be re-sent to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Result of the acquisition step, enriched with the locally extracted color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredImage {
    pub reference: ImageReference,
    pub file: Option<ImageFile>,
    pub derived_color: Option<String>,
}

impl AcquiredImage {
    pub fn new(reference: ImageReference, file: Option<ImageFile>) -> Self {
        Self {
            reference,
            file,
            derived_color: None,
        }
    }

    /// Bytes available for local decoding: the original file, else the
    /// payload of a `data:` reference.
    pub fn pixel_bytes(&self) -> Option<Vec<u8>> {
        match &self.file {
            Some(file) => Some(file.bytes.clone()),
            None => self.reference.decode_data().map(|(_, bytes)| bytes),
        }
    }
}
