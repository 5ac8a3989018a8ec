//! Shared data types exchanged between the core and its collaborators.
//!
//! Descriptors arrive from ingestion (directory scan, JSON file, or an
//! upload layer outside this crate) and flow unchanged into the navigators,
//! the live renderer, and the embed generator. [`Project`] is the persisted
//! record a dynamic embed resolves at display time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Display label used when a descriptor has no (or an empty) name.
pub const DEFAULT_IMAGE_NAME: &str = "Image";

/// Display label for projects created without a name.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// Immutable metadata for one image.
///
/// `src` is opaque: a relative path, a remote URL, or a `data:` URI. Only
/// `src` matters for rendering; the remaining metadata is informational.
/// A missing `src` deserializes to an empty string so that
/// [`validate_images`](crate::embed::validate_images) can report it instead
/// of failing the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Size of the image bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ImageDescriptor {
    /// Descriptor with only a source reference; the id is derived from `src`.
    pub fn new(src: impl Into<String>) -> Self {
        let src = src.into();
        Self {
            id: short_digest(src.as_bytes()),
            src,
            name: None,
            width: None,
            height: None,
            size: None,
            mime_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Name shown as alt text and caption, falling back to [`DEFAULT_IMAGE_NAME`].
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_IMAGE_NAME,
        }
    }
}

/// Result of checking a descriptor list before generation.
///
/// Serializes as `{"valid": true}` or `{"valid": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// A saved slider project, addressable by `id`.
///
/// The dynamic embed only depends on `images[]` being present in the
/// fetched record; `settings` is a sparse options overlay merged onto the
/// project defaults when the embed is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
    #[serde(default = "default_project_settings")]
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub embed_count: u32,
}

fn default_project_settings() -> serde_json::Value {
    serde_json::json!({
        "autoPlay": true,
        "autoPlayDelay": 4000,
        "showIndicators": true,
        "showNavigation": true,
    })
}

impl Project {
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        let name = name.trim();
        Self {
            id: generate_project_id(),
            name: if name.is_empty() {
                DEFAULT_PROJECT_NAME.to_string()
            } else {
                name.to_string()
            },
            images: Vec::new(),
            settings: default_project_settings(),
            created_at: now,
            updated_at: now,
            embed_count: 0,
        }
    }

    /// Replace the image list and bump `updated_at`.
    pub fn set_images(&mut self, images: Vec<ImageDescriptor>) {
        self.images = images;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Identifiers
// =============================================================================

static SALT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// SHA-256 over the wall clock, a process-wide counter and the pid.
///
/// Two calls in the same process never return the same digest, even within
/// one clock tick.
pub(crate) fn unique_digest(domain: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let count = SALT_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(b"\0");
    hasher.update(nanos.to_le_bytes());
    hasher.update(count.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// First 16 hex chars of the SHA-256 of `bytes`.
pub(crate) fn short_digest(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    digest[..16].to_string()
}

/// `proj_<base36 millis>_<9 base36 chars>`.
pub fn generate_project_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let digest = unique_digest("project");
    let entropy = u128::from_str_radix(&digest[..24], 16).unwrap_or_default();
    let mut suffix = to_base36(entropy);
    suffix.truncate(9);
    format!("proj_{}_{:0>9}", to_base36(millis), suffix)
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
