//! Image ingestion for the CLI.
//!
//! Turns a directory of image files (or a JSON file of descriptors) into the
//! ordered [`ImageDescriptor`] list the generator consumes.
//!
//! ## Directory Rules
//!
//! - Files are walked recursively in file-name order; hidden entries
//!   (`.name`) are skipped along with everything below them.
//! - Accepted types: JPEG, PNG, GIF, WebP. Other files are skipped.
//! - Files above the size limit (10 MiB by default) are skipped with a
//!   warning, as are files whose header cannot be decoded.
//! - Display names follow the `NNN-name` convention: `001-Blue-Hour.jpg`
//!   becomes "Blue Hour".
//! - `id` is the first 16 hex chars of the SHA-256 of the file bytes, so
//!   re-ingesting unchanged files yields the same ids.
//! - `src` is the path relative to the scanned directory, or a base64
//!   `data:` URI when inlining is requested.
//!
//! Per-file work runs in parallel on the rayon pool; results keep walk order.

use crate::types::{ImageDescriptor, short_digest};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Default per-file size limit.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Accepted extensions and their MIME types.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Unreadable image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Unsupported file type: {0}")]
    UnsupportedType(PathBuf),
    #[error("{path} is {size} bytes, over the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("No usable images found in {0}")]
    Empty(PathBuf),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Embed file bytes as `data:` URIs instead of relative paths.
    pub inline: bool,
    pub max_file_size: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            inline: false,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

/// A file that was seen but not turned into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub images: Vec<ImageDescriptor>,
    pub skipped: Vec<Skipped>,
}

/// Scan `root` for images.
///
/// Fails with [`IngestError::Empty`] when no file was accepted.
pub fn ingest_dir(root: &Path, options: &IngestOptions) -> Result<IngestReport, IngestError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    let results: Vec<Result<ImageDescriptor, IngestError>> = files
        .par_iter()
        .map(|path| ingest_file(root, path, options))
        .collect();

    let mut report = IngestReport::default();
    for (path, result) in files.into_iter().zip(results) {
        match result {
            Ok(descriptor) => report.images.push(descriptor),
            Err(err) => {
                match &err {
                    IngestError::UnsupportedType(_) => log::debug!("skipping {}", path.display()),
                    other => log::warn!("skipping {}: {other}", path.display()),
                }
                report.skipped.push(Skipped {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    if report.images.is_empty() {
        return Err(IngestError::Empty(root.to_path_buf()));
    }
    log::info!(
        "ingested {} images from {} ({} skipped)",
        report.images.len(),
        root.display(),
        report.skipped.len()
    );
    Ok(report)
}

/// Load images from a directory or from a JSON array of descriptors.
///
/// Descriptors without an `id` get one derived from their `src`.
pub fn load_images(path: &Path, options: &IngestOptions) -> Result<IngestReport, IngestError> {
    if path.is_dir() {
        return ingest_dir(path, options);
    }
    let content = fs::read_to_string(path)?;
    let mut images: Vec<ImageDescriptor> = serde_json::from_str(&content)?;
    for image in &mut images {
        if image.id.is_empty() {
            image.id = short_digest(image.src.as_bytes());
        }
    }
    Ok(IngestReport {
        images,
        skipped: Vec::new(),
    })
}

fn ingest_file(root: &Path, path: &Path, options: &IngestOptions) -> Result<ImageDescriptor, IngestError> {
    let mime = mime_for(path).ok_or_else(|| IngestError::UnsupportedType(path.to_path_buf()))?;

    let size = fs::metadata(path)?.len();
    if size > options.max_file_size {
        return Err(IngestError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: options.max_file_size,
        });
    }

    let (width, height) = image::image_dimensions(path).map_err(|source| IngestError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = fs::read(path)?;

    let src = if options.inline {
        format!("data:{mime};base64,{}", BASE64.encode(&bytes))
    } else {
        relative_src(root, path)
    };

    Ok(ImageDescriptor {
        id: short_digest(&bytes),
        src,
        name: Some(display_name_for(path)),
        width: Some(width),
        height: Some(height),
        size: Some(bytes.len() as u64),
        mime_type: Some(mime.to_string()),
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn relative_src(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Display name from a file name following the `NNN-name` convention.
///
/// - `"001-Blue-Hour.jpg"` → "Blue Hour"
/// - `"harbor_at_dusk.png"` → "harbor at dusk"
/// - `"007.jpg"` → "007"
pub fn display_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let without_number = match stem.split_once('-') {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => stem.as_str(),
    };
    let title = without_number.replace(['-', '_'], " ");
    let title = title.trim();
    if title.is_empty() {
        stem
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_png;
    use tempfile::TempDir;

    #[test]
    fn display_names_follow_convention() {
        assert_eq!(display_name_for(Path::new("001-Blue-Hour.jpg")), "Blue Hour");
        assert_eq!(display_name_for(Path::new("harbor_at_dusk.png")), "harbor at dusk");
        assert_eq!(display_name_for(Path::new("007.jpg")), "007");
        assert_eq!(display_name_for(Path::new("010-.jpg")), "010-");
        assert_eq!(display_name_for(Path::new("wip-draft.gif")), "wip draft");
    }

    #[test]
    fn mime_is_case_insensitive() {
        assert_eq!(mime_for(Path::new("A.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("a.webp")), Some("image/webp"));
        assert_eq!(mime_for(Path::new("a.bmp")), None);
        assert_eq!(mime_for(Path::new("noext")), None);
    }

    #[test]
    fn ingests_sorted_with_metadata() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "002-Second.png", 20, 10);
        write_png(tmp.path(), "001-First.png", 10, 20);

        let report = ingest_dir(tmp.path(), &IngestOptions::default()).unwrap();
        let names: Vec<_> = report.images.iter().map(|i| i.display_name()).collect();
        assert_eq!(names, vec!["First", "Second"]);

        let first = &report.images[0];
        assert_eq!(first.src, "001-First.png");
        assert_eq!((first.width, first.height), (Some(10), Some(20)));
        assert_eq!(first.mime_type.as_deref(), Some("image/png"));
        assert_eq!(first.id.len(), 16);
    }

    #[test]
    fn nested_dirs_use_forward_slashes() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("trip");
        fs::create_dir(&sub).unwrap();
        write_png(&sub, "a.png", 4, 4);

        let report = ingest_dir(tmp.path(), &IngestOptions::default()).unwrap();
        assert_eq!(report.images[0].src, "trip/a.png");
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "visible.png", 4, 4);
        write_png(tmp.path(), ".hidden.png", 4, 4);
        let cache = tmp.path().join(".cache");
        fs::create_dir(&cache).unwrap();
        write_png(&cache, "inside.png", 4, 4);

        let report = ingest_dir(tmp.path(), &IngestOptions::default()).unwrap();
        assert_eq!(report.images.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn oversized_and_foreign_files_are_reported() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "ok.png", 4, 4);
        write_png(tmp.path(), "big.png", 300, 300);
        fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
        fs::write(tmp.path().join("broken.jpg"), "not a jpeg").unwrap();

        let small = fs::metadata(tmp.path().join("ok.png")).unwrap().len();
        let options = IngestOptions {
            max_file_size: small,
            ..IngestOptions::default()
        };
        let report = ingest_dir(tmp.path(), &options).unwrap();
        assert_eq!(report.images.len(), 1);

        let skipped: Vec<_> = report
            .skipped
            .iter()
            .map(|s| s.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(skipped, vec!["big.png", "broken.jpg", "notes.txt"]);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("readme.md"), "# nothing").unwrap();
        assert!(matches!(
            ingest_dir(tmp.path(), &IngestOptions::default()),
            Err(IngestError::Empty(_))
        ));
    }

    #[test]
    fn inline_produces_data_uri() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "a.png", 2, 2);
        let options = IngestOptions {
            inline: true,
            ..IngestOptions::default()
        };
        let report = ingest_dir(tmp.path(), &options).unwrap();
        let src = &report.images[0].src;
        assert!(src.starts_with("data:image/png;base64,iVBOR"));
    }

    #[test]
    fn identical_bytes_share_an_id() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "a.png", 3, 3);
        fs::copy(tmp.path().join("a.png"), tmp.path().join("b.png")).unwrap();
        let report = ingest_dir(tmp.path(), &IngestOptions::default()).unwrap();
        assert_eq!(report.images[0].id, report.images[1].id);
    }

    #[test]
    fn load_images_reads_descriptor_json() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("images.json");
        fs::write(
            &file,
            r#"[{"src": "https://x.test/a.jpg", "name": "A"}, {"id": "fixed", "src": "b.jpg", "type": "image/jpeg"}]"#,
        )
        .unwrap();

        let report = load_images(&file, &IngestOptions::default()).unwrap();
        assert_eq!(report.images.len(), 2);
        assert_eq!(report.images[0].id.len(), 16);
        assert_eq!(report.images[1].id, "fixed");
        assert_eq!(report.images[1].mime_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn load_images_dispatches_directories() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "a.png", 2, 2);
        let report = load_images(tmp.path(), &IngestOptions::default()).unwrap();
        assert_eq!(report.images.len(), 1);
    }
}
