//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every image is shown by positional index and display name first, with
//! its source and metadata as indented context lines. Generated artifacts
//! go to stdout or a file; these summaries go to stdout only when the
//! artifact itself does not.
//!
//! # Output Format
//!
//! ## Images
//!
//! ```text
//! Images
//! 001 Blue Hour (1600x1067, 412.0 KB)
//!     Source: 001-Blue-Hour.jpg
//! 002 Harbor
//!     Source: data:image/png;base64,... (18.2 KB inline)
//!
//! Skipped
//!     notes.txt: Unsupported file type: notes.txt
//! ```
//!
//! ## Summary
//!
//! ```text
//! Summary
//!     Images: 12 (4.8 MB total, 412.0 KB average)
//!     Layout: grid, 2 pages
//!     Autoplay: on, every 3000 ms
//! ```
//!
//! ## Artifacts
//!
//! ```text
//! Generated embed (48.3 KB) → slider.html
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::{Layout, SliderOptions};
use crate::ingest::IngestReport;
use crate::navigator::page_count_for;
use crate::types::{ImageDescriptor, ImageValidation, Project};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Bytes as B / KB / MB with one decimal.
fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Shorten `data:` URIs to their media type.
fn display_src(src: &str) -> String {
    match src.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((header, payload)) => format!(
            "data:{header},... ({} inline)",
            human_size(payload.len() as u64)
        ),
        None => src.to_string(),
    }
}

/// Index, name and known metadata on one line.
///
/// ```text
/// 001 Blue Hour (1600x1067, 412.0 KB)
/// 002 Harbor
/// ```
fn image_header(index: usize, image: &ImageDescriptor) -> String {
    let mut details = Vec::new();
    if let (Some(w), Some(h)) = (image.width, image.height) {
        details.push(format!("{w}x{h}"));
    }
    if let Some(size) = image.size {
        details.push(human_size(size));
    }
    if details.is_empty() {
        format!("{} {}", format_index(index), image.display_name())
    } else {
        format!(
            "{} {} ({})",
            format_index(index),
            image.display_name(),
            details.join(", ")
        )
    }
}

// ============================================================================
// Images
// ============================================================================

/// Format an ingestion report: accepted images, then skipped files.
pub fn format_ingest_report(report: &IngestReport) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];
    for (i, image) in report.images.iter().enumerate() {
        lines.push(image_header(i + 1, image));
        lines.push(format!("{}Source: {}", indent(1), display_src(&image.src)));
    }
    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &report.skipped {
            let name = skipped
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| skipped.path.display().to_string());
            lines.push(format!("{}{}: {}", indent(1), name, skipped.reason));
        }
    }
    lines
}

pub fn print_ingest_report(report: &IngestReport) {
    for line in format_ingest_report(report) {
        println!("{}", line);
    }
}

/// Format the outcome of image validation.
pub fn format_validation(validation: &ImageValidation, count: usize) -> Vec<String> {
    match &validation.error {
        None => vec![format!("Valid: {count} images ready to embed")],
        Some(error) => vec![format!("Invalid: {error}")],
    }
}

pub fn print_validation(validation: &ImageValidation, count: usize) {
    for line in format_validation(validation, count) {
        println!("{}", line);
    }
}

/// Totals for an image list and the slider it would produce.
///
/// Sizes are summed over images whose size is known; the average divides
/// by that same count.
pub fn format_embed_summary(images: &[ImageDescriptor], options: &SliderOptions) -> Vec<String> {
    let sizes: Vec<u64> = images.iter().filter_map(|image| image.size).collect();
    let count = images.len();
    let images_line = if sizes.is_empty() {
        format!("{}Images: {count}", indent(1))
    } else {
        let total: u64 = sizes.iter().sum();
        format!(
            "{}Images: {count} ({} total, {} average)",
            indent(1),
            human_size(total),
            human_size(total / sizes.len() as u64)
        )
    };

    let positions = match options.layout {
        Layout::Slide => count,
        Layout::Grid => page_count_for(count),
    };
    let unit = match (options.layout, positions) {
        (Layout::Slide, 1) => "slide",
        (Layout::Slide, _) => "slides",
        (Layout::Grid, 1) => "page",
        (Layout::Grid, _) => "pages",
    };

    let autoplay = if !options.auto_play {
        "off".to_string()
    } else if positions <= 1 {
        "on, idle with a single position".to_string()
    } else {
        format!("on, every {} ms", options.auto_play_delay)
    };

    vec![
        "Summary".to_string(),
        images_line,
        format!("{}Layout: {}, {positions} {unit}", indent(1), options.layout.as_str()),
        format!("{}Autoplay: {autoplay}", indent(1)),
    ]
}

pub fn print_embed_summary(images: &[ImageDescriptor], options: &SliderOptions) {
    for line in format_embed_summary(images, options) {
        println!("{}", line);
    }
}

// ============================================================================
// Artifacts
// ============================================================================

/// One-line summary of a written artifact.
pub fn format_artifact_summary(kind: &str, artifact: &str, destination: &Path) -> Vec<String> {
    vec![format!(
        "Generated {} ({}) → {}",
        kind,
        human_size(artifact.len() as u64),
        destination.display()
    )]
}

pub fn print_artifact_summary(kind: &str, artifact: &str, destination: &Path) {
    for line in format_artifact_summary(kind, artifact, destination) {
        println!("{}", line);
    }
}

/// Project identity and counters.
///
/// ```text
/// Summer Trip (proj_lx2k3f_a8d9e0f1g)
///     Images: 12
///     Embeds: 3
///     Updated: 2024-06-01T12:00:00+00:00
/// ```
pub fn format_project(project: &Project) -> Vec<String> {
    vec![
        format!("{} ({})", project.name, project.id),
        format!("{}Images: {}", indent(1), project.images.len()),
        format!("{}Embeds: {}", indent(1), project.embed_count),
        format!("{}Updated: {}", indent(1), project.updated_at.to_rfc3339()),
    ]
}

pub fn print_project(project: &Project) {
    for line in format_project(project) {
        println!("{}", line);
    }
}
