//! Shared test utilities.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let images = sample_images(10);
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_png(tmp.path(), "001-dawn.png", 8, 6);
//! ```

use std::path::{Path, PathBuf};

use crate::types::ImageDescriptor;

/// `n` descriptors named "Photo 1".."Photo n" with distinct sources.
pub fn sample_images(n: usize) -> Vec<ImageDescriptor> {
    (1..=n)
        .map(|i| {
            ImageDescriptor::new(format!("images/{i:03}.jpg"))
                .with_name(format!("Photo {i}"))
                .with_dimensions(1600, 1067)
        })
        .collect()
}

/// Write a solid-color PNG of the given size and return its path.
///
/// The color depends on the size so differently sized files differ in bytes.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let color = image::Rgb([(width % 256) as u8, (height % 256) as u8, 128]);
    let img = image::RgbImage::from_pixel(width, height, color);
    img.save(&path).unwrap();
    path
}
