//! Bitmap copy and draft rescale.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG) | `image::load` with the format picked from the extension |
//! | Resize | `DynamicImage::resize_exact` with `FilterType::Nearest` |
//! | Encode | `DynamicImage::write_to` as PNG |
//! | Copy | `std::fs::copy` |

use super::ImagingError;
use super::calculations::preview_dimensions;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Bitmap formats found in the illustration tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapFormat {
    Png,
    Jpeg,
}

impl BitmapFormat {
    /// Pick the decoder from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(BitmapFormat::Png),
            "jpg" | "jpeg" => Some(BitmapFormat::Jpeg),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            BitmapFormat::Png => ImageFormat::Png,
            BitmapFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Copy `src` to `dst` byte for byte. Returns the number of bytes copied.
pub fn copy_bitmap(src: &Path, dst: &Path) -> Result<u64, ImagingError> {
    if !fs::metadata(src)?.is_file() {
        return Err(ImagingError::NotAFile(src.display().to_string()));
    }
    Ok(fs::copy(src, dst)?)
}

/// Decode `src`, shrink it to `width` pixels wide with nearest-neighbour
/// sampling and write the result to `dst` as PNG.
///
/// The destination keeps whatever name the caller chose; the content is
/// always PNG. Returns the preview dimensions.
pub fn rescale_to_png(src: &Path, dst: &Path, width: u32) -> Result<(u32, u32), ImagingError> {
    let format = BitmapFormat::from_path(src)
        .ok_or_else(|| ImagingError::UnsupportedFormat(src.display().to_string()))?;
    let reader = BufReader::new(File::open(src)?);
    let img = image::load(reader, format.image_format())?;

    let (w, h) = preview_dimensions((img.width(), img.height()), width);
    let preview = DynamicImage::ImageRgba8(img.resize_exact(w, h, FilterType::Nearest).to_rgba8());

    let mut writer = BufWriter::new(File::create(dst)?);
    preview.write_to(&mut writer, ImageFormat::Png)?;
    writer.flush()?;
    Ok((w, h))
}
