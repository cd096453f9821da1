//! Bitmap handling for the `illu/img` tree, pure Rust via the `image` crate.
//!
//! | Mode | Operation |
//! |---|---|
//! | release, print | byte copy, full resolution kept for the printer |
//! | debug | decode → nearest-neighbour resize to a narrow preview → PNG |
//!
//! The module is split into:
//! - **Calculations**: pure dimension math (unit testable)
//! - **Bitmap**: format detection, copy and rescale

mod bitmap;
mod calculations;

pub use bitmap::{BitmapFormat, copy_bitmap, rescale_to_png};
pub use calculations::preview_dimensions;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unsupported bitmap format: {0}")]
    UnsupportedFormat(String),
    #[error("{0} is not a regular file")]
    NotAFile(String),
}
