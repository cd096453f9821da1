//! Shared test utilities: synthetic images, timestamps, tree listings and a
//! project scaffold for driver tests.

use image::{ImageEncoder, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid PNG with the given dimensions, creating parent dirs.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let file = fs::File::create(path).unwrap();
    image::codecs::png::PngEncoder::new(std::io::BufWriter::new(file))
        .write_image(
            gradient(width, height).as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}

/// Write a small valid JPEG with the given dimensions, creating parent dirs.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let file = fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
        .write_image(
            gradient(width, height).as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}

// =========================================================================
// Timestamps
// =========================================================================

/// Set the modification time of an existing file.
pub fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

// =========================================================================
// Trees
// =========================================================================

/// Relative paths of every entry under `root`, sorted, `/`-separated.
/// Directories end with `/`.
pub fn list_tree(root: &Path) -> Vec<String> {
    let mut entries: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            if e.file_type().is_dir() {
                format!("{rel}/")
            } else {
                rel
            }
        })
        .collect();
    entries.sort();
    entries
}

/// A scratch book project:
///
/// ```text
/// <tmp>/retro-book/
/// ├── src/book.tex
/// ├── src/cover/pdf/cover_front.svg
/// ├── src/cover/pdf/cover_back.svg
/// ├── illu/img/cat.png            (400x200)
/// ├── illu/img/hw/board.jpg       (300x300)
/// ├── illu/img/empty/
/// ├── illu/d/robot.svg
/// └── illu/d/cpu/bus.svg
/// ```
pub struct Scaffold {
    _tmp: TempDir,
    pub root: PathBuf,
}

pub fn scaffold_project() -> Scaffold {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("retro-book");
    let write = |rel: &str, content: &str| {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    };
    write("src/book.tex", "\\documentclass{book}\n");
    write("src/cover/pdf/cover_front.svg", "<svg/>");
    write("src/cover/pdf/cover_back.svg", "<svg/>");
    write("illu/d/robot.svg", "<svg/>");
    write("illu/d/cpu/bus.svg", "<svg/>");
    write_test_png(&root.join("illu/img/cat.png"), 400, 200);
    write_test_jpeg(&root.join("illu/img/hw/board.jpg"), 300, 300);
    fs::create_dir_all(root.join("illu/img/empty")).unwrap();
    Scaffold { _tmp: tmp, root }
}
