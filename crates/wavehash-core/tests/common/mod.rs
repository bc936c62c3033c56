#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use wavehash_core::{HashConfig, ImageSize};

/// Small, fast configuration for fixture images
pub fn test_config() -> HashConfig {
    HashConfig {
        image_size: ImageSize::new(64, 64),
        hash_bits: 64,
        ..HashConfig::default()
    }
}

/// Gradient from 0 to 180 (plus `offset`) along x or y
pub fn gradient(width: u32, height: u32, horizontal: bool, offset: u8) -> DynamicImage {
    let img = GrayImage::from_fn(width, height, |x, y| {
        let (pos, span) = if horizontal {
            (x, width - 1)
        } else {
            (y, height - 1)
        };
        Luma([(pos * 180 / span) as u8 + offset])
    });
    DynamicImage::ImageLuma8(img)
}

/// Checkerboard alternating between 40 and 200
pub fn checkerboard(width: u32, height: u32, square: u32) -> DynamicImage {
    let img = GrayImage::from_fn(width, height, |x, y| {
        Luma([if ((x / square) + (y / square)) % 2 == 0 { 40 } else { 200 }])
    });
    DynamicImage::ImageLuma8(img)
}

/// Blue-to-red colour ramp along x, brighter towards the right once converted to luma
pub fn colour_ramp(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, _| {
        let t = (x * 255 / (width - 1)) as u8;
        Rgb([t, 0, 255 - t])
    });
    DynamicImage::ImageRgb8(img)
}

/// Save `img` as PNG at `dir/name`
pub fn save_png(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png).unwrap();
    path
}

/// Write arbitrary bytes at `dir/name`
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    path
}

/// Gallery fixture:
///
/// ```text
/// root/
///   board.png
///   broken.jpg      (not a real JPEG)
///   h_gradient.png
///   notes.txt
///   nested/
///     v_gradient.png
///     h_bright.png
/// ```
pub fn create_gallery_dir(root: &Path) {
    let nested = root.join("nested");
    fs::create_dir_all(&nested).unwrap();

    save_png(root, "board.png", &checkerboard(96, 96, 12));
    write_file(root, "broken.jpg", b"DUMMY IMAGE DATA");
    save_png(root, "h_gradient.png", &gradient(96, 96, true, 0));
    write_file(root, "notes.txt", b"not an image");
    save_png(&nested, "v_gradient.png", &gradient(96, 96, false, 0));
    save_png(&nested, "h_bright.png", &gradient(96, 96, true, 25));
}

/// Canonical id used by galleries for `path`
pub fn id_of(path: &Path) -> String {
    path.canonicalize().unwrap().display().to_string()
}
