//! Image loading and normalization ahead of the wavelet transform.
//!
//! Every input ends up as a grayscale `Array2<f64>` of shape
//! `(height, width)` taken from the configured [`ImageSize`].

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use ndarray::Array2;
use std::path::{Path, PathBuf};

use crate::config::ImageSize;
use crate::error::{Error, Result};

/// Where an image comes from
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// File on disk
    Path(&'a Path),

    /// Encoded image bytes (PNG, JPEG, ...)
    Bytes(&'a [u8]),

    /// Already decoded image
    Image(&'a DynamicImage),

    /// Grayscale pixel grid, shape (height, width)
    Pixels(&'a Array2<f64>),
}

impl<'a> ImageSource<'a> {
    /// Short description for log messages
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("<{} encoded bytes>", bytes.len()),
            Self::Image(img) => format!("<{}x{} image>", img.width(), img.height()),
            Self::Pixels(grid) => format!("<{}x{} pixel grid>", grid.ncols(), grid.nrows()),
        }
    }
}

impl<'a> From<&'a Path> for ImageSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for ImageSource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Self::Path(path.as_path())
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a DynamicImage> for ImageSource<'a> {
    fn from(img: &'a DynamicImage) -> Self {
        Self::Image(img)
    }
}

impl<'a> From<&'a Array2<f64>> for ImageSource<'a> {
    fn from(grid: &'a Array2<f64>) -> Self {
        Self::Pixels(grid)
    }
}

/// Decode an image file
pub fn decode_file(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| Error::Decode(format!("{}: {}", path.display(), e)))
}

/// Decode encoded image bytes
pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(Error::from)
}

/// Grayscale conversion with luma = 0.299 R + 0.587 G + 0.114 B
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    GrayImage::from_fn(width, height, |x, y| {
        let pixel = rgb.get_pixel(x, y);
        let gray = 0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32;
        Luma([gray.round().clamp(0.0, 255.0) as u8])
    })
}

/// Bilinear resize of a grayscale image into a (height, width) grid
pub fn resize_to_grid(gray: &GrayImage, size: ImageSize) -> Array2<f64> {
    let resized = if gray.dimensions() == (size.width, size.height) {
        gray.clone()
    } else {
        image::imageops::resize(gray, size.width, size.height, FilterType::Triangle)
    };

    Array2::from_shape_fn(
        (size.height as usize, size.width as usize),
        |(y, x)| resized.get_pixel(x as u32, y as u32)[0] as f64,
    )
}

fn grid_to_gray(grid: &Array2<f64>) -> GrayImage {
    let (rows, cols) = grid.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let v = grid[[y as usize, x as usize]];
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Load any [`ImageSource`] as a grayscale grid of the requested size
pub fn load_image_array(source: ImageSource<'_>, size: ImageSize) -> Result<Array2<f64>> {
    if size.width == 0 || size.height == 0 {
        return Err(Error::InvalidConfiguration(format!(
            "Image size must be non-zero, got {}",
            size
        )));
    }

    match source {
        ImageSource::Path(path) => {
            let img = decode_file(path)?;
            Ok(resize_to_grid(&to_grayscale(&img), size))
        }
        ImageSource::Bytes(bytes) => {
            let img = decode_bytes(bytes)?;
            Ok(resize_to_grid(&to_grayscale(&img), size))
        }
        ImageSource::Image(img) => Ok(resize_to_grid(&to_grayscale(img), size)),
        ImageSource::Pixels(grid) => {
            if grid.is_empty() {
                return Err(Error::Decode("Pixel grid is empty".to_string()));
            }
            if grid.dim() == (size.height as usize, size.width as usize) {
                Ok(grid.clone())
            } else {
                Ok(resize_to_grid(&grid_to_gray(grid), size))
            }
        }
    }
}
