use image::{DynamicImage, GrayImage, Luma};

/// Gradient from 0 to 180 (plus `offset`) along x or y
pub fn gradient_image(width: u32, height: u32, horizontal: bool, offset: u8) -> DynamicImage {
    let img = GrayImage::from_fn(width, height, |x, y| {
        let (pos, span) = if horizontal {
            (x, width.max(2) - 1)
        } else {
            (y, height.max(2) - 1)
        };
        Luma([(pos * 180 / span) as u8 + offset])
    });
    DynamicImage::ImageLuma8(img)
}

/// Checkerboard of `square`-pixel squares alternating between 40 and 200
pub fn checkerboard_image(width: u32, height: u32, square: u32) -> DynamicImage {
    let img = GrayImage::from_fn(width, height, |x, y| {
        if ((x / square) + (y / square)) % 2 == 0 {
            Luma([40])
        } else {
            Luma([200])
        }
    });
    DynamicImage::ImageLuma8(img)
}
