use std::path::Path;

use image::RgbaImage;
use palette::Srgb;

use crate::constants::IMAGE_EXTENSIONS;
use crate::error::ColorError;

pub fn hex_to_rgb(hex: &str) -> Result<Srgb<u8>, ColorError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(hex.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::InvalidHex(hex.to_string()))
    };

    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Linear blend of two channel values, truncated toward zero.
pub fn interpolate_channel(from: u8, to: u8, t: f64) -> u8 {
    let value = from as f64 + (to as f64 - from as f64) * t;
    value.clamp(0.0, 255.0) as u8
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Summed-area table over RGBA channels, `(width + 1) x (height + 1)` entries
/// with a zero top row and left column.
pub struct IntegralImage {
    width: usize,
    sums: Vec<[u64; 4]>,
}

impl IntegralImage {
    pub fn block_sum(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> [u64; 4] {
        let at = |x: u32, y: u32| self.sums[y as usize * (self.width + 1) + x as usize];
        let (a, b, c, d) = (at(x2, y2), at(x1, y2), at(x2, y1), at(x1, y1));
        let mut out = [0u64; 4];
        for channel in 0..4 {
            out[channel] = a[channel] + d[channel] - b[channel] - c[channel];
        }
        out
    }
}

pub fn compute_integral_image(image: &RgbaImage) -> IntegralImage {
    let (width, height) = image.dimensions();
    let (width, height) = (width as usize, height as usize);
    let stride = width + 1;
    let mut sums = vec![[0u64; 4]; stride * (height + 1)];

    for y in 1..=height {
        for x in 1..=width {
            let pixel = image.get_pixel(x as u32 - 1, y as u32 - 1);
            let up = sums[(y - 1) * stride + x];
            let left = sums[y * stride + x - 1];
            let diag = sums[(y - 1) * stride + x - 1];
            let cell = &mut sums[y * stride + x];
            for channel in 0..4 {
                cell[channel] =
                    up[channel] + left[channel] - diag[channel] + pixel[channel] as u64;
            }
        }
    }

    IntegralImage { width, sums }
}
