//! Block-averaging pixel art.
//!
//! The image is reduced to a `floor(W / n) x floor(H / n)` grid where every
//! cell is the mean of one `n x n` block, then optionally blown back up with
//! nearest-neighbour replication so the blocks keep hard edges.

use crate::error::PixelateError;
use crate::utils::compute_integral_image;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use image::io::Reader;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use tracing::info;

/// Rejects block sizes that leave no room for at least two blocks along the
/// shorter side.
pub fn check_block_size(width: u32, height: u32, block_size: u32) -> Result<(), PixelateError> {
    if block_size == 0 {
        return Err(PixelateError::ZeroBlockSize);
    }
    if block_size >= width.min(height) {
        return Err(PixelateError::BlockTooLarge {
            block_size,
            width,
            height,
        });
    }
    Ok(())
}

/// Box-filter downscale. Trailing pixels that do not fill a whole block are
/// dropped.
pub fn downscale_box(image: &RgbaImage, block_size: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let integral = compute_integral_image(image);
    let area = block_size as u64 * block_size as u64;

    RgbaImage::from_fn(width / block_size, height / block_size, |bx, by| {
        let (x1, y1) = (bx * block_size, by * block_size);
        let sum = integral.block_sum(x1, y1, x1 + block_size, y1 + block_size);
        Rgba(sum.map(|channel| ((channel + area / 2) / area) as u8))
    })
}

/// Nearest-neighbour resize sampling each output pixel's centre.
pub fn upscale_nearest(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (src_width, src_height) = image.dimensions();
    let nearest = |dst: u32, dst_len: u32, src_len: u32| -> u32 {
        let src = (2 * dst as u64 + 1) * src_len as u64 / (2 * dst_len as u64);
        (src as u32).min(src_len - 1)
    };

    RgbaImage::from_fn(width, height, |x, y| {
        *image.get_pixel(
            nearest(x, width, src_width),
            nearest(y, height, src_height),
        )
    })
}

/// Validated block grid of `img`, one averaged pixel per block.
fn reduce(img: &DynamicImage, block_size: u32) -> Result<RgbaImage, PixelateError> {
    let (width, height) = img.dimensions();
    check_block_size(width, height, block_size)?;

    let small = downscale_box(&img.to_rgba8(), block_size);
    info!(
        "Pixelated grid: {}x{} blocks",
        small.width(),
        small.height()
    );
    Ok(small)
}

pub fn pixelate(
    img: &DynamicImage,
    block_size: u32,
    scale_up: bool,
) -> Result<RgbaImage, PixelateError> {
    let small = reduce(img, block_size)?;
    if scale_up {
        let (width, height) = img.dimensions();
        Ok(upscale_nearest(&small, width, height))
    } else {
        Ok(small)
    }
}

/// `<dir>/<stem>_pixelart_{n}x{n}[_small].png`
pub fn default_output_path(input: &Path, block_size: u32, scale_up: bool) -> PathBuf {
    let mut name = OsString::from(input.file_stem().unwrap_or_default());
    name.push(format!("_pixelart_{}x{}", block_size, block_size));
    if !scale_up {
        name.push("_small");
    }
    name.push(".png");
    input.with_file_name(name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
    pub format: Option<ImageFormat>,
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Input: {}", self.path.display())?;
        writeln!(f, "  Size: {}x{}", self.width, self.height)?;
        writeln!(f, "  Mode: {:?}", self.color)?;
        match self.format {
            Some(format) => write!(f, "  Format: {:?}", format),
            None => write!(f, "  Format: unknown"),
        }
    }
}

/// Decodes `path`, failing with `InputNotFound` before touching the decoder
/// when the file is missing.
pub fn load_image(path: &Path) -> Result<(DynamicImage, ImageInfo), PixelateError> {
    if !path.exists() {
        return Err(PixelateError::InputNotFound(path.to_path_buf()));
    }

    let reader = Reader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let img = reader.decode()?;
    let (width, height) = img.dimensions();
    let info = ImageInfo {
        path: path.to_path_buf(),
        width,
        height,
        color: img.color(),
        format,
    };
    Ok((img, info))
}

fn save_png(result: &RgbaImage, output_path: &Path) -> Result<(), PixelateError> {
    result.save_with_format(output_path, ImageFormat::Png)?;
    info!(
        "Pixel art saved to: {} ({}x{})",
        output_path.display(),
        result.width(),
        result.height()
    );
    Ok(())
}

/// Pixelates one file. Without an explicit `output_path` the result lands
/// next to the input under [`default_output_path`]. Always written as PNG.
pub fn pixelate_file(
    input: &Path,
    output_path: Option<&Path>,
    block_size: u32,
    scale_up: bool,
) -> Result<PathBuf, PixelateError> {
    let (img, _) = load_image(input)?;
    let output_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input, block_size, scale_up));
    save_png(&pixelate(&img, block_size, scale_up)?, &output_path)?;
    Ok(output_path)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelateOutputs {
    pub full: PathBuf,
    pub small: PathBuf,
}

/// Writes the full-size and the `_small` variant of an already decoded image
/// from a single downscale.
pub fn pixelate_both(
    img: &DynamicImage,
    input: &Path,
    block_size: u32,
) -> Result<PixelateOutputs, PixelateError> {
    let grid = reduce(img, block_size)?;
    let (width, height) = img.dimensions();

    let full = default_output_path(input, block_size, true);
    save_png(&upscale_nearest(&grid, width, height), &full)?;

    let small = default_output_path(input, block_size, false);
    save_png(&grid, &small)?;

    Ok(PixelateOutputs { full, small })
}

pub fn run_pixelate(input: &Path, block_size: u32) -> Result<PixelateOutputs, PixelateError> {
    let (img, _) = load_image(input)?;
    pixelate_both(&img, input, block_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[test]
    fn test_solid_red_scenario() {
        let img = solid(32, 32, [255, 0, 0, 255]);

        let small = pixelate(&img, 16, false).unwrap();
        assert_eq!(small.dimensions(), (2, 2));
        assert!(small.pixels().all(|p| p.0 == [255, 0, 0, 255]));

        let full = pixelate(&img, 16, true).unwrap();
        assert_eq!(full, img.to_rgba8());
    }

    #[test]
    fn test_block_larger_than_image_is_rejected() {
        let img = solid(10, 10, [1, 2, 3, 4]);
        match pixelate(&img, 20, true) {
            Err(PixelateError::BlockTooLarge {
                block_size: 20,
                width: 10,
                height: 10,
            }) => {}
            other => panic!("Expected BlockTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_block_size_has_its_own_error() {
        assert!(matches!(
            check_block_size(10, 10, 0),
            Err(PixelateError::ZeroBlockSize)
        ));
        assert!(matches!(
            pixelate(&solid(10, 10, [0, 0, 0, 255]), 0, false),
            Err(PixelateError::ZeroBlockSize)
        ));
    }

    #[test]
    fn test_pixelate_both_matches_single_variants() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("mix.png");
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(13, 9, |x, y| {
            Rgba([(x * 19) as u8, (y * 27) as u8, ((x * y) % 256) as u8, 200])
        }));

        let outputs = pixelate_both(&img, &input, 4).unwrap();
        let full = image::open(&outputs.full).unwrap().to_rgba8();
        let small = image::open(&outputs.small).unwrap().to_rgba8();
        assert_eq!(full, pixelate(&img, 4, true).unwrap());
        assert_eq!(small, pixelate(&img, 4, false).unwrap());
        assert_eq!(small.dimensions(), (3, 2));
    }

    #[test]
    fn test_check_block_size_bounds() {
        assert!(check_block_size(10, 10, 0).is_err());
        assert!(check_block_size(10, 40, 10).is_err());
        assert!(check_block_size(10, 40, 9).is_ok());
    }

    #[test]
    fn test_small_dimensions_round_down() {
        for (width, height, block) in [(37, 23, 5), (64, 33, 16), (9, 100, 4), (3, 3, 2)] {
            let img = solid(width, height, [9, 9, 9, 9]);
            let small = pixelate(&img, block, false).unwrap();
            assert_eq!(small.dimensions(), (width / block, height / block));
            let full = pixelate(&img, block, true).unwrap();
            assert_eq!(full.dimensions(), (width, height));
        }
    }

    #[test]
    fn test_block_average_includes_alpha() {
        let img = RgbaImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([0, 100, 255, 0])
            } else {
                Rgba([255, 101, 0, 255])
            }
        });
        let small = downscale_box(&img, 2);
        assert_eq!(small.get_pixel(0, 0).0, [128, 101, 128, 128]);
    }

    #[test]
    fn test_partial_blocks_are_dropped() {
        // 5x4 image, block 2: column 4 is bright and must not leak into the grid.
        let img = RgbaImage::from_fn(5, 4, |x, _| {
            if x == 4 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([10, 20, 30, 255])
            }
        });
        let small = downscale_box(&img, 2);
        assert_eq!(small.dimensions(), (2, 2));
        assert!(small.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn test_upscale_replicates_blocks() {
        let small = RgbaImage::from_fn(2, 1, |x, _| Rgba([x as u8 * 200, 0, 0, 255]));
        let full = upscale_nearest(&small, 8, 3);
        for (x, _, pixel) in full.enumerate_pixels() {
            let expected = if x < 4 { 0 } else { 200 };
            assert_eq!(pixel.0, [expected, 0, 0, 255]);
        }
    }

    #[test]
    fn test_default_output_path_suffixes() {
        let input = Path::new("img/avatar.jpg");
        assert_eq!(
            default_output_path(input, 16, true),
            PathBuf::from("img/avatar_pixelart_16x16.png")
        );
        assert_eq!(
            default_output_path(input, 8, false),
            PathBuf::from("img/avatar_pixelart_8x8_small.png")
        );
    }

    #[test]
    fn test_missing_input_fails_before_decoding() {
        let missing = Path::new("definitely/not/here.png");
        assert!(matches!(
            pixelate_file(missing, None, 16, true),
            Err(PixelateError::InputNotFound(_))
        ));
    }
}
