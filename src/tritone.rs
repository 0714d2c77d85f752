use crate::constants::LUMA_WEIGHTS;
use crate::error::FilterError;
use crate::gradient::Gradient;
use crate::types::TritoneOptions;
use crate::utils::has_image_extension;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, error, info};

/// Normalized BT.601 luma of an 8-bit RGB triple, in `[0, 1]`.
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    let weighted =
        LUMA_WEIGHTS[0] * r as f64 + LUMA_WEIGHTS[1] * g as f64 + LUMA_WEIGHTS[2] * b as f64;
    weighted / 255.0
}

/// Linear contrast around mid-gray, clamped to `[0, 1]`.
pub fn apply_contrast(value: f64, contrast: f64) -> f64 {
    ((value - 0.5) * contrast + 0.5).clamp(0.0, 1.0)
}

/// Gradient and contrast resolved once, then applied to any number of images.
#[derive(Debug, Clone)]
pub struct TritoneMapper {
    gradient: Gradient,
    contrast: f64,
}

impl TritoneMapper {
    pub fn new(options: &TritoneOptions) -> Result<Self, FilterError> {
        if !options.contrast.is_finite() {
            return Err(FilterError::InvalidContrast(options.contrast));
        }
        Ok(TritoneMapper {
            gradient: Gradient::new(options.colors.clone())?,
            contrast: options.contrast,
        })
    }

    pub fn map_pixel(&self, pixel: [u8; 4]) -> [u8; 4] {
        let alpha = pixel[3];
        if alpha == 0 {
            return [0, 0, 0, 0];
        }
        let intensity = apply_contrast(luminance(pixel[0], pixel[1], pixel[2]), self.contrast);
        let [r, g, b] = self.gradient.sample(intensity);
        [r, g, b, alpha]
    }

    pub fn apply(&self, img: &DynamicImage) -> RgbaImage {
        let source = img.to_rgba8();
        let (width, height) = source.dimensions();
        let mut output = RgbaImage::new(width, height);

        output
            .par_chunks_exact_mut(4)
            .zip(source.par_chunks_exact(4))
            .for_each(|(out, px)| {
                out.copy_from_slice(&self.map_pixel([px[0], px[1], px[2], px[3]]));
            });

        output
    }
}

pub fn tritone_image(
    img: &DynamicImage,
    options: &TritoneOptions,
) -> Result<RgbaImage, FilterError> {
    Ok(TritoneMapper::new(options)?.apply(img))
}

/// `<output_dir>/<input stem>.png`
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = OsString::from(input.file_stem().unwrap_or_default());
    name.push(".png");
    output_dir.join(name)
}

fn process_with(
    mapper: &TritoneMapper,
    input: &Path,
    output_dir: &Path,
) -> Result<PathBuf, FilterError> {
    let img = image::open(input)?;
    let output = mapper.apply(&img);
    let output_path = output_path_for(input, output_dir);
    output.save_with_format(&output_path, ImageFormat::Png)?;
    Ok(output_path)
}

pub fn process_file(
    input: &Path,
    output_dir: &Path,
    options: &TritoneOptions,
) -> Result<PathBuf, FilterError> {
    process_with(&TritoneMapper::new(options)?, input, output_dir)
}

/// Regular files in `dir` with a recognised image extension, sorted by path.
pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>, FilterError> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: Result<PathBuf, FilterError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_clean(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Recolors every image in `input_dir` into `output_dir`.
///
/// A file that fails to decode or save is recorded in the report and the
/// batch moves on. Only an invalid gradient or an unusable directory aborts.
pub fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    options: &TritoneOptions,
    pb: &ProgressBar,
) -> Result<BatchReport, FilterError> {
    let mapper = TritoneMapper::new(options)?;
    fs::create_dir_all(output_dir)?;

    let inputs = collect_inputs(input_dir)?;
    debug!(count = inputs.len(), dir = %input_dir.display(), "collected tritone inputs");
    pb.set_length(inputs.len() as u64);

    let mut report = BatchReport::default();
    for input in inputs {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(format!("Processing: {}", name));

        let result = process_with(&mapper, &input, output_dir);
        match &result {
            Ok(saved) => info!("Saved: {}", saved.display()),
            Err(e) => error!("Error processing {}: {}", name, e),
        }
        pb.inc(1);

        report.outcomes.push(FileOutcome { input, result });
    }

    pb.finish_with_message("Tritone batch complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use palette::Srgb;

    fn black_white(contrast: f64) -> TritoneOptions {
        TritoneOptions {
            colors: vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)],
            contrast,
        }
    }

    #[test]
    fn test_luminance_extremes() {
        assert_eq!(luminance(0, 0, 0), 0.0);
        assert!((luminance(255, 255, 255) - 1.0).abs() < 1e-12);
        assert!((luminance(255, 0, 0) - 0.299).abs() < 1e-12);
    }

    #[test]
    fn test_apply_contrast_pivot_and_clamp() {
        assert_eq!(apply_contrast(0.5, 3.0), 0.5);
        assert_eq!(apply_contrast(0.9, 3.0), 1.0);
        assert_eq!(apply_contrast(0.1, 3.0), 0.0);
        assert!((apply_contrast(0.3, 1.0) - 0.3).abs() < 1e-12);
        assert!((apply_contrast(0.3, 0.5) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_mid_gray_maps_to_mid_gray() {
        let mapper = TritoneMapper::new(&black_white(1.0)).unwrap();
        assert_eq!(mapper.map_pixel([128, 128, 128, 200]), [128, 128, 128, 200]);
    }

    #[test]
    fn test_default_gradient_truncates_channels() {
        // red and green land on 82.5 and 172.5
        let mapper = TritoneMapper::new(&TritoneOptions::default()).unwrap();
        assert_eq!(mapper.map_pixel([100, 100, 100, 255]), [82, 172, 0, 255]);
    }

    #[test]
    fn test_unit_contrast_matches_plain_luminance() {
        let options = black_white(1.0);
        let mapper = TritoneMapper::new(&options).unwrap();
        let gradient = Gradient::new(options.colors.clone()).unwrap();

        for (r, g, b) in [(10, 200, 30), (90, 90, 250), (33, 66, 99), (200, 10, 140)] {
            let [mr, mg, mb, _] = mapper.map_pixel([r, g, b, 255]);
            assert_eq!([mr, mg, mb], gradient.sample(luminance(r, g, b)));
        }
    }

    #[test]
    fn test_transparent_pixels_skip_mapping() {
        let mapper = TritoneMapper::new(&TritoneOptions::default()).unwrap();
        assert_eq!(mapper.map_pixel([255, 255, 255, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn test_alpha_is_preserved_everywhere() {
        let source = RgbaImage::from_fn(17, 9, |x, y| {
            Rgba([
                (x * 15) as u8,
                (y * 28) as u8,
                ((x + y) * 7) as u8,
                ((x * 9 + y * 31) % 256) as u8,
            ])
        });
        let output =
            tritone_image(&DynamicImage::ImageRgba8(source.clone()), &TritoneOptions::default())
                .unwrap();

        assert_eq!(output.dimensions(), source.dimensions());
        for (out, src) in output.pixels().zip(source.pixels()) {
            assert_eq!(out[3], src[3]);
        }
    }

    #[test]
    fn test_rgb_input_gains_opaque_alpha() {
        let source = image::RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]));
        let output =
            tritone_image(&DynamicImage::ImageRgb8(source), &TritoneOptions::default()).unwrap();
        assert!(output.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let options = TritoneOptions {
            colors: vec![Srgb::new(0, 0, 0)],
            contrast: 1.0,
        };
        assert!(matches!(
            TritoneMapper::new(&options),
            Err(FilterError::Color(_))
        ));
        assert!(matches!(
            TritoneMapper::new(&black_white(f64::NAN)),
            Err(FilterError::InvalidContrast(_))
        ));
    }

    #[test]
    fn test_output_path_for_keeps_dotted_stem() {
        let path = output_path_for(Path::new("img/photo.final.JPG"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/photo.final.png"));
    }
}
