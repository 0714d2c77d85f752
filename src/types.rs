use std::path::PathBuf;

use palette::Srgb;

use crate::colors::default_colors;
use crate::constants::DEFAULT_CONTRAST;

#[derive(Debug, Clone, PartialEq)]
pub struct TritoneOptions {
    pub colors: Vec<Srgb<u8>>,
    pub contrast: f64,
}

impl Default for TritoneOptions {
    fn default() -> Self {
        TritoneOptions {
            colors: default_colors(),
            contrast: DEFAULT_CONTRAST,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelateJob {
    pub input_path: PathBuf,
    pub block_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TritoneJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub options: TritoneOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppConfig {
    Pixelate(PixelateJob),
    Tritone(TritoneJob),
}
