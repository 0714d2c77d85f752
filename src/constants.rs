pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BLOCK_SIZE: u32 = 16;
pub const DEFAULT_CONTRAST: f64 = 1.5;

pub const DEFAULT_PIXELATE_INPUT: &str = "img/avatar.png";
pub const DEFAULT_INPUT_DIR: &str = "./img";
pub const DEFAULT_OUTPUT_DIR: &str = "./img/tritone";
pub const DEFAULT_COLORSCHEME: &str = "rgb";

/// Extensions picked up by the tritone batch, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tiff"];

/// ITU-R BT.601 luma weights.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];
