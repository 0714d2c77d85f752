use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),

    #[error("Gradient needs at least 2 colors, got {0}")]
    TooFewStops(usize),

    #[error("Colorscheme '{0}' not found")]
    UnknownScheme(String),

    #[error("Failed to read colorscheme {path}: {message}")]
    SchemeFile { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum PixelateError {
    #[error("Image not found at {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Block size must be at least 1")]
    ZeroBlockSize,

    #[error("Block size {block_size} is too large for a {width}x{height} image")]
    BlockTooLarge {
        block_size: u32,
        width: u32,
        height: u32,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid contrast: {0}")]
    InvalidContrast(f64),

    #[error("Color error: {0}")]
    Color(#[from] ColorError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_error_too_few_stops() {
        let error = ColorError::TooFewStops(1);
        assert_eq!(error.to_string(), "Gradient needs at least 2 colors, got 1");
    }

    #[test]
    fn test_color_error_unknown_scheme() {
        let error = ColorError::UnknownScheme("mauve".to_string());
        assert_eq!(error.to_string(), "Colorscheme 'mauve' not found");
    }

    #[test]
    fn test_pixelate_error_input_not_found() {
        let error = PixelateError::InputNotFound(PathBuf::from("img/missing.png"));
        assert_eq!(error.to_string(), "Image not found at img/missing.png");
    }

    #[test]
    fn test_pixelate_error_zero_block_size() {
        let error = PixelateError::ZeroBlockSize;
        assert_eq!(error.to_string(), "Block size must be at least 1");
    }

    #[test]
    fn test_pixelate_error_block_too_large() {
        let error = PixelateError::BlockTooLarge {
            block_size: 20,
            width: 10,
            height: 10,
        };
        assert_eq!(
            error.to_string(),
            "Block size 20 is too large for a 10x10 image"
        );
    }

    #[test]
    fn test_filter_error_from_color_error() {
        let error: FilterError = ColorError::TooFewStops(0).into();
        match error {
            FilterError::Color(ColorError::TooFewStops(0)) => {}
            _ => panic!("Expected Color variant"),
        }
    }
}
