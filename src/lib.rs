//! Two small image filters.
//!
//! * [`pixelate`] averages `n x n` blocks into a coarse grid and optionally
//!   scales it back up with hard block edges.
//! * [`tritone`] maps each pixel's luminance onto a multi-stop color
//!   gradient, leaving alpha untouched, over a whole directory at a time.

pub mod colors;
pub mod config;
pub mod constants;
pub mod error;
pub mod gradient;
pub mod logging;
pub mod pixelate;
pub mod tritone;
pub mod types;
pub mod utils;

pub use error::{ColorError, FilterError, PixelateError};
pub use gradient::Gradient;
pub use types::{AppConfig, PixelateJob, TritoneJob, TritoneOptions};
