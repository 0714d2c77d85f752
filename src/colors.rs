use std::fs;
use std::path::Path;

use palette::Srgb;
use serde_derive::Deserialize;

use crate::error::ColorError;
use crate::utils::hex_to_rgb;

pub const RGB: [&str; 3] = ["#ff0000", "#00ff00", "#0000ff"];
pub const CORAL: [&str; 3] = ["#ff5069", "#3166d9", "#ffd943"];

#[derive(Debug, Deserialize)]
struct ColorschemeFile {
    colors: Vec<String>,
}

/// Red, green, blue. Built on every call so callers never share a list.
pub fn default_colors() -> Vec<Srgb<u8>> {
    vec![
        Srgb::new(255, 0, 0),
        Srgb::new(0, 255, 0),
        Srgb::new(0, 0, 255),
    ]
}

pub fn parse_colors<S: AsRef<str>>(hexes: &[S]) -> Result<Vec<Srgb<u8>>, ColorError> {
    hexes.iter().map(|hex| hex_to_rgb(hex.as_ref())).collect()
}

/// Parses a comma-separated list such as `#000000,#ffffff`.
pub fn parse_color_list(list: &str) -> Result<Vec<Srgb<u8>>, ColorError> {
    let hexes: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|hex| !hex.is_empty())
        .collect();
    parse_colors(&hexes[..])
}

/// Resolves a scheme name: `<config_dir>/<name>.toml` first, then built-ins.
pub fn load_colorscheme(name: &str, config_dir: &Path) -> Result<Vec<Srgb<u8>>, ColorError> {
    let colorscheme_path = config_dir.join(format!("{}.toml", name));
    if colorscheme_path.exists() {
        let scheme_error = |message: String| ColorError::SchemeFile {
            path: colorscheme_path.clone(),
            message,
        };
        let contents =
            fs::read_to_string(&colorscheme_path).map_err(|e| scheme_error(e.to_string()))?;
        let scheme: ColorschemeFile =
            toml::from_str(&contents).map_err(|e| scheme_error(e.to_string()))?;
        return parse_colors(&scheme.colors[..]);
    }

    match name {
        "rgb" => parse_colors(&RGB[..]),
        "coral" => parse_colors(&CORAL[..]),
        _ => Err(ColorError::UnknownScheme(name.to_string())),
    }
}
