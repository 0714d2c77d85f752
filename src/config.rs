use crate::colors::{load_colorscheme, parse_color_list, parse_colors};
use crate::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_COLORSCHEME, DEFAULT_CONTRAST, DEFAULT_INPUT_DIR,
    DEFAULT_OUTPUT_DIR, DEFAULT_PIXELATE_INPUT, VERSION,
};
use crate::types::{AppConfig, PixelateJob, TritoneJob, TritoneOptions};

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Arg, ArgMatches, Command};
use config::{Config, File};
use serde_derive::Deserialize;

#[derive(Debug, Deserialize)]
struct SerializedAppConfig {
    block_size: String,
    pixelate_input: String,
    input_dir: String,
    output_dir: String,
    contrast: String,
    colorscheme: String,
    colors: Option<Vec<String>>,
}

pub const PIXELATE_USAGE: &str = "Usage: image-filters pixelate <input_image.png> [block_size]\n\
Example: image-filters pixelate img/profile.png 16";

/// `~/.config/image-filters`, home of `config.toml` and `<scheme>.toml` files.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from(""))
        .join(".config/image-filters")
}

fn load_config(
    config_dir: &Path,
    config_path: Option<&str>,
) -> Result<SerializedAppConfig, config::ConfigError> {
    let mut builder = Config::builder()
        .set_default("block_size", DEFAULT_BLOCK_SIZE.to_string())?
        .set_default("pixelate_input", DEFAULT_PIXELATE_INPUT)?
        .set_default("input_dir", DEFAULT_INPUT_DIR)?
        .set_default("output_dir", DEFAULT_OUTPUT_DIR)?
        .set_default("contrast", DEFAULT_CONTRAST.to_string())?
        .set_default("colorscheme", DEFAULT_COLORSCHEME)?;

    let default_config_path = config_dir.join("config.toml");
    if default_config_path.exists() {
        builder = builder.add_source(File::from(default_config_path).required(false));
    }

    if let Some(path) = config_path {
        builder = builder.add_source(File::with_name(path).required(true));
    }

    builder.build()?.try_deserialize()
}

fn build_cli() -> Command<'static> {
    Command::new("Image Filters")
        .version(VERSION)
        .about("Pixel-art block averaging and gradient tritone recoloring")
        .after_help("Settings are read from ~/.config/image-filters/config.toml when present, then from --config, then from command line flags.\n\nA colorscheme is the name of a TOML file (minus the extension) in ~/.config/image-filters containing `colors = [\"#rrggbb\", ...]`. The built-in schemes are 'rgb' and 'coral'.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("/path/to/config.toml")
                .help("Sets a custom config file")
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            Command::new("pixelate")
                .about("Averages blocks of pixels into pixel art")
                .arg(
                    Arg::new("Image Path")
                        .help("Image to pixelate [default: img/avatar.png]")
                        .index(1),
                )
                .arg(
                    Arg::new("Block Size")
                        .help("Edge length of each pixel block [default: 16]")
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("tritone")
                .about("Maps image luminance onto a multi-color gradient")
                .arg(
                    Arg::new("Input Dir")
                        .short('i')
                        .long("input-dir")
                        .value_name("DIR")
                        .help("Directory of images to recolor [default: ./img]")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("Output Dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Where recolored PNGs are written [default: ./img/tritone]")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("Colors")
                        .long("colors")
                        .value_name("#RRGGBB,#RRGGBB,...")
                        .help("Comma-separated gradient stops, darkest first")
                        .takes_value(true)
                        .conflicts_with("Colorscheme"),
                )
                .arg(
                    Arg::new("Colorscheme")
                        .long("colorscheme")
                        .value_name("NAME")
                        .help("Named gradient to use instead of --colors")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("Contrast")
                        .long("contrast")
                        .value_name("FACTOR")
                        .help("Contrast around mid-gray, 1.0 leaves it unchanged [default: 1.5]")
                        .takes_value(true)
                        .allow_hyphen_values(true),
                ),
        )
}

fn parse_setting<T>(name: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("Failed to parse {}: {}", name, e))
}

fn resolve_pixelate(
    matches: &ArgMatches,
    config: &SerializedAppConfig,
) -> anyhow::Result<PixelateJob> {
    let input_path = matches
        .value_of("Image Path")
        .unwrap_or(&config.pixelate_input);
    let block_size = matches
        .value_of("Block Size")
        .unwrap_or(&config.block_size);

    Ok(PixelateJob {
        input_path: PathBuf::from(input_path),
        block_size: parse_setting("block_size", block_size)?,
    })
}

fn resolve_tritone(
    matches: &ArgMatches,
    config: &SerializedAppConfig,
    config_dir: &Path,
) -> anyhow::Result<TritoneJob> {
    let input_dir = matches
        .value_of("Input Dir")
        .unwrap_or(&config.input_dir);
    let output_dir = matches
        .value_of("Output Dir")
        .unwrap_or(&config.output_dir);
    let contrast = matches.value_of("Contrast").unwrap_or(&config.contrast);

    let colors = if let Some(list) = matches.value_of("Colors") {
        parse_color_list(list).context("Failed to parse --colors")?
    } else if let Some(name) = matches.value_of("Colorscheme") {
        load_colorscheme(name, config_dir)?
    } else if let Some(hexes) = &config.colors {
        parse_colors(&hexes[..]).context("Failed to parse colors from config")?
    } else {
        load_colorscheme(&config.colorscheme, config_dir)?
    };

    Ok(TritoneJob {
        input_dir: PathBuf::from(input_dir),
        output_dir: PathBuf::from(output_dir),
        options: TritoneOptions {
            colors,
            contrast: parse_setting("contrast", contrast)?,
        },
    })
}

/// Parses `args` (program name first) against settings layered over `config_dir`.
pub fn init_from<I, T>(args: I, config_dir: &Path) -> anyhow::Result<AppConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_cli().try_get_matches_from(args)?;
    let config = load_config(config_dir, matches.value_of("config"))?;

    match matches.subcommand() {
        Some(("pixelate", sub)) => Ok(AppConfig::Pixelate(resolve_pixelate(sub, &config)?)),
        Some(("tritone", sub)) => Ok(AppConfig::Tritone(resolve_tritone(
            sub, &config, config_dir,
        )?)),
        _ => Err(anyhow!("No subcommand given")),
    }
}

pub fn init() -> anyhow::Result<AppConfig> {
    init_from(std::env::args_os(), &config_dir())
}
