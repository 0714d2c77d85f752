use image_filters::config::{init, PIXELATE_USAGE};
use image_filters::logging::init_logging;
use image_filters::pixelate::{load_image, pixelate_both};
use image_filters::tritone::run_batch;
use image_filters::{AppConfig, PixelateError, PixelateJob, TritoneJob};

use std::process::ExitCode;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;

fn main() -> ExitCode {
    init_logging("image_filters=info");

    let config = match init() {
        Ok(config) => config,
        Err(e) => {
            if let Some(clap_error) = e.downcast_ref::<clap::Error>() {
                clap_error.exit();
            }
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match config {
        AppConfig::Pixelate(job) => run_pixelate(&job),
        AppConfig::Tritone(job) => run_tritone(&job),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(PixelateError::InputNotFound(_)) = e.downcast_ref::<PixelateError>() {
                eprintln!("Error: {}", e);
                eprintln!("{}", PIXELATE_USAGE);
            } else {
                error!("{:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run_pixelate(job: &PixelateJob) -> anyhow::Result<()> {
    let (img, info) = load_image(&job.input_path)?;

    println!("\nImage Analysis:");
    println!("{}", info);
    println!(
        "\nCreating pixel art with {}x{} blocks...",
        job.block_size, job.block_size
    );

    let outputs = pixelate_both(&img, &job.input_path, job.block_size)?;
    println!("✓ Pixel art saved to: {}", outputs.full.display());
    println!("✓ Small version saved to: {}", outputs.small.display());
    Ok(())
}

fn run_tritone(job: &TritoneJob) -> anyhow::Result<()> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = run_batch(&job.input_dir, &job.output_dir, &job.options, &pb).with_context(
        || format!("Tritone batch over {} failed", job.input_dir.display()),
    )?;

    let succeeded = report.succeeded().count();
    let failed = report.failed().count();
    println!(
        "Processed {} image(s) into {}: {} saved, {} failed",
        succeeded + failed,
        job.output_dir.display(),
        succeeded,
        failed
    );
    for outcome in report.failed() {
        if let Err(e) = &outcome.result {
            println!("  {}: {}", outcome.input.display(), e);
        }
    }
    Ok(())
}
