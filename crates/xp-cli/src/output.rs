//! Image and report output

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use image::{GrayImage, Luma};
use ndarray::Array2;
use serde::Serialize;

/// Map `image` linearly onto 0..=255, row 0 at the bottom
pub fn to_gray(image: &Array2<f64>) -> GrayImage {
    let (rows, cols) = image.dim();
    let min = image.iter().copied().fold(f64::INFINITY, f64::min);
    let max = image.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let v = image[[rows - 1 - y as usize, x as usize]];
        let level = if span > 0.0 { (v - min) / span } else { 0.0 };
        Luma([(level * 255.0).round() as u8])
    })
}

/// Write as PNG or JSON depending on the file extension
pub fn write_image(path: &Path, image: &Array2<f64>) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => to_gray(image)
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        Some("json") => write_json(path, image)?,
        _ => bail!(
            "Unsupported output format for {} (expected .png or .json)",
            path.display()
        ),
    }

    log::info!("Wrote {:?} image to {}", image.dim(), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}
