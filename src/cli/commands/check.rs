//! OCR engine check command.

use console::style;

use crate::config::Settings;
use crate::ocr::{OcrBackend, TesseractBackend};

/// Report whether the configured OCR engine can run.
pub fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let tesseract = TesseractBackend::with_config(settings.ocr_config());

    println!("\n{}", style("OCR Engine Status").bold());
    println!("{}", "-".repeat(50));

    let status = if tesseract.is_available() {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    };
    println!("  {:<15} {}", tesseract.name(), status);
    println!("  {:<15} {}", "language", settings.language);
    println!("  {:<15} {}s", "timeout", settings.ocr_timeout.as_secs());
    println!("  {:<15} {}", "temp dir", settings.temp_dir.display());
    println!("\n  {}", style(tesseract.availability_hint()).dim());

    if !tesseract.is_available() {
        anyhow::bail!("OCR engine is not available");
    }
    Ok(())
}
