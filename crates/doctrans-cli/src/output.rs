use std::io::Write;
use std::path::Path;

use doctrans_core::{ExtractedText, PipelineError, TranslatedText};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the one-line summary after extraction.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    file_name: &str,
    text: &ExtractedText,
    color: ColorMode,
) -> std::io::Result<()> {
    let summary = format!("Extracted {} characters from {}", text.char_count(), file_name);
    if color.enabled() {
        writeln!(w, "{}", summary.dimmed())
    } else {
        writeln!(w, "{}", summary)
    }
}

/// Print the confirmation after the translation has been saved.
pub fn print_saved(
    w: &mut dyn Write,
    path: &Path,
    translated: &TranslatedText,
    color: ColorMode,
) -> std::io::Result<()> {
    let chars = translated.as_str().chars().count();
    if color.enabled() {
        writeln!(
            w,
            "{} {} ({} characters)",
            "Saved".green().bold(),
            path.display().bold(),
            chars
        )
    } else {
        writeln!(w, "Saved {} ({} characters)", path.display(), chars)
    }
}

/// Print a pipeline failure. The error's own message names the stage.
pub fn print_failure(w: &mut dyn Write, err: &PipelineError, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "error:".red().bold(), err)
    } else {
        writeln!(w, "error: {}", err)
    }
}
