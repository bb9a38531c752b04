use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

// --- Public Output Helpers ---

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn print_estimate(total: usize) {
    println!(
        "{} {}",
        "Estimated Tokens:".green(),
        total.to_string().cyan()
    );
}

pub fn print_metrics_table(metrics: &crate::commands::metrics::SelectionMetrics) {
    println!();
    println!("{}", " Selection Summary ".green().bold().underline());
    println!(
        "{:<20} {}",
        "Selected Files:".green(),
        metrics.total_files.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Total Lines:".green(),
        metrics.total_lines.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Total Size:".green(),
        metrics.total_bytes_readable.cyan()
    );
    println!(
        "{:<20} {}",
        "Snippet Tokens:".green(),
        metrics.snippet_tokens.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Est. Tokens:".green(),
        metrics.estimated_tokens.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Exact Tokens:".green(),
        metrics.exact_tokens.to_string().cyan()
    );

    if metrics.files_details.is_empty() {
        println!("\n{}", "(No files in the current selection)".yellow());
        return;
    }

    println!("\n{}", " File Details ".green().bold().underline());
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Green),
        Cell::new("Lines").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
        Cell::new("Est. Tokens").fg(Color::Green),
        Cell::new("Exact Tokens").fg(Color::Green),
    ]);
    for file in &metrics.files_details {
        table.add_row(vec![
            Cell::new(&file.path).fg(Color::Cyan),
            Cell::new(file.lines).set_alignment(comfy_table::CellAlignment::Right),
            Cell::new(&file.bytes_readable)
                .set_alignment(comfy_table::CellAlignment::Right)
                .fg(Color::DarkGrey),
            Cell::new(file.estimated_tokens).set_alignment(comfy_table::CellAlignment::Right),
            Cell::new(file.exact_tokens).set_alignment(comfy_table::CellAlignment::Right),
        ]);
    }
    println!("{table}");
    println!();
}
