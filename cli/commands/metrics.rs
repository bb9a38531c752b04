use crate::cli_args::MetricsArgs;
use crate::output::print_metrics_table;
use crate::workspace::Workspace;
use anyhow::Result;
use byte_unit::{Byte, UnitType};
use std::fs;
use std::path::Path;
use tiktoken_rs::cl100k_base;

pub struct SelectionMetrics {
    pub total_files: usize,
    pub total_lines: usize,
    pub total_bytes: u128,
    pub total_bytes_readable: String,
    pub snippet_tokens: usize,
    /// The engine's running chars/4 estimate.
    pub estimated_tokens: usize,
    /// BPE-exact count, shown for comparison only.
    pub exact_tokens: usize,
    pub files_details: Vec<FileMetrics>,
}

pub struct FileMetrics {
    pub path: String,
    pub lines: usize,
    pub bytes: usize,
    pub bytes_readable: String,
    pub estimated_tokens: usize,
    pub exact_tokens: usize,
}

pub fn run(args: MetricsArgs, quiet: bool) -> Result<()> {
    let ws = Workspace::open(&args.project)?;

    let selected = ws.engine.selected_files();
    if selected.is_empty() && ws.registry.selected_names().is_empty() {
        if !quiet {
            println!("Nothing selected; no metrics to calculate.");
        }
        return Ok(());
    }

    log::debug!("Calculating metrics for {} files...", selected.len());
    let metrics = calculate_metrics(&ws, &selected)?;
    print_metrics_table(&metrics);
    Ok(())
}

fn calculate_metrics(ws: &Workspace, selected: &[String]) -> Result<SelectionMetrics> {
    let bpe = cl100k_base()
        .map_err(|e| anyhow::anyhow!(promptpack_core::AppError::TikToken(e.to_string())))?;

    let mut total_lines = 0;
    let mut total_bytes: u128 = 0;
    let mut exact_tokens = 0;
    let mut files_details = Vec::new();

    for file in selected {
        let path = Path::new(file);
        let content = match fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                log::warn!("Skipping unreadable file in metrics: {} ({})", file, e);
                continue;
            }
        };

        let lines = content.lines().count();
        let bytes = content.len();
        let estimated = ws.catalog.token_estimate(path);
        let exact = bpe.encode_ordinary(&content).len();

        let relative = pathdiff::diff_paths(path, &ws.root)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .into_owned();

        total_lines += lines;
        total_bytes = total_bytes.saturating_add(bytes as u128);
        exact_tokens += exact;

        let readable = Byte::from_u128(bytes as u128)
            .unwrap_or_default()
            .get_appropriate_unit(UnitType::Binary)
            .to_string();
        files_details.push(FileMetrics {
            path: relative,
            lines,
            bytes,
            bytes_readable: readable,
            estimated_tokens: estimated,
            exact_tokens: exact,
        });
    }

    files_details.sort_by(|a, b| a.path.cmp(&b.path));

    let snippet_tokens = ws.registry.total_selected_cost();
    for snippet in ws.registry.selected_snippets() {
        exact_tokens += bpe.encode_ordinary(&snippet.body).len();
    }

    let total_bytes_readable = Byte::from_u128(total_bytes)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Binary)
        .to_string();

    Ok(SelectionMetrics {
        total_files: files_details.len(),
        total_lines,
        total_bytes,
        total_bytes_readable,
        snippet_tokens,
        estimated_tokens: ws.estimate(),
        exact_tokens,
        files_details,
    })
}
