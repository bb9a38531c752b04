use crate::catalog::Catalog;
use crate::engine::SelectionEngine;
use crate::snippets::SnippetRegistry;
use std::fs;
use std::path::Path;

const INDENT_WIDTH: usize = 4;

/// Serializes the current resolved state into the final artifact: selected
/// snippet bodies in order, the directory-tree listing, then each selected
/// file's content. A pure function of the three collaborators at a point in
/// time; per-file read failures become inline markers, never aborts.
pub fn render_output(
    engine: &SelectionEngine,
    catalog: &mut Catalog,
    registry: &SnippetRegistry,
) -> String {
    let mut out = String::new();

    for snippet in registry.selected_snippets() {
        out.push_str("```\n");
        out.push_str(&snippet.body);
        out.push_str("\n```\n\n");
    }

    out.push_str("Directory Structure:\n");
    let root = catalog.root().to_path_buf();
    render_tree(&mut out, engine, catalog, &root, 0);

    let selected = engine.selected_files();
    if selected.is_empty() {
        out.push_str("\nNo code files selected for inclusion\n");
        return out;
    }

    out.push_str("\nImportant Code Files:\n\n");
    for file in &selected {
        let path = Path::new(file);
        let relative = pathdiff::diff_paths(path, &root).unwrap_or_else(|| path.to_path_buf());
        out.push_str(&format!("File: {}\n```\n", relative.display()));
        match fs::read(path) {
            Ok(bytes) => {
                out.push_str(&String::from_utf8_lossy(&bytes));
                out.push_str("\n```\n\n");
            }
            Err(e) => {
                log::warn!("Failed to read {} during render: {}", path.display(), e);
                out.push_str(&format!("Error reading file: {}\n```\n\n", e));
            }
        }
    }
    out
}

// Depth-first walk; effectively-excluded paths are pruned entirely rather
// than marked. Files are listed under their directory header, then each
// subdirectory gets its own block.
fn render_tree(
    out: &mut String,
    engine: &SelectionEngine,
    catalog: &mut Catalog,
    dir: &Path,
    level: usize,
) {
    if engine.effective_excluded(dir) {
        return;
    }
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());
    out.push_str(&" ".repeat(INDENT_WIDTH * level));
    out.push_str(&name);
    out.push_str("/\n");

    let listing = catalog.discover(dir);
    let subindent = " ".repeat(INDENT_WIDTH * (level + 1));
    for file in &listing.files {
        if engine.effective_excluded(file) {
            continue;
        }
        if let Some(fname) = file.file_name() {
            out.push_str(&subindent);
            out.push_str(&fname.to_string_lossy());
            out.push('\n');
        }
    }
    for sub in &listing.dirs {
        render_tree(out, engine, catalog, sub, level + 1);
    }
}

/// Running size estimate: selected snippet costs plus the cached per-file
/// estimates of every currently selected file. Approximate by design.
pub fn estimate_tokens(
    engine: &SelectionEngine,
    catalog: &Catalog,
    registry: &SnippetRegistry,
) -> usize {
    let file_tokens: usize = engine
        .selected_files()
        .iter()
        .map(|f| catalog.token_estimate(Path::new(f)))
        .sum();
    registry.total_selected_cost() + file_tokens
}
