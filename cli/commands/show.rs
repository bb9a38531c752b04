use crate::cli_args::ShowArgs;
use crate::output;
use crate::workspace::Workspace;
use anyhow::Result;
use colored::*;
use promptpack_core::{Catalog, SelectionEngine};
use std::path::Path;

pub fn run(args: ShowArgs, _quiet: bool) -> Result<()> {
    let mut ws = Workspace::open(&args.project)?;
    let root = ws.root.clone();

    println!("{}", " Curated Tree ".green().bold().underline());
    print_tree(&mut ws.catalog, &ws.engine, &root, 0);

    println!();
    println!("{}", " Selected Snippets (ordered) ".green().bold().underline());
    if ws.registry.selected_names().is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (idx, snippet) in ws.registry.selected_snippets().iter().enumerate() {
        println!(
            "  {}. {} {}",
            idx + 1,
            snippet.name.cyan(),
            format!("(~{} tokens)", snippet.cost).dimmed()
        );
    }

    println!();
    println!("{}", " Available Snippets ".green().bold().underline());
    let available = ws.registry.available_names();
    if available.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for name in available {
        println!("  - {}", name.blue());
    }

    println!();
    output::print_estimate(ws.estimate());
    Ok(())
}

// Unlike the rendered artifact, the display keeps excluded subtrees visible
// and marks state per node, so the user can see what a toggle would flip.
fn print_tree(catalog: &mut Catalog, engine: &SelectionEngine, dir: &Path, level: usize) {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());
    println!("{}{} {}", "  ".repeat(level), marker(engine, dir), format!("{}/", name).bold());

    let listing = catalog.discover(dir);
    for file in &listing.files {
        let fname = match file.file_name() {
            Some(n) => n.to_string_lossy().into_owned(),
            None => continue,
        };
        println!("{}{} {}", "  ".repeat(level + 1), marker(engine, file), fname);
    }
    for sub in &listing.dirs {
        print_tree(catalog, engine, sub, level + 1);
    }
}

fn marker(engine: &SelectionEngine, path: &Path) -> ColoredString {
    if engine.effective_excluded(path) {
        "[x]".red()
    } else if engine.is_selected(path) {
        "[+]".green()
    } else {
        "[ ]".dimmed()
    }
}
