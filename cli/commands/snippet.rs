use crate::cli_args::{SnippetAction, SnippetArgs};
use crate::output;
use crate::workspace::Workspace;
use anyhow::Result;
use colored::*;

pub fn run(args: SnippetArgs, quiet: bool) -> Result<()> {
    let mut ws = Workspace::open(&args.project)?;

    match &args.action {
        SnippetAction::List => {
            list_pools(&ws);
            return Ok(());
        }
        SnippetAction::Use { name } => ws.registry.select(name)?,
        SnippetAction::Drop { name } => ws.registry.deselect(name)?,
        SnippetAction::Up { name } => ws.registry.move_up(name)?,
        SnippetAction::Down { name } => ws.registry.move_down(name)?,
    }

    ws.persist()?;
    if !quiet {
        list_pools(&ws);
        output::print_estimate(ws.estimate());
    }
    Ok(())
}

fn list_pools(ws: &Workspace) {
    println!("{}", " Selected (ordered) ".green().bold().underline());
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

    println!("{}", " Available ".green().bold().underline());
    let available = ws.registry.available_names();
    if available.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for name in available {
        println!("  - {}", name.blue());
    }
}
