use crate::cli_args::{ClearArgs, ToggleArgs};
use crate::output;
use crate::workspace::Workspace;
use anyhow::Result;
use colored::*;

pub fn run_select(args: ToggleArgs, quiet: bool) -> Result<()> {
    let mut ws = Workspace::open(&args.project)?;
    for path in &args.paths {
        let abs = ws.resolve_arg(path);
        ws.engine.toggle_include(&abs)?;
        if !quiet {
            let state = if ws.engine.is_selected(&abs) {
                "selected".green()
            } else {
                "unselected".yellow()
            };
            println!("{}: {}", abs.display(), state);
        }
    }
    ws.persist()?;
    if !quiet {
        output::print_estimate(ws.estimate());
    }
    Ok(())
}

pub fn run_exclude(args: ToggleArgs, quiet: bool) -> Result<()> {
    let mut ws = Workspace::open(&args.project)?;
    for path in &args.paths {
        let abs = ws.resolve_arg(path);
        ws.engine.toggle_exclude(&abs)?;
        if !quiet {
            let state = if ws.engine.is_excluded(&abs) {
                "excluded".red()
            } else {
                "not excluded".yellow()
            };
            println!("{}: {}", abs.display(), state);
        }
    }
    ws.persist()?;
    if !quiet {
        output::print_estimate(ws.estimate());
    }
    Ok(())
}

pub fn run_clear(args: ClearArgs, quiet: bool) -> Result<()> {
    let mut ws = Workspace::open(&args.project)?;
    ws.engine.clear_all(&mut ws.registry);
    ws.persist()?;
    if !quiet {
        println!("{}", "All selections, exclusions and snippets cleared.".green());
        output::print_estimate(ws.estimate());
    }
    Ok(())
}
