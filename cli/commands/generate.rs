use crate::cli_args::GenerateArgs;
use crate::output;
use crate::workspace::Workspace;
use anyhow::{Context, Result};
use colored::Colorize;
use promptpack_core::{AppError, render_output};
use std::fs;
use std::path::PathBuf;

pub fn run(args: GenerateArgs, quiet: bool) -> Result<()> {
    let mut ws = Workspace::open(&args.project)?;

    for spec in &args.inject {
        let (name, path) = parse_inject(spec)?;
        let path = ws.resolve_arg(&path);
        let body = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read inject source {}", path.display()))?;
        ws.registry.register_dynamic(&name, body);
        ws.registry.select(&name)?;
        log::info!("Injected dynamic snippet '{}' from {}", name, path.display());
    }

    let artifact = render_output(&ws.engine, &mut ws.catalog, &ws.registry);
    let estimate = ws.estimate();

    if args.stdout {
        output::write_to_stdout(&artifact)?;
        if !quiet {
            eprintln!("Estimated Tokens: {}", estimate);
        }
    } else {
        let target = match &args.output {
            Some(path) => ws.resolve_arg(path),
            None => ws.config.output_path(&ws.root),
        };
        output::write_to_file(&target, &artifact)?;
        if !quiet {
            println!(
                "{} Context written to: {}",
                "✅".green(),
                target.display().to_string().blue()
            );
            output::print_estimate(estimate);
        }
    }

    // Generating also records the session, so the curated set that produced
    // the artifact is what the next invocation starts from.
    ws.persist()?;
    Ok(())
}

fn parse_inject(spec: &str) -> Result<(String, PathBuf)> {
    match spec.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => anyhow::bail!(AppError::InvalidArgument(format!(
            "--inject expects NAME=PATH, got '{}'",
            spec
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_spec_splits_on_first_equals() {
        let (name, path) = parse_inject("tables=dump/tables.json").unwrap();
        assert_eq!(name, "tables");
        assert_eq!(path, PathBuf::from("dump/tables.json"));

        let (name, path) = parse_inject("n=a=b").unwrap();
        assert_eq!(name, "n");
        assert_eq!(path, PathBuf::from("a=b"));
    }

    #[test]
    fn malformed_inject_specs_are_rejected() {
        assert!(parse_inject("no-separator").is_err());
        assert!(parse_inject("=path-only").is_err());
        assert!(parse_inject("name-only=").is_err());
    }
}
