mod cli_args;
mod commands;
mod output;
mod workspace;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use std::process;

use cli_args::{Cli, Commands};
use promptpack_core::AppError;

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;
    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(AppError::Config(_)) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::SessionLoad(_)) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::Ignore(_)) => 2,
                Some(AppError::Glob(_)) => 2,
                Some(AppError::UnknownPath(_)) => 3,
                Some(AppError::UnknownSnippet(_)) => 3,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::JsonSerialize(_)) => 6,
                Some(AppError::TikToken(_)) => 8,
                Some(_) => 1,
                None => 1,
            };

            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Generate(args) => {
                log::debug!("Executing 'generate' command...");
                commands::generate::run(args, quiet)?;
            }
            Commands::Select(args) => {
                log::debug!("Executing 'select' command...");
                commands::toggle::run_select(args, quiet)?;
            }
            Commands::Exclude(args) => {
                log::debug!("Executing 'exclude' command...");
                commands::toggle::run_exclude(args, quiet)?;
            }
            Commands::Clear(args) => {
                log::debug!("Executing 'clear' command...");
                commands::toggle::run_clear(args, quiet)?;
            }
            Commands::Show(args) => {
                log::debug!("Executing 'show' command...");
                commands::show::run(args, quiet)?;
            }
            Commands::Snippet(args) => {
                log::debug!("Executing 'snippet' command...");
                commands::snippet::run(args, quiet)?;
            }
            Commands::Metrics(args) => {
                log::debug!("Executing 'metrics' command...");
                commands::metrics::run(args, quiet)?;
            }
            Commands::Completion(args) => {
                log::debug!("Executing 'completion' command...");
                commands::completion::run(&args, quiet)?;
            }
        },
    }
    Ok(())
}
