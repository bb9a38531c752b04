use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use colored::*;
use promptpack_core::AppError;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

use crate::cli_args::{Cli, CompletionArgs};

pub fn run(args: &CompletionArgs, quiet: bool) -> Result<()> {
    let shell_str = args.shell.as_deref().unwrap_or("bash");
    let shell: Shell = match shell_str.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        _ => {
            anyhow::bail!(AppError::InvalidArgument(format!(
                "Unsupported shell for completion: {}",
                shell_str
            )));
        }
    };

    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    if !args.save {
        generate(shell, &mut command, bin_name, &mut io::stdout());
        return Ok(());
    }

    let (save_dir, filename) = save_location(shell, &bin_name)?;
    fs::create_dir_all(&save_dir)
        .with_context(|| format!("Failed to create directory {}", save_dir.display()))?;
    let save_path = save_dir.join(filename);
    let mut file = File::create(&save_path)
        .with_context(|| format!("Failed to create file {}", save_path.display()))?;
    generate(shell, &mut command, bin_name, &mut file);

    if !quiet {
        println!(
            "{} {} completions saved to: {}",
            "✅".green(),
            shell_str.cyan(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}

fn save_location(shell: Shell, bin_name: &str) -> Result<(PathBuf, String)> {
    let dir = match shell {
        Shell::Bash => dirs::config_dir().map(|p| p.join("bash_completion.d")),
        Shell::Zsh => dirs::data_local_dir().map(|p| p.join("zsh").join("site-functions")),
        Shell::Fish => dirs::config_dir().map(|p| p.join("fish").join("completions")),
        _ => None,
    }
    .ok_or_else(|| anyhow::anyhow!("Could not determine standard completion directory."))?;

    let filename = match shell {
        Shell::Bash => format!("{}.bash", bin_name),
        Shell::Zsh => format!("_{}", bin_name),
        Shell::Fish => format!("{}.fish", bin_name),
        _ => unreachable!(),
    };
    Ok((dir, filename))
}
