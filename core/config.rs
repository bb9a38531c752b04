use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "promptpack.toml";
pub const DEFAULT_SESSION_FILENAME: &str = "promptpack.session.json";
pub const DEFAULT_OUTPUT_FILENAME: &str = "output.txt";
pub const DEFAULT_SNIPPET_DIR: &str = "prompts";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub snippets: SnippetsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Directory names (glob patterns) pruned at discovery time. Entries here
    /// never surface as nodes, unlike user-level exclusions.
    #[serde(default = "default_ignore_dirs")]
    pub ignore: Vec<String>,
    #[serde(default = "default_true")]
    pub use_gitignore: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SnippetsConfig {
    #[serde(default = "default_snippet_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default = "default_session_file")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_file")]
    pub file: PathBuf,
}

fn default_true() -> bool {
    true
}
fn default_ignore_dirs() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        ".next".to_string(),
        ".git".to_string(),
        "target".to_string(),
        DEFAULT_SNIPPET_DIR.to_string(),
    ]
}
fn default_snippet_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SNIPPET_DIR)
}
fn default_session_file() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_FILENAME)
}
fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILENAME)
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore_dirs(),
            use_gitignore: default_true(),
        }
    }
}
impl Default for SnippetsConfig {
    fn default() -> Self {
        Self {
            dir: default_snippet_dir(),
        }
    }
}
impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: default_output_file(),
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let expanded = shellexpand::tilde(p_str);
                let mut path = PathBuf::from(expanded.as_ref());
                if !path.is_absolute() {
                    path = project_root.join(path);
                }
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = project_root.join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        toml::from_str::<Config>(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    pub fn snippet_dir(&self, project_root: &Path) -> PathBuf {
        if self.snippets.dir.is_absolute() {
            self.snippets.dir.clone()
        } else {
            project_root.join(&self.snippets.dir)
        }
    }

    pub fn session_path(&self, project_root: &Path) -> PathBuf {
        if self.session.file.is_absolute() {
            self.session.file.clone()
        } else {
            project_root.join(&self.session.file)
        }
    }

    pub fn output_path(&self, project_root: &Path) -> PathBuf {
        if self.output.file.is_absolute() {
            self.output.file.clone()
        } else {
            project_root.join(&self.output.file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_empty_toml() {
        let parsed: Config = toml::from_str("").expect("empty config should parse");
        assert_eq!(parsed, Config::default());
        assert!(parsed.catalog.use_gitignore);
        assert!(parsed.catalog.ignore.contains(&"node_modules".to_string()));
    }

    #[test]
    fn partial_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [catalog]
            ignore = ["build"]

            [output]
            file = "context.txt"
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(parsed.catalog.ignore, vec!["build".to_string()]);
        assert!(parsed.catalog.use_gitignore);
        assert_eq!(parsed.output.file, PathBuf::from("context.txt"));
        assert_eq!(parsed.session.file, PathBuf::from(DEFAULT_SESSION_FILENAME));
    }

    #[test]
    fn unknown_section_key_is_rejected() {
        let result = toml::from_str::<Config>("[catalog]\nbogus = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn relative_paths_are_anchored_at_the_root() {
        let config = Config::default();
        let root = Path::new("/proj");
        assert_eq!(root.join("prompts"), config.snippet_dir(root));
        assert_eq!(root.join("output.txt"), config.output_path(root));
        assert_eq!(
            root.join(DEFAULT_SESSION_FILENAME),
            config.session_path(root)
        );
    }
}
