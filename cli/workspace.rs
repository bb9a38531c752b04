use anyhow::{Context, Result};
use promptpack_core::{Catalog, Config, SelectionEngine, SessionSnapshot, SnippetRegistry};
use std::path::{Path, PathBuf};

use crate::cli_args::ProjectOpts;

/// One opened project: configuration, eagerly scanned catalog, the selection
/// engine and the snippet registry, with the persisted session restored.
/// Commands mutate the engine/registry and call `persist` before returning.
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
    pub catalog: Catalog,
    pub engine: SelectionEngine,
    pub registry: SnippetRegistry,
}

impl Workspace {
    pub fn open(project: &ProjectOpts) -> Result<Self> {
        let root = Config::determine_project_root(project.project_root.as_ref())
            .context("Failed to determine project root")?;
        log::info!("Project root determined: {}", root.display());

        let config_path = Config::resolve_config_path(
            &root,
            project.config_file.as_ref(),
            project.disable_config_file,
        )
        .context("Failed to resolve configuration path")?;
        let config = match &config_path {
            Some(path) => Config::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        let mut catalog =
            Catalog::new(root.clone(), &config).context("Failed to build filesystem catalog")?;
        let mut engine = SelectionEngine::new(&root);
        catalog
            .scan_into(&mut engine)
            .context("Failed to scan project tree")?;

        let mut registry = SnippetRegistry::new();
        registry
            .load_dir(&config.snippet_dir(&root))
            .context("Failed to load snippet directory")?;

        let session_path = config.session_path(&root);
        if session_path.exists() {
            let snapshot = SessionSnapshot::load(&session_path).with_context(|| {
                format!("Failed to load session from {}", session_path.display())
            })?;
            engine.restore(&snapshot, &mut registry);
        } else {
            log::debug!("No session file at {}", session_path.display());
        }

        Ok(Self {
            root,
            config,
            catalog,
            engine,
            registry,
        })
    }

    pub fn persist(&self) -> Result<()> {
        let session_path = self.config.session_path(&self.root);
        self.engine
            .snapshot(&self.registry)
            .save(&session_path)
            .with_context(|| format!("Failed to save session to {}", session_path.display()))?;
        Ok(())
    }

    /// User-supplied path arguments may be relative to the project root.
    pub fn resolve_arg(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn estimate(&self) -> usize {
        promptpack_core::estimate_tokens(&self.engine, &self.catalog, &self.registry)
    }
}
