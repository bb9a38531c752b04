use crate::config::Config;
use crate::engine::{SelectionEngine, normalize_path};
use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One directory level, lexicographically sorted, directories first.
#[derive(Debug, Clone, Default)]
pub struct DirListing {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl DirListing {
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}

/// Enumerates directory entries on demand, pruning policy-ignored names at
/// discovery time so they never surface as nodes. Also owns the per-file
/// token estimates, computed once when a file is first discovered.
pub struct Catalog {
    root: PathBuf,
    ignore_set: GlobSet,
    gitignore: Option<Gitignore>,
    token_counts: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(root: PathBuf, config: &Config) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.catalog.ignore {
            let glob = Glob::new(pattern.trim()).map_err(|e| {
                crate::error::AppError::Glob(format!("Invalid ignore pattern \"{}\": {}", pattern, e))
            })?;
            builder.add(glob);
        }
        let ignore_set = builder.build()?;

        let gitignore_file = root.join(".gitignore");
        let gitignore = if config.catalog.use_gitignore && gitignore_file.is_file() {
            let mut gi_builder = GitignoreBuilder::new(&root);
            if let Some(e) = gi_builder.add(&gitignore_file) {
                log::warn!("Failed to read {}: {}", gitignore_file.display(), e);
            }
            Some(gi_builder.build()?)
        } else {
            None
        };
        log::debug!(
            "Catalog created for {} ({} ignore patterns, gitignore: {})",
            root.display(),
            config.catalog.ignore.len(),
            gitignore.is_some()
        );

        Ok(Self {
            root,
            ignore_set,
            gitignore,
            token_counts: HashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn gitignored(&self, path: &Path, is_dir: bool) -> bool {
        let Some(gitignore) = &self.gitignore else {
            return false;
        };
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        gitignore.matched(rel, is_dir).is_ignore()
    }

    /// Enumerates one directory level. Enumeration failures (permissions,
    /// vanished directory) are never fatal; the directory is treated as
    /// having zero children. Re-discovery is idempotent.
    pub fn discover(&mut self, dir: &Path) -> DirListing {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot enumerate {}: {}", dir.display(), e);
                return DirListing::default();
            }
        };

        let mut listing = DirListing::default();
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            if is_dir && self.ignore_set.is_match(&name) {
                log::trace!("Pruned by ignore policy: {}", path.display());
                continue;
            }
            if self.gitignored(&path, is_dir) {
                log::trace!("Pruned by gitignore: {}", path.display());
                continue;
            }
            if is_dir {
                listing.dirs.push(path);
            } else {
                listing.files.push(path);
            }
        }
        listing.dirs.sort();
        listing.files.sort();

        self.cache_token_counts(&listing.files);
        listing
    }

    fn cache_token_counts(&mut self, files: &[PathBuf]) {
        let missing: Vec<PathBuf> = files
            .iter()
            .filter(|p| !self.token_counts.contains_key(&normalize_path(p)))
            .cloned()
            .collect();
        if missing.is_empty() {
            return;
        }
        let counted: Vec<(String, usize)> = missing
            .into_par_iter()
            .map(|path| {
                let estimate = match fs::read(&path) {
                    Ok(bytes) => crate::snippets::token_cost(&String::from_utf8_lossy(&bytes)),
                    Err(e) => {
                        log::debug!("Cannot read {} for estimate: {}", path.display(), e);
                        0
                    }
                };
                (normalize_path(&path), estimate)
            })
            .collect();
        self.token_counts.extend(counted);
    }

    /// Cached `chars/4` estimate for a discovered file; 0 for unknown paths.
    pub fn token_estimate(&self, path: &Path) -> usize {
        self.token_counts
            .get(&normalize_path(path))
            .copied()
            .unwrap_or(0)
    }

    /// Eagerly enumerates the whole tree, feeding each directory's children
    /// to the engine as a discovery event.
    pub fn scan_into(&mut self, engine: &mut SelectionEngine) -> Result<()> {
        let mut queue = vec![self.root.clone()];
        while let Some(dir) = queue.pop() {
            let listing = self.discover(&dir);
            engine.on_discovered(&dir, &listing.dirs, &listing.files)?;
            queue.extend(listing.dirs);
        }
        log::info!(
            "Eager scan complete: {} file estimates cached",
            self.token_counts.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_for(root: &Path) -> Catalog {
        Catalog::new(root.to_path_buf(), &Config::default()).unwrap()
    }

    #[test]
    fn listing_is_sorted_directories_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let mut catalog = catalog_for(dir.path());
        let listing = catalog.discover(dir.path());
        assert_eq!(
            listing.dirs,
            vec![dir.path().join("alpha"), dir.path().join("zeta")]
        );
        assert_eq!(
            listing.files,
            vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
        );
    }

    #[test]
    fn policy_ignored_directories_are_invisible() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::create_dir(dir.path().join("prompts")).unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();

        let mut catalog = catalog_for(dir.path());
        let listing = catalog.discover(dir.path());
        assert_eq!(listing.dirs, vec![dir.path().join("src")]);
    }

    #[test]
    fn ignore_patterns_only_apply_to_directory_names() {
        let dir = tempfile::tempdir().unwrap();
        // A file that happens to share an ignored directory name stays visible.
        fs::write(dir.path().join("target"), "not a dir").unwrap();

        let mut catalog = catalog_for(dir.path());
        let listing = catalog.discover(dir.path());
        assert_eq!(listing.files, vec![dir.path().join("target")]);
    }

    #[test]
    fn missing_directory_yields_zero_children() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = catalog_for(dir.path());
        let listing = catalog.discover(&dir.path().join("does-not-exist"));
        assert!(listing.is_empty());
    }

    #[test]
    fn gitignored_entries_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "secret.txt\nbuild/\n").unwrap();
        fs::write(dir.path().join("secret.txt"), "hidden").unwrap();
        fs::write(dir.path().join("kept.txt"), "kept").unwrap();
        fs::create_dir(dir.path().join("build")).unwrap();

        let mut catalog = catalog_for(dir.path());
        let listing = catalog.discover(dir.path());
        assert!(listing.dirs.is_empty());
        assert_eq!(
            listing.files,
            vec![dir.path().join(".gitignore"), dir.path().join("kept.txt")]
        );
    }

    #[test]
    fn token_estimates_are_cached_at_discovery() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x".repeat(40)).unwrap();

        let mut catalog = catalog_for(dir.path());
        assert_eq!(catalog.token_estimate(&dir.path().join("a.txt")), 0);
        catalog.discover(dir.path());
        assert_eq!(catalog.token_estimate(&dir.path().join("a.txt")), 10);
    }

    #[test]
    fn eager_scan_registers_the_whole_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/inner.txt"), "inner").unwrap();
        fs::write(dir.path().join("top.txt"), "top").unwrap();

        let mut catalog = catalog_for(dir.path());
        let mut engine = SelectionEngine::new(dir.path());
        catalog.scan_into(&mut engine).unwrap();

        assert!(engine.contains(&dir.path().join("sub")));
        assert!(engine.contains(&dir.path().join("sub/inner.txt")));
        assert!(engine.contains(&dir.path().join("top.txt")));
        assert!(engine.is_discovered(&dir.path().join("sub")));
    }
}
