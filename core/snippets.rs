use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetSource {
    FromFile,
    Dynamic,
}

#[derive(Debug, Clone)]
pub struct Snippet {
    pub name: String,
    pub body: String,
    pub source: SnippetSource,
    /// Approximate token cost, fixed at registration time.
    pub cost: usize,
}

/// Rough estimate: 1 token ~ 4 chars.
pub fn token_cost(body: &str) -> usize {
    body.chars().count() / 4
}

/// Named text blocks with a precomputed size cost. The available pool is
/// unordered (rendered sorted by name); the selected list preserves insertion
/// and movement order, which is also the output order.
#[derive(Debug, Default)]
pub struct SnippetRegistry {
    snippets: BTreeMap<String, Snippet>,
    selected: Vec<String>,
}

impl SnippetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, name: &str, body: String, source: SnippetSource) {
        let cost = token_cost(&body);
        let snippet = Snippet {
            name: name.to_string(),
            body,
            source,
            cost,
        };
        // Overwriting an existing name replaces body and cost in place; its
        // position in the selected order, if any, is untouched.
        if self.snippets.insert(name.to_string(), snippet).is_some() {
            log::debug!("Overwrote snippet in place: {}", name);
        } else {
            log::trace!("Registered snippet: {}", name);
        }
    }

    pub fn register_from_file(&mut self, name: &str, body: String) {
        self.register(name, body, SnippetSource::FromFile);
    }

    /// Entry point for external exporters injecting a generated blob. The
    /// registry does not know or care about the blob's origin.
    pub fn register_dynamic(&mut self, name: &str, body: String) {
        self.register(name, body, SnippetSource::Dynamic);
    }

    /// Reads every file of the snippet directory once; the file name
    /// (including extension) is the snippet key. Returns the number of
    /// snippets loaded. A missing directory is not an error.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            log::debug!("Snippet directory not present: {}", dir.display());
            return Ok(0);
        }
        let mut loaded = 0;
        let mut entries: Vec<_> = fs::read_dir(dir)
            .map_err(|e| AppError::FileRead {
                path: dir.to_path_buf(),
                source: e,
            })?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .collect();
        entries.sort();

        for path in entries {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            match fs::read_to_string(&path) {
                Ok(body) => {
                    self.register_from_file(&name, body);
                    loaded += 1;
                }
                Err(e) => {
                    log::warn!("Skipping unreadable snippet '{}': {}", path.display(), e);
                }
            }
        }
        log::info!("Loaded {} snippets from {}", loaded, dir.display());
        Ok(loaded)
    }

    pub fn get(&self, name: &str) -> Option<&Snippet> {
        self.snippets.get(name)
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|n| n == name)
    }

    /// Appends the snippet to the selected order. Selecting an already
    /// selected name is a no-op.
    pub fn select(&mut self, name: &str) -> Result<()> {
        if !self.snippets.contains_key(name) {
            return Err(AppError::UnknownSnippet(name.to_string()));
        }
        if !self.is_selected(name) {
            self.selected.push(name.to_string());
            log::debug!("Selected snippet: {}", name);
        }
        Ok(())
    }

    /// Returns the snippet to the available pool; deselecting an unselected
    /// name is a no-op.
    pub fn deselect(&mut self, name: &str) -> Result<()> {
        if !self.snippets.contains_key(name) {
            return Err(AppError::UnknownSnippet(name.to_string()));
        }
        self.selected.retain(|n| n != name);
        Ok(())
    }

    pub fn move_up(&mut self, name: &str) -> Result<()> {
        if !self.snippets.contains_key(name) {
            return Err(AppError::UnknownSnippet(name.to_string()));
        }
        if let Some(idx) = self.selected.iter().position(|n| n == name) {
            if idx > 0 {
                self.selected.swap(idx, idx - 1);
            }
        }
        Ok(())
    }

    pub fn move_down(&mut self, name: &str) -> Result<()> {
        if !self.snippets.contains_key(name) {
            return Err(AppError::UnknownSnippet(name.to_string()));
        }
        if let Some(idx) = self.selected.iter().position(|n| n == name) {
            if idx + 1 < self.selected.len() {
                self.selected.swap(idx, idx + 1);
            }
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Selected names in output order.
    pub fn selected_names(&self) -> &[String] {
        &self.selected
    }

    /// Selected snippets in output order.
    pub fn selected_snippets(&self) -> Vec<&Snippet> {
        self.selected
            .iter()
            .filter_map(|name| self.snippets.get(name))
            .collect()
    }

    /// Names not currently selected, in sorted order.
    pub fn available_names(&self) -> Vec<&str> {
        self.snippets
            .keys()
            .filter(|name| !self.is_selected(name))
            .map(String::as_str)
            .collect()
    }

    pub fn total_selected_cost(&self) -> usize {
        self.selected_snippets().iter().map(|s| s.cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_is_floor_of_quarter_char_count() {
        assert_eq!(0, token_cost(""));
        assert_eq!(0, token_cost("abc"));
        assert_eq!(1, token_cost("abcd"));
        assert_eq!(10, token_cost(&"x".repeat(40)));
        assert_eq!(10, token_cost(&"x".repeat(43)));
    }

    #[test]
    fn selection_preserves_insertion_order_and_move_up_reorders() {
        let mut reg = SnippetRegistry::new();
        reg.register_dynamic("x", "one".into());
        reg.register_dynamic("y", "two".into());
        reg.select("x").unwrap();
        reg.select("y").unwrap();
        assert_eq!(reg.selected_names(), ["x", "y"]);
        reg.move_up("y").unwrap();
        assert_eq!(reg.selected_names(), ["y", "x"]);
    }

    #[test]
    fn moves_are_noops_at_the_boundaries() {
        let mut reg = SnippetRegistry::new();
        reg.register_dynamic("a", "aa".into());
        reg.register_dynamic("b", "bb".into());
        reg.select("a").unwrap();
        reg.select("b").unwrap();
        reg.move_up("a").unwrap();
        reg.move_down("b").unwrap();
        assert_eq!(reg.selected_names(), ["a", "b"]);
    }

    #[test]
    fn double_select_is_a_noop() {
        let mut reg = SnippetRegistry::new();
        reg.register_dynamic("a", "aa".into());
        reg.select("a").unwrap();
        reg.select("a").unwrap();
        assert_eq!(reg.selected_names(), ["a"]);
    }

    #[test]
    fn unknown_names_are_errors() {
        let mut reg = SnippetRegistry::new();
        assert!(matches!(
            reg.select("nope"),
            Err(AppError::UnknownSnippet(_))
        ));
        assert!(matches!(
            reg.move_up("nope"),
            Err(AppError::UnknownSnippet(_))
        ));
    }

    #[test]
    fn overwrite_keeps_selected_position_and_updates_cost() {
        let mut reg = SnippetRegistry::new();
        reg.register_from_file("guide.txt", "12345678".into());
        reg.register_dynamic("db-dump", "abcd".into());
        reg.select("guide.txt").unwrap();
        reg.select("db-dump").unwrap();

        reg.register_dynamic("guide.txt", "x".repeat(40));
        assert_eq!(reg.selected_names(), ["guide.txt", "db-dump"]);
        assert_eq!(reg.get("guide.txt").unwrap().cost, 10);
        assert_eq!(reg.get("guide.txt").unwrap().source, SnippetSource::Dynamic);
    }

    #[test]
    fn deselect_returns_name_to_sorted_pool() {
        let mut reg = SnippetRegistry::new();
        reg.register_dynamic("zeta", "zz".into());
        reg.register_dynamic("alpha", "aa".into());
        reg.select("zeta").unwrap();
        assert_eq!(reg.available_names(), ["alpha"]);
        reg.deselect("zeta").unwrap();
        assert_eq!(reg.available_names(), ["alpha", "zeta"]);
        assert!(reg.selected_names().is_empty());
    }

    #[test]
    fn total_cost_sums_only_selected_snippets() {
        let mut reg = SnippetRegistry::new();
        reg.register_dynamic("a", "x".repeat(40));
        reg.register_dynamic("b", "x".repeat(80));
        reg.select("a").unwrap();
        assert_eq!(reg.total_selected_cost(), 10);
        reg.select("b").unwrap();
        assert_eq!(reg.total_selected_cost(), 30);
    }

    #[test]
    fn load_dir_reads_files_with_extension_as_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("review.txt"), "review prompt").unwrap();
        std::fs::write(dir.path().join("style.md"), "style prompt").unwrap();
        let mut reg = SnippetRegistry::new();
        let loaded = reg.load_dir(dir.path()).unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(reg.available_names(), ["review.txt", "style.md"]);
        assert_eq!(
            reg.get("review.txt").unwrap().source,
            SnippetSource::FromFile
        );
    }

    #[test]
    fn load_dir_missing_directory_is_empty_not_fatal() {
        let mut reg = SnippetRegistry::new();
        let loaded = reg.load_dir(Path::new("/no/such/dir")).unwrap();
        assert_eq!(loaded, 0);
    }
}
