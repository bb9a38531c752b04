use crate::error::{AppError, Result};
use crate::session::SessionSnapshot;
use crate::snippets::SnippetRegistry;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<String>,
    discovered: bool,
    selected: bool,
    excluded: bool,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<String>) -> Self {
        Self {
            kind,
            parent,
            discovered: false,
            selected: false,
            excluded: false,
        }
    }
}

/// Lexically normalizes a path into the string key used by the engine's state
/// maps. Does not touch the filesystem, so unknown and not-yet-created paths
/// normalize the same way as discovered ones.
pub fn normalize_path(path: &Path) -> String {
    let mut normalized = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized.to_string_lossy().into_owned()
}

/// Tri-state membership map over every discovered path, plus the propagation
/// rules that cascade include/exclude decisions through the tree.
///
/// Every mutation goes through `set_selected`/`set_excluded`, which enforce
/// that `selected` and `excluded` are never both true for a path.
pub struct SelectionEngine {
    root: String,
    nodes: IndexMap<String, Node>,
}

impl SelectionEngine {
    pub fn new(root: &Path) -> Self {
        let root_key = normalize_path(root);
        let mut nodes = IndexMap::new();
        nodes.insert(root_key.clone(), Node::new(NodeKind::Directory, None));
        log::debug!("Selection engine initialized with root: {}", root_key);
        Self {
            root: root_key,
            nodes,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.nodes.contains_key(&normalize_path(path))
    }

    pub fn kind_of(&self, path: &Path) -> Option<NodeKind> {
        self.nodes.get(&normalize_path(path)).map(|n| n.kind)
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.nodes
            .get(&normalize_path(path))
            .is_some_and(|n| n.selected)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.nodes
            .get(&normalize_path(path))
            .is_some_and(|n| n.excluded)
    }

    pub fn is_discovered(&self, path: &Path) -> bool {
        self.nodes
            .get(&normalize_path(path))
            .is_some_and(|n| n.discovered)
    }

    // The two primitive setters. Mutual exclusivity of the flags is enforced
    // here and nowhere else; no reconciliation pass exists.
    fn set_selected(&mut self, key: &str, on: bool) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.selected = on;
            if on {
                node.excluded = false;
            }
        }
    }

    fn set_excluded(&mut self, key: &str, on: bool) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.excluded = on;
            if on {
                node.selected = false;
            }
        }
    }

    fn descendant_keys(&self, key: &str) -> Vec<String> {
        let base = Path::new(key);
        self.nodes
            .keys()
            .filter(|k| k.as_str() != key && Path::new(k).starts_with(base))
            .cloned()
            .collect()
    }

    /// Registers freshly enumerated children of `parent` and replays the
    /// parent's last directory-level decision onto them, so lazily-discovered
    /// subtrees inherit a cascade that predates their existence. Children
    /// already known are left untouched.
    pub fn on_discovered(&mut self, parent: &Path, dirs: &[PathBuf], files: &[PathBuf]) -> Result<()> {
        let parent_key = normalize_path(parent);
        let (parent_selected, parent_excluded) = match self.nodes.get_mut(&parent_key) {
            Some(node) => {
                node.discovered = true;
                (node.selected, node.excluded)
            }
            None => return Err(AppError::UnknownPath(parent_key)),
        };

        let children = dirs
            .iter()
            .map(|p| (p, NodeKind::Directory))
            .chain(files.iter().map(|p| (p, NodeKind::File)));

        for (path, kind) in children {
            let key = normalize_path(path);
            if self.nodes.contains_key(&key) {
                log::trace!("Already known, skipping re-registration: {}", key);
                continue;
            }
            let mut node = Node::new(kind, Some(parent_key.clone()));
            if parent_excluded {
                node.excluded = true;
            } else if parent_selected {
                node.selected = true;
            }
            log::trace!(
                "Registered {} (inherited selected={}, excluded={})",
                key,
                node.selected,
                node.excluded
            );
            self.nodes.insert(key, node);
        }
        Ok(())
    }

    /// Toggles inclusion. Selecting a directory broadcasts the selection to
    /// every currently-discovered descendant; deselecting cascades the clear
    /// the same way. The directory flag records the last bulk action and is
    /// not kept in sync with children that diverge afterwards.
    pub fn toggle_include(&mut self, path: &Path) -> Result<()> {
        let key = normalize_path(path);
        let node = self
            .nodes
            .get(&key)
            .ok_or_else(|| AppError::UnknownPath(key.clone()))?;
        let is_dir = node.kind == NodeKind::Directory;
        let turning_on = !node.selected;

        self.set_selected(&key, turning_on);
        if is_dir {
            for desc in self.descendant_keys(&key) {
                self.set_selected(&desc, turning_on);
            }
        }
        log::debug!(
            "toggle_include: {} -> selected={} (cascade={})",
            key,
            turning_on,
            is_dir
        );
        Ok(())
    }

    /// Toggles exclusion. Exclusion always wins: setting it forces `selected`
    /// off on the path and every discovered descendant. Clearing it removes
    /// the mark from the path and its discovered descendants without
    /// re-selecting anything.
    pub fn toggle_exclude(&mut self, path: &Path) -> Result<()> {
        let key = normalize_path(path);
        let node = self
            .nodes
            .get(&key)
            .ok_or_else(|| AppError::UnknownPath(key.clone()))?;
        let is_dir = node.kind == NodeKind::Directory;
        let turning_on = !node.excluded;

        self.set_excluded(&key, turning_on);
        if is_dir {
            for desc in self.descendant_keys(&key) {
                self.set_excluded(&desc, turning_on);
                if !turning_on {
                    self.set_selected(&desc, false);
                }
            }
        } else if !turning_on {
            self.set_selected(&key, false);
        }
        log::debug!(
            "toggle_exclude: {} -> excluded={} (cascade={})",
            key,
            turning_on,
            is_dir
        );
        Ok(())
    }

    /// True if the path or any ancestor up to the tree root carries a direct
    /// exclusion mark. Computed by walking ancestors at query time; a node's
    /// own flag may be stale relative to a later ancestor toggle.
    pub fn effective_excluded(&self, path: &Path) -> bool {
        let mut cur = normalize_path(path);
        loop {
            match self.nodes.get(&cur) {
                Some(node) => {
                    if node.excluded {
                        return true;
                    }
                    match &node.parent {
                        Some(parent) => cur = parent.clone(),
                        None => return false, // reached the tree root
                    }
                }
                None => {
                    // Not yet discovered (e.g. queried during a render walk):
                    // climb lexical parents until a known ancestor is found.
                    if cur == self.root {
                        return false;
                    }
                    match Path::new(&cur).parent() {
                        Some(parent) => cur = normalize_path(parent),
                        None => return false,
                    }
                }
            }
        }
    }

    /// All file paths selected and not effectively excluded, sorted.
    pub fn selected_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.kind == NodeKind::File && n.selected)
            .map(|(k, _)| k.clone())
            .filter(|k| !self.effective_excluded(Path::new(k)))
            .collect();
        files.sort();
        files
    }

    /// The literal exclusion set (direct flags only), as persisted. Inherited
    /// exclusion is a query concern, not part of this set.
    pub fn excluded_paths(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.excluded)
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn flagged_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.kind == NodeKind::File && n.selected)
            .map(|(k, _)| k.clone())
            .collect();
        files.sort();
        files
    }

    fn flagged_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.kind == NodeKind::Directory && n.selected)
            .map(|(k, _)| k.clone())
            .collect();
        dirs.sort();
        dirs
    }

    /// Resets every flag and empties the selected-snippet order. Discovered
    /// nodes are kept.
    pub fn clear_all(&mut self, registry: &mut SnippetRegistry) {
        for node in self.nodes.values_mut() {
            node.selected = false;
            node.excluded = false;
        }
        registry.clear_selection();
        log::debug!("Cleared all selection and exclusion state.");
    }

    pub fn snapshot(&self, registry: &SnippetRegistry) -> SessionSnapshot {
        SessionSnapshot {
            excluded_paths: self.excluded_paths().into_iter().collect(),
            selected_files: self.flagged_files(),
            selected_dirs: self.flagged_dirs(),
            selected_prompts: registry.selected_names().to_vec(),
        }
    }

    /// Rebuilds state from a snapshot. Flags are set directly (no cascade);
    /// paths unknown to the live node set and snippet names unknown to the
    /// registry are silently dropped.
    pub fn restore(&mut self, snapshot: &SessionSnapshot, registry: &mut SnippetRegistry) {
        self.clear_all(registry);

        for path in &snapshot.excluded_paths {
            let key = normalize_path(Path::new(path));
            if self.nodes.contains_key(&key) {
                self.set_excluded(&key, true);
            } else {
                log::trace!("Dropping unknown excluded path from snapshot: {}", key);
            }
        }
        for path in snapshot
            .selected_files
            .iter()
            .chain(snapshot.selected_dirs.iter())
        {
            let key = normalize_path(Path::new(path));
            if self.nodes.contains_key(&key) {
                self.set_selected(&key, true);
            } else {
                log::trace!("Dropping unknown selected path from snapshot: {}", key);
            }
        }
        for name in &snapshot.selected_prompts {
            if registry.select(name).is_err() {
                log::trace!("Dropping unknown snippet name from snapshot: {}", name);
            }
        }
        log::debug!(
            "Restored session: {} excluded, {} selected files, {} selected dirs, {} snippets",
            snapshot.excluded_paths.len(),
            snapshot.selected_files.len(),
            snapshot.selected_dirs.len(),
            registry.selected_names().len()
        );
    }
}
