use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The serializable subset of engine state. Field names are the persisted
/// wire format; unknown fields in a loaded file are ignored and missing
/// fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub selected_files: Vec<String>,
    #[serde(default)]
    pub selected_dirs: Vec<String>,
    #[serde(default)]
    pub selected_prompts: Vec<String>,
}

impl SessionSnapshot {
    /// Read and parse failures surface as a single error; the caller's engine
    /// state is untouched on failure (no partial restore).
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| AppError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::SessionLoad(format!(
                "Error parsing session file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| AppError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Session saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_empty() {
        let snapshot: SessionSnapshot =
            serde_json::from_str(r#"{"selected_files": ["/p/a.txt"]}"#).unwrap();
        assert_eq!(snapshot.selected_files, vec!["/p/a.txt".to_string()]);
        assert!(snapshot.excluded_paths.is_empty());
        assert!(snapshot.selected_dirs.is_empty());
        assert!(snapshot.selected_prompts.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let snapshot: SessionSnapshot =
            serde_json::from_str(r#"{"selected_prompts": ["a.txt"], "future_field": 42}"#).unwrap();
        assert_eq!(snapshot.selected_prompts, vec!["a.txt".to_string()]);
    }

    #[test]
    fn save_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let snapshot = SessionSnapshot {
            excluded_paths: vec!["/p/skip".to_string()],
            selected_files: vec!["/p/a.txt".to_string()],
            selected_dirs: vec!["/p/sub".to_string()],
            selected_prompts: vec!["intro.txt".to_string()],
        };
        snapshot.save(&path).unwrap();
        assert_eq!(snapshot, SessionSnapshot::load(&path).unwrap());
    }

    #[test]
    fn malformed_file_is_a_single_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            SessionSnapshot::load(&path),
            Err(AppError::SessionLoad(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            SessionSnapshot::load(Path::new("/no/such/session.json")),
            Err(AppError::FileRead { .. })
        ));
    }
}
