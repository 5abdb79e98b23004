//! JSON persistence for workspace files
//!
//! Atomic writes and typed reads for the config, directory and store files.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::errors::{BsdError, Result};
use crate::schemas::{DirectorySnapshot, EngineConfig};

use super::paths::{get_config_path, get_directory_path};

/// Read and deserialize a JSON file.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidJson` - If the file contains invalid JSON or does not match the schema
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BsdError::FileNotFound(format!("File not found: {}", path.display()))
        } else {
            BsdError::Io(e)
        }
    })?;

    serde_json::from_str(&content).map_err(|e| {
        BsdError::InvalidJson(format!("Invalid JSON in file {}: {}", path.display(), e))
    })
}

/// Write a value to a JSON file with pretty formatting.
///
/// Each write goes through its own temp file in the target directory, then
/// replaces the target in one rename.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content =
        serde_json::to_string_pretty(data).map_err(|e| BsdError::InvalidJson(e.to_string()))?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.write_all(b"\n")?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| BsdError::Io(e.error))?;

    Ok(())
}

/// Read a workspace file, falling back to the type's default when it is absent.
fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match read_json(path) {
        Err(BsdError::FileNotFound(_)) => Ok(T::default()),
        other => other,
    }
}

/// Read the engine configuration of a workspace, or defaults if absent.
pub fn read_config(root: &Path) -> Result<EngineConfig> {
    read_json_or_default(&get_config_path(root))
}

/// Read the identity snapshot of a workspace; an absent file is an empty directory.
pub fn read_directory(root: &Path) -> Result<DirectorySnapshot> {
    read_json_or_default(&get_directory_path(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::WORKSPACE_DIR;
    use tempfile::TempDir;

    #[test]
    fn test_read_json_file_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.json");

        let result: Result<EngineConfig> = read_json(&path);
        assert!(matches!(result.unwrap_err(), BsdError::FileNotFound(_)));
    }

    #[test]
    fn test_read_json_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("invalid.json");
        fs::write(&path, "not valid json {").unwrap();

        let result: Result<EngineConfig> = read_json(&path);
        assert!(matches!(result.unwrap_err(), BsdError::InvalidJson(_)));
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("config.json");

        let config = EngineConfig {
            max_chain_depth: 4,
            ..Default::default()
        };
        write_json(&path, &config).unwrap();
        assert!(path.exists());
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);

        let read: EngineConfig = read_json(&path).unwrap();
        assert_eq!(read, config);
    }

    #[test]
    fn test_parallel_writers_never_collide() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        std::thread::scope(|scope| {
            for depth in 1..=8usize {
                let path = &path;
                scope.spawn(move || {
                    let config = EngineConfig {
                        max_chain_depth: depth,
                        ..Default::default()
                    };
                    write_json(path, &config).unwrap();
                });
            }
        });

        let read: EngineConfig = read_json(&path).unwrap();
        assert!((1..=8).contains(&read.max_chain_depth));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_directory_default_when_missing() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(WORKSPACE_DIR)).unwrap();

        let snapshot = read_directory(temp.path()).unwrap();
        assert!(snapshot.companies.is_empty());
        assert!(snapshot.users.is_empty());
    }
}
