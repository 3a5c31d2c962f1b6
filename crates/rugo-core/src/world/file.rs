//! Save file format and atomic file replacement

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::WorldError;
use crate::gadget::GadgetSaveRecord;

/// Current save format version
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Contents of one save file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    #[serde(default)]
    pub version: u32,
    /// Gadgets in world order
    #[serde(default)]
    pub gadgets: Vec<GadgetSaveRecord>,
}

impl SaveFile {
    pub fn new(gadgets: Vec<GadgetSaveRecord>) -> Self {
        Self {
            version: SAVE_FORMAT_VERSION,
            gadgets,
        }
    }

    /// Read and parse a save file
    pub fn read(path: &Path) -> Result<Self, WorldError> {
        if !path.is_file() {
            return Err(WorldError::MissingSaveFile(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| WorldError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let file: SaveFile = ron::from_str(&content).map_err(|e| WorldError::Serialization {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if file.version > SAVE_FORMAT_VERSION {
            tracing::warn!(
                "Save file {:?} has newer format version {} (supported: {})",
                path,
                file.version,
                SAVE_FORMAT_VERSION
            );
        }

        Ok(file)
    }

    /// Write the file through a temporary sibling, then rename it into place
    pub fn write(&self, path: &Path) -> Result<(), WorldError> {
        let io_err = |e: std::io::Error| WorldError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| WorldError::Serialization {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let tmp = temp_path(path);
        std::fs::write(&tmp, &content).map_err(io_err)?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(e));
        }

        tracing::trace!("Wrote {} gadgets to {:?}", self.gadgets.len(), path);
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use tempfile::TempDir;

    fn record(name: &str, x: f32) -> GadgetSaveRecord {
        GadgetSaveRecord {
            name: name.to_string(),
            position: Vec3::new(x, 0.0, 0.0),
            rotation: Quat::IDENTITY,
            state: Default::default(),
        }
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("world.ron");
        let file = SaveFile::new(vec![record("Domino", 1.0), record("Ball", 2.0)]);

        file.write(&path).unwrap();
        assert!(!temp_path(&path).exists());

        let loaded = SaveFile::read(&path).unwrap();
        assert_eq!(loaded, file);
    }

    #[test]
    fn test_read_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.ron");
        assert_eq!(
            SaveFile::read(&path).unwrap_err(),
            WorldError::MissingSaveFile(path)
        );
    }

    #[test]
    fn test_read_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.ron");
        std::fs::write(&path, "(gadgets: [(name: ").unwrap();

        assert!(matches!(
            SaveFile::read(&path),
            Err(WorldError::Serialization { .. })
        ));
    }

    #[test]
    fn test_missing_version_defaults_to_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.ron");
        std::fs::write(&path, "(gadgets: [])").unwrap();

        let file = SaveFile::read(&path).unwrap();
        assert_eq!(file.version, 0);
        assert!(file.gadgets.is_empty());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let path = Path::new("/saves/w1/w1.ron");
        assert_eq!(temp_path(path), PathBuf::from("/saves/w1/w1.ron.tmp"));
    }
}
