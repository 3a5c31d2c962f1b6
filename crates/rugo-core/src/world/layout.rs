//! On-disk layout of the save directory
//!
//! ```text
//! <root>/autosave.ron             default autosave, used before any world is saved
//! <root>/<name>/<name>.ron        primary save of world <name>
//! <root>/<name>/autosave.ron      rolling autosave of world <name>
//! ```

use std::path::{Path, PathBuf};

/// Extension of every save file
pub const SAVE_EXTENSION: &str = "ron";

/// File name of both the default and the per-world autosave
pub const AUTOSAVE_FILE: &str = "autosave.ron";

/// Builds every save path from one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveLayout {
    root: PathBuf,
}

impl SaveLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn world_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn primary_file(&self, name: &str) -> PathBuf {
        self.world_dir(name)
            .join(format!("{name}.{SAVE_EXTENSION}"))
    }

    pub fn world_autosave_file(&self, name: &str) -> PathBuf {
        self.world_dir(name).join(AUTOSAVE_FILE)
    }

    pub fn default_autosave_file(&self) -> PathBuf {
        self.root.join(AUTOSAVE_FILE)
    }

    /// Autosave file for the given world.
    ///
    /// A world only gets its own autosave once its primary save exists;
    /// until then everything goes to the default autosave.
    pub fn autosave_file(&self, name: Option<&str>) -> PathBuf {
        match name {
            Some(name) if self.primary_file(name).is_file() => self.world_autosave_file(name),
            _ => self.default_autosave_file(),
        }
    }

    /// Whether `name` can be used as a world directory
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.starts_with('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let layout = SaveLayout::new("/saves");
        assert_eq!(
            layout.primary_file("w1"),
            PathBuf::from("/saves/w1/w1.ron")
        );
        assert_eq!(
            layout.world_autosave_file("w1"),
            PathBuf::from("/saves/w1/autosave.ron")
        );
        assert_eq!(
            layout.default_autosave_file(),
            PathBuf::from("/saves/autosave.ron")
        );
    }

    #[test]
    fn test_dotted_name_keeps_full_stem() {
        let layout = SaveLayout::new("/saves");
        assert_eq!(
            layout.primary_file("v1.2"),
            PathBuf::from("/saves/v1.2/v1.2.ron")
        );
    }

    #[test]
    fn test_autosave_falls_back_until_primary_exists() {
        let dir = TempDir::new().unwrap();
        let layout = SaveLayout::new(dir.path());

        assert_eq!(layout.autosave_file(None), layout.default_autosave_file());
        assert_eq!(
            layout.autosave_file(Some("w1")),
            layout.default_autosave_file()
        );

        std::fs::create_dir_all(layout.world_dir("w1")).unwrap();
        std::fs::write(layout.primary_file("w1"), "").unwrap();
        assert_eq!(
            layout.autosave_file(Some("w1")),
            layout.world_autosave_file("w1")
        );
    }

    #[test]
    fn test_name_validation() {
        assert!(SaveLayout::is_valid_name("20261019120000"));
        assert!(SaveLayout::is_valid_name("my world"));
        assert!(!SaveLayout::is_valid_name(""));
        assert!(!SaveLayout::is_valid_name(".."));
        assert!(!SaveLayout::is_valid_name("a/b"));
        assert!(!SaveLayout::is_valid_name(".hidden"));
    }
}
