//! World store
//!
//! Owns the collection of placed gadgets, the active world name and the
//! dirty flag, and is the only component that touches the save directory.
//! Mutations mark the world dirty; [`WorldStore::update`] later flushes the
//! world to its autosave, replenishes the inventory and only then clears the
//! flag.

mod file;
mod layout;

pub use file::{SAVE_FORMAT_VERSION, SaveFile};
pub use layout::{AUTOSAVE_FILE, SAVE_EXTENSION, SaveLayout};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::gadget::{Container, Gadget, GadgetError, GadgetLayer, TemplateResolver};
use crate::inventory::InventoryHook;

/// Template resolver shared between the store and its collaborators
pub type SharedResolver = Arc<dyn TemplateResolver + Send + Sync>;

/// World store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("Save file not found: {}", .0.display())]
    MissingSaveFile(PathBuf),

    #[error("Malformed save file {}: {reason}", .path.display())]
    Serialization { path: PathBuf, reason: String },

    #[error("IO error on {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    #[error("Gadget template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid world name: {0:?}")]
    InvalidName(String),
}

impl From<GadgetError> for WorldError {
    fn from(err: GadgetError) -> Self {
        match err {
            GadgetError::TemplateNotFound(name) => WorldError::TemplateNotFound(name),
        }
    }
}

/// What to do with a saved gadget whose template is unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingTemplatePolicy {
    /// Drop the gadget with a warning and load the rest
    #[default]
    Skip,
    /// Fail the whole load
    Abort,
}

/// World store settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub missing_template: MissingTemplatePolicy,
}

/// Lifecycle of the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldState {
    /// No world name has been assigned yet
    Uninitialized,
    /// Working on the named world
    Active(String),
}

/// The single active world
pub struct WorldStore {
    layout: SaveLayout,
    state: WorldState,
    gadgets: Vec<Gadget>,
    dirty: bool,
    resolver: SharedResolver,
    settings: StoreSettings,
    inventory: Option<Box<dyn InventoryHook + Send>>,
}

impl WorldStore {
    /// Create an empty, uninitialized store saving under `root`
    pub fn new(root: impl Into<PathBuf>, resolver: SharedResolver, settings: StoreSettings) -> Self {
        Self {
            layout: SaveLayout::new(root),
            state: WorldState::Uninitialized,
            gadgets: Vec::new(),
            dirty: false,
            resolver,
            settings,
            inventory: None,
        }
    }

    /// Attach the inventory replenished on every flush
    pub fn set_inventory(&mut self, inventory: Box<dyn InventoryHook + Send>) {
        self.inventory = Some(inventory);
    }

    pub fn layout(&self) -> &SaveLayout {
        &self.layout
    }

    pub fn resolver(&self) -> &SharedResolver {
        &self.resolver
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Name of the active world
    pub fn name(&self) -> Option<&str> {
        match &self.state {
            WorldState::Uninitialized => None,
            WorldState::Active(name) => Some(name),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn gadgets(&self) -> &[Gadget] {
        &self.gadgets
    }

    pub fn len(&self) -> usize {
        self.gadgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gadgets.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Gadget> {
        self.gadgets.iter().find(|g| g.id() == id)
    }

    /// Mutable access that leaves the dirty flag alone.
    ///
    /// Use for transient changes such as selection; call
    /// [`mark_modified`](Self::mark_modified) once a change should persist.
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Gadget> {
        self.gadgets.iter_mut().find(|g| g.id() == id)
    }

    /// Clear the world, assign a fresh name and save it right away
    pub fn create_new_world(&mut self) -> Result<&str, WorldError> {
        self.clear();
        self.initialize_new_world();
        self.save()?;
        tracing::info!("Created world {:?}", self.name().unwrap_or_default());
        Ok(self.name().unwrap_or_default())
    }

    /// Assign a fresh timestamp-derived name without saving
    pub fn initialize_new_world(&mut self) -> &str {
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();
        let mut name = stamp.clone();
        let mut suffix = 2;
        while self.layout.world_dir(&name).exists() {
            name = format!("{stamp}-{suffix}");
            suffix += 1;
        }

        tracing::debug!("Initialized world {:?}", name);
        self.state = WorldState::Active(name);
        self.name().unwrap_or_default()
    }

    /// Write the primary save of the active world, then run the autosave cycle
    pub fn save(&mut self) -> Result<(), WorldError> {
        if self.name().is_none() {
            self.initialize_new_world();
        }
        let name = self.name().unwrap_or_default().to_string();

        let path = self.layout.primary_file(&name);
        self.save_file().write(&path)?;
        tracing::info!("Saved world {:?} ({} gadgets)", name, self.gadgets.len());

        self.flush()
    }

    /// Replace the collection with the primary save of `name`.
    ///
    /// All or nothing: on any error the collection, the world name and the
    /// dirty flag are left as they were.
    pub fn load_world(&mut self, name: &str) -> Result<(), WorldError> {
        if !SaveLayout::is_valid_name(name) {
            return Err(WorldError::InvalidName(name.to_string()));
        }

        let path = self.layout.primary_file(name);
        let gadgets = self.read_gadgets(&path)?;

        self.replace_gadgets(gadgets);
        self.state = WorldState::Active(name.to_string());
        tracing::info!("Loaded world {:?} ({} gadgets)", name, self.gadgets.len());

        self.flush()
    }

    /// Restore the latest autosave.
    ///
    /// Uses the active world's autosave once the world has a primary save,
    /// otherwise the default autosave if anything has been placed. Returns
    /// whether an autosave was loaded.
    pub fn load_auto_for_current_world(&mut self) -> Result<bool, WorldError> {
        let path = match self.name() {
            Some(name) if self.layout.primary_file(name).is_file() => {
                self.layout.world_autosave_file(name)
            }
            _ if !self.gadgets.is_empty() => self.layout.default_autosave_file(),
            _ => return Ok(false),
        };

        let gadgets = self.read_gadgets(&path)?;
        self.replace_gadgets(gadgets);
        tracing::info!("Restored autosave {:?} ({} gadgets)", path, self.gadgets.len());
        Ok(true)
    }

    /// Add a gadget to the world
    pub fn insert(&mut self, mut gadget: Gadget) -> Uuid {
        gadget.set_layer(GadgetLayer::World);
        gadget.set_container(Container::World);
        let id = gadget.id();
        tracing::trace!(%id, name = gadget.type_name(), "Gadget inserted");
        self.gadgets.push(gadget);
        self.dirty = true;
        id
    }

    /// Insert a solid copy of a template gadget
    pub fn insert_duplicate(&mut self, template: &Gadget) -> Uuid {
        self.insert(template.duplicate())
    }

    /// Remove a gadget. Unknown ids are ignored and return `false`.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let Some(pos) = self.gadgets.iter().position(|g| g.id() == id) else {
            tracing::debug!(%id, "Remove ignored, gadget not in world");
            return false;
        };
        self.gadgets.remove(pos).remove_from_scene();
        self.dirty = true;
        true
    }

    /// Remove every gadget
    pub fn clear(&mut self) {
        for gadget in self.gadgets.drain(..) {
            gadget.remove_from_scene();
        }
        self.dirty = true;
    }

    /// Mutate a member gadget and mark the world modified
    pub fn modify(&mut self, id: Uuid, f: impl FnOnce(&mut Gadget)) -> bool {
        match self.get_mut(id) {
            Some(gadget) => {
                f(gadget);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_modified(&mut self) {
        self.dirty = true;
    }

    /// Run one update cycle. Returns whether anything was flushed.
    pub fn update(&mut self) -> Result<bool, WorldError> {
        if !self.dirty {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    /// Names of worlds that have a primary save, sorted
    pub fn saved_worlds(&self) -> Result<Vec<String>, WorldError> {
        let root = self.layout.root();
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(root).map_err(|e| WorldError::Io {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| SaveLayout::is_valid_name(name))
            .filter(|name| self.layout.primary_file(name).is_file())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Snapshot of the whole collection
    pub fn save_file(&self) -> SaveFile {
        SaveFile::new(self.gadgets.iter().map(Gadget::snapshot).collect())
    }

    /// Autosave, replenish the inventory, then clear the dirty flag
    fn flush(&mut self) -> Result<(), WorldError> {
        let path = self.layout.autosave_file(self.name());
        self.save_file().write(&path)?;
        tracing::debug!("Autosaved {} gadgets to {:?}", self.gadgets.len(), path);

        if let Some(inventory) = self.inventory.as_mut() {
            inventory.replenish(self.resolver.as_ref());
        }

        self.dirty = false;
        Ok(())
    }

    fn read_gadgets(&self, path: &Path) -> Result<Vec<Gadget>, WorldError> {
        let file = SaveFile::read(path).inspect_err(|e| {
            if let WorldError::MissingSaveFile(_) = e {
                tracing::warn!("Loading failed, {:?} does not exist", path);
            }
        })?;

        let mut gadgets = Vec::with_capacity(file.gadgets.len());
        for record in &file.gadgets {
            match Gadget::restore(record, self.resolver.as_ref()) {
                Ok(gadget) => gadgets.push(gadget),
                Err(e) => match self.settings.missing_template {
                    MissingTemplatePolicy::Skip => {
                        tracing::warn!("Skipping saved gadget: {}", e);
                    }
                    MissingTemplatePolicy::Abort => return Err(e.into()),
                },
            }
        }
        Ok(gadgets)
    }

    fn replace_gadgets(&mut self, gadgets: Vec<Gadget>) {
        for gadget in self.gadgets.drain(..) {
            gadget.remove_from_scene();
        }
        self.gadgets = gadgets
            .into_iter()
            .map(|mut gadget| {
                gadget.set_container(Container::World);
                gadget
            })
            .collect();
    }
}

impl std::fmt::Debug for WorldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldStore")
            .field("root", &self.layout.root())
            .field("state", &self.state)
            .field("gadgets", &self.gadgets.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}
