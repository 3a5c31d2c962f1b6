//! Interaction session
//!
//! Ties pointer input, path capture, the manipulator and the inventory to a
//! shared [`WorldStore`]. The driver calls [`Session::tick`] once per frame.

mod manipulator;

pub use manipulator::Manipulator;

use std::sync::Arc;

use glam::{Quat, Vec3};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gadget::{Gadget, GadgetError, TemplateResolver};
use crate::geometry::look_rotation;
use crate::interaction::PointerProvider;
use crate::inventory::{Inventory, SharedInventory};
use crate::path::{CaptureSettings, CaptureState, PathCapture};
use crate::world::{WorldError, WorldStore};

/// World store shared between the session and its driver
pub type SharedWorld = Arc<Mutex<WorldStore>>;

/// Session preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Template placed along drawn paths
    pub path_template: String,
    /// Rotation speed of the selection, degrees per second
    pub rotation_step_degrees: f32,
    /// Templates offered on the inventory table, in slot order
    pub inventory: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            path_template: "Domino".to_string(),
            rotation_step_degrees: 50.0,
            inventory: ["Domino", "Ramp", "Pendulum", "Ball"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Top-level interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Selecting, moving and placing gadgets
    #[default]
    Build,
    /// Menu open, world input suspended
    Select,
    /// Drawing a path of gadgets
    Draw,
}

/// One player's interaction with a world
pub struct Session {
    world: SharedWorld,
    inventory: SharedInventory,
    capture: PathCapture,
    manipulator: Manipulator,
    mode: GameMode,
    settings: SessionSettings,
    completed_path: Arc<Mutex<Option<Vec<Vec3>>>>,
}

impl Session {
    /// Create a session in build mode and attach its inventory to the world
    pub fn new(world: SharedWorld, settings: SessionSettings, capture: CaptureSettings) -> Self {
        let inventory: SharedInventory =
            Arc::new(Mutex::new(Inventory::new(settings.inventory.iter().cloned())));

        {
            let mut store = world.lock();
            inventory.lock().fill_empty_slots(store.resolver().as_ref());
            store.set_inventory(Box::new(inventory.clone()));
        }

        Self {
            world,
            inventory,
            capture: PathCapture::new(capture),
            manipulator: Manipulator::Idle,
            mode: GameMode::Build,
            settings,
            completed_path: Arc::new(Mutex::new(None)),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    pub fn inventory(&self) -> &SharedInventory {
        &self.inventory
    }

    pub fn capture(&self) -> &PathCapture {
        &self.capture
    }

    pub fn manipulator(&self) -> &Manipulator {
        &self.manipulator
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn enable_build_mode(&mut self) {
        self.capture.deactivate();
        self.mode = GameMode::Build;
        tracing::debug!("Mode: Build");
    }

    pub fn enable_select_mode(&mut self) {
        self.manipulator.reset(&mut self.world.lock());
        self.capture.deactivate();
        self.mode = GameMode::Select;
        tracing::debug!("Mode: Select");
    }

    /// Start a new capture session; the completed path is applied on the next tick
    pub fn enable_draw_mode(&mut self) {
        self.manipulator.reset(&mut self.world.lock());
        let sink = self.completed_path.clone();
        self.capture
            .activate(Box::new(move |points| *sink.lock() = Some(points)));
        self.mode = GameMode::Draw;
        tracing::debug!("Mode: Draw");
    }

    /// Open or close the menu
    pub fn toggle_menu(&mut self) {
        if self.mode == GameMode::Select {
            self.enable_build_mode();
        } else {
            self.enable_select_mode();
        }
    }

    /// Show or hide the inventory table
    pub fn toggle_table(&mut self) -> bool {
        self.inventory.lock().toggle_visible()
    }

    /// Start placing new gadgets of the named template
    pub fn create_gadget(&mut self, type_name: &str) -> Result<(), GadgetError> {
        self.enable_build_mode();
        let mut world = self.world.lock();
        let template = Gadget::from_template_name(world.resolver().as_ref(), type_name)?;
        self.manipulator.create(&mut world, template);
        Ok(())
    }

    /// Start placing copies of the gadget parked in an inventory slot
    pub fn pick_from_inventory(&mut self, slot: usize) -> bool {
        let Some(template) = self.inventory.lock().take(slot) else {
            return false;
        };
        self.enable_build_mode();
        self.manipulator.create(&mut self.world.lock(), template);
        true
    }

    /// Select a world gadget; only in build mode with nothing else selected
    pub fn select_gadget(&mut self, id: Uuid) -> bool {
        if self.mode != GameMode::Build || !self.manipulator.is_idle() {
            return false;
        }
        self.manipulator.select(&mut self.world.lock(), id)
    }

    pub fn place_selection(&mut self) -> Option<Uuid> {
        self.manipulator.place(&mut self.world.lock())
    }

    /// Turn the selection for `seconds` at the configured speed.
    /// Negative durations turn the other way.
    pub fn rotate_selection(&mut self, seconds: f32) {
        let degrees = self.settings.rotation_step_degrees * seconds;
        self.manipulator.rotate(&mut self.world.lock(), degrees);
    }

    pub fn move_selection(&mut self, position: Vec3) {
        self.manipulator.move_to(&mut self.world.lock(), position);
    }

    pub fn remove_selection(&mut self) -> bool {
        self.manipulator.remove(&mut self.world.lock())
    }

    /// Roll the world back to its latest autosave
    pub fn reset_world(&mut self) -> Result<bool, WorldError> {
        let mut world = self.world.lock();
        self.manipulator.reset(&mut world);
        world.load_auto_for_current_world()
    }

    /// Place one path-template gadget on every point.
    ///
    /// Each gadget faces the next point, the last one keeps the direction of
    /// the final segment. Returns the number of gadgets placed.
    pub fn place_along_path(&mut self, points: &[Vec3]) -> Result<usize, WorldError> {
        let mut world = self.world.lock();
        let template = world
            .resolver()
            .resolve_template(&self.settings.path_template)
            .ok_or_else(|| WorldError::TemplateNotFound(self.settings.path_template.clone()))?;

        for (i, &position) in points.iter().enumerate() {
            let mut gadget = Gadget::instantiate(template.clone());
            gadget.position = position;
            gadget.rotation = path_rotation(points, i);
            gadget.deselect();
            world.insert(gadget);
        }

        tracing::info!(
            "Placed {} {} gadgets along path",
            points.len(),
            self.settings.path_template
        );
        Ok(points.len())
    }

    /// Advance one frame: drive the capture, apply a completed path, then run
    /// the world update cycle. Returns whether the world was flushed.
    ///
    /// A completed stroke always returns the session to build mode, even when
    /// its gadgets cannot be placed.
    pub fn tick(&mut self, pointer: &dyn PointerProvider) -> Result<bool, WorldError> {
        if self.mode == GameMode::Draw {
            self.capture.update(pointer);
        }

        let completed = self.completed_path.lock().take();
        if let Some(points) = completed {
            self.enable_build_mode();
            self.place_along_path(&points)?;
        }

        self.world.lock().update()
    }

    /// Whether a stroke is in progress
    pub fn is_drawing(&self) -> bool {
        self.capture.state() == CaptureState::Drawing
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("capture", &self.capture.state())
            .field("manipulator", &self.manipulator)
            .finish()
    }
}

fn path_rotation(points: &[Vec3], index: usize) -> Quat {
    let n = points.len();
    if n < 2 {
        return Quat::IDENTITY;
    }
    let direction = if index + 1 < n {
        points[index + 1] - points[index]
    } else {
        points[n - 1] - points[n - 2]
    };
    look_rotation(direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadget::{GadgetLayer, TemplateRegistry};
    use crate::interaction::{PlanePointer, PointerFrame, Ray, TablePlane};
    use crate::world::StoreSettings;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        session_with(dir, SessionSettings::default())
    }

    fn session_with(dir: &TempDir, settings: SessionSettings) -> Session {
        let world = WorldStore::new(
            dir.path(),
            Arc::new(TemplateRegistry::with_builtins()),
            StoreSettings::default(),
        );
        Session::new(
            Arc::new(Mutex::new(world)),
            settings,
            CaptureSettings::default(),
        )
    }

    fn frame(frame: PointerFrame) -> PlanePointer {
        PlanePointer::new(frame, TablePlane::new(0.0))
    }

    #[test]
    fn test_new_session_fills_inventory() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);
        let inventory = session.inventory().lock();
        assert_eq!(inventory.len(), 4);
        assert_eq!(inventory.slot(0).unwrap().type_name(), "Domino");
        assert_eq!(inventory.slot(0).unwrap().layer(), GadgetLayer::Table);
    }

    #[test]
    fn test_mode_transitions() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        assert_eq!(session.mode(), GameMode::Build);

        session.enable_draw_mode();
        assert_eq!(session.mode(), GameMode::Draw);
        assert_eq!(session.capture().state(), CaptureState::Idle);

        session.toggle_menu();
        assert_eq!(session.mode(), GameMode::Select);
        assert_eq!(session.capture().state(), CaptureState::Inactive);

        session.toggle_menu();
        assert_eq!(session.mode(), GameMode::Build);
    }

    #[test]
    fn test_select_mode_resets_manipulator() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.create_gadget("Ramp").unwrap();
        assert!(session.manipulator().is_creating());

        session.enable_select_mode();
        assert!(session.manipulator().is_idle());
    }

    #[test]
    fn test_draw_mode_resets_manipulator() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.create_gadget("Ramp").unwrap();
        assert!(session.manipulator().is_creating());

        session.enable_draw_mode();
        assert!(session.manipulator().is_idle());
        assert_eq!(session.mode(), GameMode::Draw);
    }

    #[test]
    fn test_create_unknown_gadget() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        assert_eq!(
            session.create_gadget("Catapult").unwrap_err(),
            GadgetError::TemplateNotFound("Catapult".into())
        );
    }

    #[test]
    fn test_pick_from_inventory_and_replenish() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        assert!(session.pick_from_inventory(1));
        assert!(session.inventory().lock().slot(1).is_none());

        let id = session.place_selection().unwrap();
        {
            let world = session.world().lock();
            let placed = world.get(id).unwrap();
            assert_eq!(placed.type_name(), "Ramp");
            assert!(!placed.is_transparent());
        }

        // The flush after placement refills the table
        assert!(session.tick(&frame(PointerFrame::hover(Ray::down_at(Vec3::ZERO)))).unwrap());
        assert!(session.inventory().lock().slot(1).is_some());
    }

    #[test]
    fn test_select_requires_build_mode() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let id = {
            let mut world = session.world().lock();
            let gadget = Gadget::from_template_name(world.resolver().as_ref(), "Ball").unwrap();
            world.insert(gadget)
        };

        session.enable_select_mode();
        assert!(!session.select_gadget(id));

        session.enable_build_mode();
        assert!(session.select_gadget(id));
        session.rotate_selection(1.0);
        assert!(session.remove_selection());
        assert!(session.world().lock().is_empty());
    }

    #[test]
    fn test_place_along_path_orientation() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let points = [
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 0.04),
            Vec3::new(0.04, 0.0, 0.04),
        ];

        assert_eq!(session.place_along_path(&points).unwrap(), 3);

        let world = session.world().lock();
        let gadgets = world.gadgets();
        assert_relative_eq!(gadgets[0].rotation * Vec3::Z, Vec3::Z, epsilon = 1e-5);
        assert_relative_eq!(gadgets[1].rotation * Vec3::Z, Vec3::X, epsilon = 1e-5);
        assert_relative_eq!(gadgets[2].rotation * Vec3::Z, Vec3::X, epsilon = 1e-5);
        assert!(gadgets.iter().all(|g| !g.is_selected()));
        assert!(world.is_dirty());
    }

    #[test]
    fn test_place_single_point_keeps_identity() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.place_along_path(&[Vec3::X]).unwrap();

        let world = session.world().lock();
        assert_eq!(world.gadgets()[0].rotation, Quat::IDENTITY);
        assert_eq!(world.gadgets()[0].position, Vec3::X);
    }

    #[test]
    fn test_draw_places_dominoes_and_returns_to_build() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.enable_draw_mode();

        let ticks = [
            PointerFrame::press(Ray::down_at(Vec3::ZERO)),
            PointerFrame::hold(Ray::down_at(Vec3::new(0.0, 0.0, 0.1))),
            PointerFrame::release(Ray::down_at(Vec3::new(0.0, 0.0, 0.2))),
        ];
        for tick in ticks {
            session.tick(&frame(tick)).unwrap();
        }

        assert_eq!(session.mode(), GameMode::Build);
        let world = session.world().lock();
        assert_eq!(world.len(), 5);
        assert!(world.gadgets().iter().all(|g| g.type_name() == "Domino"));
        assert!(!world.is_dirty());
    }

    #[test]
    fn test_unknown_path_template_returns_to_build() {
        let dir = TempDir::new().unwrap();
        let settings = SessionSettings {
            path_template: "Dominoe".to_string(),
            ..SessionSettings::default()
        };
        let mut session = session_with(&dir, settings);
        session.enable_draw_mode();

        session
            .tick(&frame(PointerFrame::press(Ray::down_at(Vec3::ZERO))))
            .unwrap();
        session
            .tick(&frame(PointerFrame::hold(Ray::down_at(Vec3::new(0.0, 0.0, 0.1)))))
            .unwrap();
        let err = session
            .tick(&frame(PointerFrame::release(Ray::down_at(Vec3::new(0.0, 0.0, 0.2)))))
            .unwrap_err();

        assert!(matches!(err, WorldError::TemplateNotFound(ref name) if name == "Dominoe"));
        assert_eq!(session.mode(), GameMode::Build);
        assert!(session.world().lock().is_empty());

        // A fresh stroke can still be started
        session.enable_draw_mode();
        session
            .tick(&frame(PointerFrame::press(Ray::down_at(Vec3::ZERO))))
            .unwrap();
        assert!(session.is_drawing());
    }

    #[test]
    fn test_build_mode_ignores_pointer_for_capture() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session
            .tick(&frame(PointerFrame::press(Ray::down_at(Vec3::ZERO))))
            .unwrap();
        assert!(!session.is_drawing());
    }
}
