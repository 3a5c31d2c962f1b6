//! Selection and placement of single gadgets

use glam::Vec3;
use uuid::Uuid;

use crate::gadget::Gadget;
use crate::world::WorldStore;

/// What the manipulator is holding
#[derive(Debug, Default)]
pub enum Manipulator {
    /// Nothing selected
    #[default]
    Idle,
    /// Editing a gadget already in the world
    Modify(Uuid),
    /// Placing copies of a template gadget the manipulator owns
    Create(Gadget),
}

impl Manipulator {
    pub fn is_idle(&self) -> bool {
        matches!(self, Manipulator::Idle)
    }

    pub fn is_modifying(&self) -> bool {
        matches!(self, Manipulator::Modify(_))
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, Manipulator::Create(_))
    }

    /// Id of the world gadget being modified
    pub fn selected_id(&self) -> Option<Uuid> {
        match self {
            Manipulator::Modify(id) => Some(*id),
            _ => None,
        }
    }

    /// Template gadget being placed
    pub fn template(&self) -> Option<&Gadget> {
        match self {
            Manipulator::Create(gadget) => Some(gadget),
            _ => None,
        }
    }

    /// Select a world gadget for modification
    pub fn select(&mut self, world: &mut WorldStore, id: Uuid) -> bool {
        self.reset(world);
        match world.get_mut(id) {
            Some(gadget) => {
                gadget.select();
                *self = Manipulator::Modify(id);
                true
            }
            None => false,
        }
    }

    /// Start placing copies of `template`
    pub fn create(&mut self, world: &mut WorldStore, mut template: Gadget) {
        self.reset(world);
        template.select();
        *self = Manipulator::Create(template);
    }

    /// Commit the current selection.
    ///
    /// Modify: deselects the gadget and marks the world modified, leaving the
    /// manipulator idle. Create: inserts a solid copy of the template and keeps
    /// creating. Returns the id of the placed gadget.
    pub fn place(&mut self, world: &mut WorldStore) -> Option<Uuid> {
        match std::mem::take(self) {
            Manipulator::Idle => None,
            Manipulator::Modify(id) => {
                if let Some(gadget) = world.get_mut(id) {
                    gadget.deselect();
                }
                world.mark_modified();
                Some(id)
            }
            Manipulator::Create(template) => {
                let id = world.insert_duplicate(&template);
                if let Some(placed) = world.get_mut(id) {
                    placed.deselect();
                }
                *self = Manipulator::Create(template);
                Some(id)
            }
        }
    }

    /// Turn the selection about the up axis.
    ///
    /// A modified gadget is only persisted once placed.
    pub fn rotate(&mut self, world: &mut WorldStore, degrees: f32) {
        match self {
            Manipulator::Idle => {}
            Manipulator::Modify(id) => {
                if let Some(gadget) = world.get_mut(*id) {
                    gadget.rotate_about_up(degrees);
                }
            }
            Manipulator::Create(template) => template.rotate_about_up(degrees),
        }
    }

    /// Move the selection
    pub fn move_to(&mut self, world: &mut WorldStore, position: Vec3) {
        match self {
            Manipulator::Idle => {}
            Manipulator::Modify(id) => {
                if let Some(gadget) = world.get_mut(*id) {
                    gadget.position = position;
                }
            }
            Manipulator::Create(template) => template.position = position,
        }
    }

    /// Remove the gadget being modified from the world
    pub fn remove(&mut self, world: &mut WorldStore) -> bool {
        match self {
            Manipulator::Modify(id) => {
                let removed = world.remove(*id);
                *self = Manipulator::Idle;
                removed
            }
            _ => false,
        }
    }

    /// Drop the selection: deselect a modified gadget, discard a template
    pub fn reset(&mut self, world: &mut WorldStore) {
        match std::mem::take(self) {
            Manipulator::Idle => {}
            Manipulator::Modify(id) => {
                tracing::debug!(%id, "Manipulator reset, deselecting");
                if let Some(gadget) = world.get_mut(id) {
                    gadget.deselect();
                }
            }
            Manipulator::Create(template) => {
                tracing::debug!(name = template.type_name(), "Manipulator reset, discarding template");
                template.remove_from_scene();
            }
        }
    }
}
