//! Placeable gadgets
//!
//! A [`Gadget`] is one placed instance of a [`GadgetTemplate`]. Its
//! [`GadgetSaveRecord`] is the flattened form written to save files.

mod builtin;
mod record;
mod template;

pub use builtin::{Ball, Domino, Pendulum, Ramp};
pub use record::{GadgetSaveRecord, GadgetState, StateValue};
pub use template::{GadgetTemplate, RenderHandle, TemplateRegistry, TemplateResolver};

use std::sync::Arc;

use glam::{Quat, Vec3};
use thiserror::Error;
use uuid::Uuid;

/// Opacity used for transparent (template) gadgets
pub const TRANSPARENT_OPACITY: f32 = 0.4;

/// Gadget-related errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GadgetError {
    #[error("Gadget template not found: {0}")]
    TemplateNotFound(String),
}

/// Render layer a gadget is drawn and picked on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GadgetLayer {
    /// Placed in the world and pickable
    #[default]
    World,
    /// Displayed on the inventory table
    Table,
}

/// What a gadget is currently attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    #[default]
    Detached,
    World,
    InventorySlot(usize),
}

/// A placed gadget instance
#[derive(Debug)]
pub struct Gadget {
    id: Uuid,
    template: Arc<dyn GadgetTemplate>,
    /// Position in world space
    pub position: Vec3,
    /// Orientation in world space
    pub rotation: Quat,
    /// Gadget-specific state
    pub state: GadgetState,
    selected: bool,
    transparent: bool,
    layer: GadgetLayer,
    container: Container,
}

impl Gadget {
    /// Create a new instance of a template at the origin
    pub fn instantiate(template: Arc<dyn GadgetTemplate>) -> Self {
        let state = template.default_state();
        Self {
            id: Uuid::new_v4(),
            template,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            state,
            selected: false,
            transparent: false,
            layer: GadgetLayer::World,
            container: Container::Detached,
        }
    }

    /// Instantiate a template resolved by type name
    pub fn from_template_name(
        resolver: &dyn TemplateResolver,
        type_name: &str,
    ) -> Result<Self, GadgetError> {
        resolver
            .resolve_template(type_name)
            .map(Self::instantiate)
            .ok_or_else(|| GadgetError::TemplateNotFound(type_name.to_string()))
    }

    /// Rebuild a gadget from its save record.
    ///
    /// Recorded state is layered over the template defaults, so records that
    /// predate a state key pick up its default value.
    pub fn restore(
        record: &GadgetSaveRecord,
        resolver: &dyn TemplateResolver,
    ) -> Result<Self, GadgetError> {
        let mut gadget = Self::from_template_name(resolver, &record.name)?;
        gadget.position = record.position;
        gadget.rotation = record.rotation;
        gadget.state.merge(&record.state);
        Ok(gadget)
    }

    /// Capture type identity, pose and state
    pub fn snapshot(&self) -> GadgetSaveRecord {
        GadgetSaveRecord {
            name: self.type_name().to_string(),
            position: self.position,
            rotation: self.rotation,
            state: self.state.clone(),
        }
    }

    /// A solid, unselected copy with a new identity
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            template: self.template.clone(),
            position: self.position,
            rotation: self.rotation,
            state: self.state.clone(),
            selected: false,
            transparent: false,
            layer: GadgetLayer::World,
            container: Container::Detached,
        }
    }

    /// Detach and discard this gadget
    pub fn remove_from_scene(self) {
        tracing::trace!(id = %self.id, name = self.type_name(), "Gadget removed from scene");
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn type_name(&self) -> &str {
        self.template.type_name()
    }

    pub fn template(&self) -> &Arc<dyn GadgetTemplate> {
        &self.template
    }

    /// Parts the presentation layer should draw
    pub fn visual_parts(&self) -> Vec<RenderHandle> {
        self.template.visual_parts()
    }

    /// Opacity to draw every visual part with
    pub fn opacity(&self) -> f32 {
        if self.transparent {
            TRANSPARENT_OPACITY
        } else {
            1.0
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn make_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    pub fn make_solid(&mut self) {
        self.transparent = false;
    }

    pub fn layer(&self) -> GadgetLayer {
        self.layer
    }

    pub fn set_layer(&mut self, layer: GadgetLayer) {
        self.layer = layer;
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn set_container(&mut self, container: Container) {
        self.container = container;
    }

    /// Turn about the world up axis
    pub fn rotate_about_up(&mut self, degrees: f32) {
        self.rotation = (Quat::from_rotation_y(degrees.to_radians()) * self.rotation).normalize();
    }
}
