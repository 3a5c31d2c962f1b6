//! Inventory table of template gadgets
//!
//! One slot per template; each slot holds a transparent gadget on the
//! `Table` layer that the player picks to create new gadgets from.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::gadget::{Container, Gadget, GadgetLayer, TemplateResolver};

/// Called by the world store at the end of every flush
pub trait InventoryHook {
    fn replenish(&mut self, resolver: &dyn TemplateResolver);
}

/// Inventory shared between the world store and the session
pub type SharedInventory = Arc<Mutex<Inventory>>;

#[derive(Debug)]
struct Slot {
    template: String,
    gadget: Option<Gadget>,
}

/// Table of template gadgets
#[derive(Debug, Default)]
pub struct Inventory {
    slots: Vec<Slot>,
    visible: bool,
}

impl Inventory {
    /// Create an inventory with one empty slot per template name
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: templates
                .into_iter()
                .map(|name| Slot {
                    template: name.into(),
                    gadget: None,
                })
                .collect(),
            visible: false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Template name of a slot
    pub fn template_name(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).map(|s| s.template.as_str())
    }

    /// Gadget currently parked in a slot
    pub fn slot(&self, slot: usize) -> Option<&Gadget> {
        self.slots.get(slot).and_then(|s| s.gadget.as_ref())
    }

    /// Fill every empty slot. Returns the number of slots filled.
    pub fn fill_empty_slots(&mut self, resolver: &dyn TemplateResolver) -> usize {
        let mut filled = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.gadget.is_some() {
                continue;
            }
            match Gadget::from_template_name(resolver, &slot.template) {
                Ok(mut gadget) => {
                    gadget.set_layer(GadgetLayer::Table);
                    gadget.set_container(Container::InventorySlot(index));
                    gadget.make_transparent(true);
                    slot.gadget = Some(gadget);
                    filled += 1;
                }
                Err(e) => tracing::warn!("Inventory slot {} left empty: {}", index, e),
            }
        }
        if filled > 0 {
            tracing::trace!(filled, "Inventory replenished");
        }
        filled
    }

    /// Hand out the template gadget of a slot, leaving the slot empty
    pub fn take(&mut self, slot: usize) -> Option<Gadget> {
        self.slots.get_mut(slot).and_then(|s| s.gadget.take())
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the table. Returns the new visibility.
    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
}

impl InventoryHook for Inventory {
    fn replenish(&mut self, resolver: &dyn TemplateResolver) {
        self.fill_empty_slots(resolver);
    }
}

impl InventoryHook for SharedInventory {
    fn replenish(&mut self, resolver: &dyn TemplateResolver) {
        self.lock().fill_empty_slots(resolver);
    }
}
