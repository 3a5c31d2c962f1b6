//! Gadget templates and the registry that resolves them by name

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::GadgetState;

/// Opaque reference to one renderable part of a gadget
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle {
    pub part: String,
}

impl RenderHandle {
    pub fn new(part: impl Into<String>) -> Self {
        Self { part: part.into() }
    }
}

/// A kind of gadget that can be instantiated by name.
///
/// Implementations describe the variant: its identity, the parts the
/// presentation layer renders for it, and its initial gadget-specific state.
pub trait GadgetTemplate: fmt::Debug + Send + Sync {
    /// Unique type name, used as the identity in save records
    fn type_name(&self) -> &str;

    /// Renderable parts of one instance
    fn visual_parts(&self) -> Vec<RenderHandle>;

    /// State a fresh instance starts with
    fn default_state(&self) -> GadgetState {
        GadgetState::default()
    }
}

/// Looks up templates by type name
pub trait TemplateResolver {
    fn resolve_template(&self, type_name: &str) -> Option<Arc<dyn GadgetTemplate>>;
}

/// Ordered collection of known templates.
///
/// Registration order is kept so listings (such as the inventory table) are
/// stable.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Vec<Arc<dyn GadgetTemplate>>,
}

impl TemplateRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in gadget.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::register_builtins(&mut registry);
        registry
    }

    /// Registers a template, replacing any template with the same name.
    pub fn register<T: GadgetTemplate + 'static>(&mut self, template: T) {
        let template: Arc<dyn GadgetTemplate> = Arc::new(template);
        if let Some(existing) = self
            .templates
            .iter_mut()
            .find(|t| t.type_name() == template.type_name())
        {
            tracing::warn!(name = template.type_name(), "Replacing gadget template");
            *existing = template;
        } else {
            self.templates.push(template);
        }
    }

    /// Unregisters a template by name.
    pub fn unregister(&mut self, type_name: &str) -> Option<Arc<dyn GadgetTemplate>> {
        let pos = self
            .templates
            .iter()
            .position(|t| t.type_name() == type_name)?;
        Some(self.templates.remove(pos))
    }

    /// Gets a template by name.
    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn GadgetTemplate>> {
        self.templates.iter().find(|t| t.type_name() == type_name)
    }

    /// Returns true if a template with the given name is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.get(type_name).is_some()
    }

    /// Returns the number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns an iterator over all templates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn GadgetTemplate>> {
        self.templates.iter()
    }

    /// Type names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.templates
            .iter()
            .map(|t| t.type_name().to_string())
            .collect()
    }
}

impl TemplateResolver for TemplateRegistry {
    fn resolve_template(&self, type_name: &str) -> Option<Arc<dyn GadgetTemplate>> {
        self.get(type_name).cloned()
    }
}

impl<R: TemplateResolver + ?Sized> TemplateResolver for Arc<R> {
    fn resolve_template(&self, type_name: &str) -> Option<Arc<dyn GadgetTemplate>> {
        (**self).resolve_template(type_name)
    }
}
