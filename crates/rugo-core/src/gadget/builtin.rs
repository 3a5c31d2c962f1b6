//! Built-in gadget variants

use super::{GadgetState, GadgetTemplate, RenderHandle, StateValue, TemplateRegistry};

/// Register every built-in template
pub(crate) fn register_builtins(registry: &mut TemplateRegistry) {
    registry.register(Domino);
    registry.register(Ramp);
    registry.register(Pendulum);
    registry.register(Ball);
}

/// Standing domino tile
#[derive(Debug, Clone, Copy, Default)]
pub struct Domino;

impl GadgetTemplate for Domino {
    fn type_name(&self) -> &str {
        "Domino"
    }

    fn visual_parts(&self) -> Vec<RenderHandle> {
        vec![RenderHandle::new("tile")]
    }
}

/// Inclined ramp
#[derive(Debug, Clone, Copy, Default)]
pub struct Ramp;

impl Ramp {
    pub const INCLINE: &'static str = "incline_degrees";
}

impl GadgetTemplate for Ramp {
    fn type_name(&self) -> &str {
        "Ramp"
    }

    fn visual_parts(&self) -> Vec<RenderHandle> {
        vec![RenderHandle::new("deck"), RenderHandle::new("support")]
    }

    fn default_state(&self) -> GadgetState {
        let mut state = GadgetState::default();
        state.set(Self::INCLINE, StateValue::Number(15.0));
        state
    }
}

/// Pendulum hanging from a pivot; every child part is rendered
#[derive(Debug, Clone, Copy, Default)]
pub struct Pendulum;

impl Pendulum {
    pub const LENGTH: &'static str = "length";
}

impl GadgetTemplate for Pendulum {
    fn type_name(&self) -> &str {
        "Pendulum"
    }

    fn visual_parts(&self) -> Vec<RenderHandle> {
        ["frame", "pivot", "rod", "bob"]
            .into_iter()
            .map(RenderHandle::new)
            .collect()
    }

    fn default_state(&self) -> GadgetState {
        let mut state = GadgetState::default();
        state.set(Self::LENGTH, StateValue::Number(0.3));
        state
    }
}

/// Rolling ball
#[derive(Debug, Clone, Copy, Default)]
pub struct Ball;

impl GadgetTemplate for Ball {
    fn type_name(&self) -> &str {
        "Ball"
    }

    fn visual_parts(&self) -> Vec<RenderHandle> {
        vec![RenderHandle::new("sphere")]
    }
}
