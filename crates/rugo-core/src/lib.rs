//! RuGo Core
//!
//! Headless core of a Rube Goldberg machine builder: freehand path capture
//! and resampling, gadgets and their templates, the persisted world store and
//! the interaction session that drives them.

pub mod gadget;
pub mod geometry;
pub mod interaction;
pub mod inventory;
pub mod path;
pub mod session;
pub mod world;

pub use gadget::{Gadget, GadgetError, GadgetSaveRecord, GadgetTemplate, TemplateRegistry};
pub use interaction::{PointerFrame, PointerProvider, Ray, TablePlane};
pub use path::{CaptureSettings, PathCapture, resample};
pub use session::{GameMode, Session, SessionSettings, SharedWorld};
pub use world::{StoreSettings, WorldError, WorldStore};
