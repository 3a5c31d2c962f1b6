//! Serializable gadget snapshots

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A single gadget-specific value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

/// Gadget-specific state, keyed by name.
///
/// Keys a gadget type does not know about are kept as-is, so records written
/// by newer builds survive a load and save by older ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GadgetState(BTreeMap<String, StateValue>);

impl GadgetState {
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: StateValue) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        self.0.remove(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(StateValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(StateValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(StateValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Overwrite entries with those from `other`
    pub fn merge(&mut self, other: &GadgetState) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StateValue)> {
        self.0.iter()
    }
}

/// Flattened, serialization-safe projection of a gadget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GadgetSaveRecord {
    /// Template type name
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
    /// Gadget-specific state; absent in records of stateless gadgets
    #[serde(default, skip_serializing_if = "GadgetState::is_empty")]
    pub state: GadgetState,
}
