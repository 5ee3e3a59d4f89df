use crate::{Model, Result, Value};
use std::collections::HashMap;

/// Getter override, receives the stored value and the caller's default.
pub type Getter = fn(stored: &Value, default: &Value) -> Result<Value>;
/// Setter override, receives the incoming value and the model. Its result is what gets casted and stored.
pub type Setter = fn(value: Value, model: &Model) -> Result<Value>;
/// Runs after every fill.
pub type InstantiateHook = fn(model: &mut Model) -> Result<()>;

/// Override slots of a single attribute.
#[derive(Debug, Default, Clone, Copy)]
pub struct Accessors {
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
}

/// Per entity type table of accessor overrides, keyed by internal attribute key.
#[derive(Debug, Default, Clone)]
pub struct AccessorTable {
    entries: HashMap<&'static str, Accessors>,
}

impl AccessorTable {
    pub fn getter(&self, key: &str) -> Option<Getter> {
        self.entries.get(key).and_then(|v| v.getter)
    }

    pub fn setter(&self, key: &str) -> Option<Setter> {
        self.entries.get(key).and_then(|v| v.setter)
    }

    pub(crate) fn set_getter(&mut self, key: &'static str, getter: Getter) {
        self.entries.entry(key).or_default().getter = Some(getter);
    }

    pub(crate) fn set_setter(&mut self, key: &'static str, setter: Setter) {
        self.entries.entry(key).or_default().setter = Some(setter);
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
