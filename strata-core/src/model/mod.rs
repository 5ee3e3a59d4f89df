mod iter;
mod persist;
mod serialize;

pub use iter::*;
pub use persist::*;
pub use serialize::*;

use crate::{
    AsValue, AttributeDef, ModelError, Record, Result, Schema, Value, cast, mapping, to_int,
};
use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    ptr,
};

/// Instance of an entity: the typed values of its attributes plus the
/// knowledge of whether they were confirmed to exist in storage.
#[derive(Clone)]
pub struct Model {
    schema: &'static Schema,
    members: HashMap<&'static str, Value>,
    loaded: bool,
}

impl Model {
    fn empty(schema: &'static Schema) -> Self {
        Self {
            schema,
            members: HashMap::with_capacity(schema.attributes().len()),
            loaded: false,
        }
    }

    /// New instance with every attribute set to its declared default.
    pub fn fabricate(schema: &'static Schema) -> Result<Self> {
        let mut result = Self::empty(schema);
        for attribute in schema.attributes() {
            result.set_attrib_value(attribute.key, attribute.default.clone())?;
        }
        Ok(result)
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Whether the current values were confirmed to exist in storage.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    /// Internal key of an internal or external attribute name.
    pub fn resolve(&self, name: &str) -> Option<&'static str> {
        mapping::resolve(self.schema, name)
    }

    pub(crate) fn attribute(&self, name: &str) -> Result<&'static AttributeDef> {
        self.resolve(name)
            .and_then(|key| self.schema.attribute(key))
            .ok_or_else(|| {
                ModelError::invalid_parameter(format!(
                    "`{}` is not an attribute of `{}`",
                    name,
                    self.schema.table()
                ))
            })
    }

    /// Value of an attribute, passed through its getter override when one is registered.
    ///
    /// Returns `default` when the attribute has no value yet, fails with
    /// `InvalidParameter` when `name` is not an attribute.
    pub fn get_attrib_value(&self, name: &str, default: Value) -> Result<Value> {
        let attribute = self.attribute(name)?;
        let Some(stored) = self.members.get(attribute.key) else {
            return Ok(default);
        };
        match self.schema.accessors().getter(attribute.key) {
            Some(getter) => getter(stored, &default),
            None => Ok(stored.clone()),
        }
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        self.get_attrib_value(name, Value::Null)
    }

    /// Typed read through [`AsValue`].
    pub fn get_as<T: AsValue>(&self, name: &str) -> Result<T> {
        T::try_from_value(self.get(name)?)
    }

    /// Stored value, bypassing getter overrides.
    pub fn stored(&self, name: &str) -> Result<&Value> {
        let attribute = self.attribute(name)?;
        Ok(self.members.get(attribute.key).unwrap_or(&Value::Null))
    }

    /// Sets an attribute: the setter override (if any) runs first, then the value is casted.
    pub fn set_attrib_value(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let attribute = self.attribute(name)?;
        let mut value = value.into();
        if let Some(setter) = self.schema.accessors().setter(attribute.key) {
            value = setter(value, self)?;
        }
        let value = cast(value, &attribute.data_type, attribute.nullable).map_err(|e| {
            e.context(format!(
                "While setting `{}` of `{}`",
                attribute.key,
                self.schema.table()
            ))
        })?;
        self.members.insert(attribute.key, value);
        Ok(self)
    }

    /// Assigns every field of `record` naming an attribute, other fields are ignored.
    pub fn assign(&mut self, record: &Record) -> Result<&mut Self> {
        for (name, value) in record.iter() {
            if self.resolve(name).is_some() {
                self.set_attrib_value(name, value.clone())?;
            }
        }
        Ok(self)
    }

    /// Name of the first primary key attribute, internal key when `real`, external name otherwise.
    pub fn key_name(&self, real: bool) -> Result<&'static str> {
        let key = self.schema.require_primary_key()?[0];
        Ok(if real { key.key } else { key.name })
    }

    /// Names of all primary key attributes, for composite keys.
    pub fn key_names(&self, real: bool) -> Result<Vec<&'static str>> {
        Ok(self
            .schema
            .require_primary_key()?
            .into_iter()
            .map(|v| if real { v.key } else { v.name })
            .collect())
    }

    /// Value of the (first) primary key as an integer.
    pub fn key(&self) -> Result<i64> {
        to_int(&self.get(self.key_name(true)?)?)
    }

    pub fn set_key(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        let key = self.key_name(true)?;
        self.set_attrib_value(key, value)
    }

    /// Storage name and stored value of every primary key attribute, in declaration order.
    pub fn key_pairs(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(self
            .schema
            .require_primary_key()?
            .into_iter()
            .map(|v| (v.name, self.member(v).clone()))
            .collect())
    }

    /// Whether no primary key attribute holds a value.
    pub fn is_key_empty(&self) -> bool {
        self.schema
            .primary_key_defs()
            .all(|v| self.member(v).is_empty())
    }

    pub(crate) fn member(&self, attribute: &AttributeDef) -> &Value {
        self.members.get(attribute.key).unwrap_or(&Value::Null)
    }

    pub(crate) fn member_mut(&mut self, attribute: &AttributeDef) -> Option<&mut Value> {
        self.members.get_mut(attribute.key)
    }

    /// New unsaved instance with the same values, except the attributes named in
    /// `except` which are reset to their defaults.
    ///
    /// Children are replicated too, without their primary keys, so saving the
    /// replica inserts fresh rows.
    pub fn replicate(&self, except: &[&str]) -> Result<Model> {
        let excluded = except
            .iter()
            .map(|name| self.attribute(name).map(|v| v.key))
            .collect::<Result<Vec<_>>>()?;
        let mut result = Model::fabricate(self.schema)?;
        for attribute in self.schema.attributes() {
            if excluded.contains(&attribute.key) {
                continue;
            }
            let value = match self.member(attribute) {
                Value::Child(child) => Value::Child(Box::new(child.replicate_without_key()?)),
                Value::Children(children) => Value::Children(
                    children
                        .iter()
                        .map(Model::replicate_without_key)
                        .collect::<Result<_>>()?,
                ),
                v => v.clone(),
            };
            result.members.insert(attribute.key, value);
        }
        Ok(result)
    }

    fn replicate_without_key(&self) -> Result<Model> {
        let keys = self
            .schema
            .primary_key_defs()
            .map(|v| v.key)
            .collect::<Vec<_>>();
        self.replicate(&keys)
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.schema, other.schema) && self.members == other.members
    }
}

impl Debug for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Model");
        debug.field("table", &self.schema.table().full_name());
        debug.field("loaded", &self.loaded);
        for attribute in self.schema.attributes() {
            debug.field(attribute.key, self.member(attribute));
        }
        debug.finish()
    }
}
