use crate::{Context, Model, Record, Result, Value};
use serde_json::Map;

/// Options of [`Model::raw_json`].
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonOptions {
    /// Indented output.
    pub pretty: bool,
    /// Leave out attributes whose value is null.
    pub skip_nulls: bool,
}

impl Model {
    /// Projection of the current state keyed by external names.
    ///
    /// Plain mode keeps child models as they are. Iterated mode walks
    /// [`Model::iter`] and unpacks every child into its own nested projection.
    pub fn raw_array(&self, iterated: bool) -> Result<Record> {
        let mut result = Record::with_capacity(self.schema().attributes().len());
        if !iterated {
            for attribute in self.schema().attributes() {
                result.insert(attribute.name, self.member(attribute).clone());
            }
            return Ok(result);
        }
        for (name, value) in self {
            let value = match value {
                Value::Child(child) => Value::Record(Box::new(child.raw_array(true)?)),
                Value::Children(children) => Value::List(
                    children
                        .iter()
                        .map(|v| v.raw_array(true).map(|v| Value::Record(Box::new(v))))
                        .collect::<Result<_>>()?,
                ),
                v => v.clone(),
            };
            result.insert(name, value);
        }
        Ok(result)
    }

    /// JSON object view of [`Model::raw_array`]. In plain mode children appear
    /// through their key reference, iterated mode nests their objects.
    pub fn raw_object(&self, iterated: bool) -> Result<Map<String, serde_json::Value>> {
        Ok(self
            .raw_array(iterated)?
            .iter()
            .map(|(name, value)| (name.to_owned(), value.to_json()))
            .collect())
    }

    pub fn raw_json(&self, options: JsonOptions, iterated: bool) -> Result<String> {
        let mut object = self.raw_object(iterated)?;
        if options.skip_nulls {
            object.retain(|_, v| !v.is_null());
        }
        let object = serde_json::Value::Object(object);
        let result = if options.pretty {
            serde_json::to_string_pretty(&object)
        } else {
            serde_json::to_string(&object)
        };
        result.with_context(|| format!("While serializing `{}`", self.schema().table()))
    }

    /// Storage projection keyed by storage names.
    ///
    /// Relations and dynamic attributes are left out, null values become
    /// [`Value::SqlNull`]. With `no_primary`, primary key attributes without a
    /// value are omitted so that storage assigns them.
    pub fn sql_object(&self, no_primary: bool) -> Result<Record> {
        let mut result = Record::with_capacity(self.schema().attributes().len());
        for attribute in self.schema().attributes() {
            if !attribute.is_column() {
                continue;
            }
            let value = self.member(attribute);
            if no_primary && attribute.primary_key && value.is_empty() {
                continue;
            }
            let value = match value {
                Value::Null => Value::SqlNull,
                v => v.clone(),
            };
            result.insert(attribute.name, value);
        }
        Ok(result)
    }

    /// Compact reference used when a child appears in a non iterated JSON view:
    /// the key value, an object of key values for composite keys, null without key.
    pub fn key_reference(&self) -> serde_json::Value {
        let keys = self.schema().primary_key_defs().collect::<Vec<_>>();
        match keys.as_slice() {
            [] => serde_json::Value::Null,
            [key] => self.member(key).to_json(),
            keys => serde_json::Value::Object(
                keys.iter()
                    .map(|v| (v.name.to_owned(), self.member(v).to_json()))
                    .collect(),
            ),
        }
    }
}
