//! Process wide cache resolving external attribute names to internal keys.
//!
//! One [`NameMap`] is computed per entity type on first use and shared
//! afterwards. Entries are never replaced: when two callers race on the first
//! resolution, the first insertion wins.

use crate::Schema;
use std::{
    collections::HashMap,
    ptr,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

static NAME_MAPS: LazyLock<RwLock<HashMap<usize, Arc<NameMap>>>> =
    LazyLock::new(Default::default);

/// External name to internal key mapping of one entity type.
#[derive(Debug, Default)]
pub struct NameMap {
    external: HashMap<&'static str, &'static str>,
}

impl NameMap {
    fn new(schema: &Schema) -> Self {
        Self {
            external: schema
                .attributes()
                .iter()
                .map(|v| (v.name, v.key))
                .collect(),
        }
    }

    /// Internal key for a storage or internal name, `None` when the name is unknown.
    pub fn resolve(&self, schema: &Schema, name: &str) -> Option<&'static str> {
        if let Some(attribute) = schema.attribute(name) {
            return Some(attribute.key);
        }
        self.external.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.external.is_empty()
    }
}

fn identity(schema: &'static Schema) -> usize {
    ptr::from_ref(schema) as usize
}

/// Returns the mapping of `schema`, computing it the first time.
pub fn name_map(schema: &'static Schema) -> Arc<NameMap> {
    let id = identity(schema);
    if let Some(map) = NAME_MAPS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return map.clone();
    }
    let mut maps = NAME_MAPS.write().unwrap_or_else(PoisonError::into_inner);
    maps.entry(id)
        .or_insert_with(|| {
            log::debug!("Building the name map of `{}`", schema.table());
            Arc::new(NameMap::new(schema))
        })
        .clone()
}

/// Whether the mapping of `schema` was already computed.
pub fn is_cached(schema: &'static Schema) -> bool {
    NAME_MAPS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&identity(schema))
}

/// Resolves `name` (internal key or external name) to the internal key.
pub fn resolve(schema: &'static Schema, name: &str) -> Option<&'static str> {
    name_map(schema).resolve(schema, name)
}
