use crate::{
    AccessorTable, AttributeDef, Getter, InstantiateHook, ModelError, Result, Setter, TableRef,
};
use std::collections::HashMap;

/// Metadata of one entity type: where it is stored, its attributes in
/// declaration order and the accessor overrides registered for them.
///
/// Built once per entity type, usually inside a `LazyLock` static:
/// ```rust
/// use std::sync::LazyLock;
/// use strata_core::{AttributeDef, DataType, Schema};
///
/// static TAX_CLASS: LazyLock<Schema> = LazyLock::new(|| {
///     Schema::builder("tax_class")
///         .attribute(AttributeDef::new("id", "tax_class_id", DataType::sql("int")).primary_key())
///         .attribute(AttributeDef::new("title", "tax_class_title", DataType::sql("varchar(32)")).default(""))
///         .build()
/// });
/// assert_eq!(TAX_CLASS.attributes().len(), 2);
/// ```
#[derive(Debug)]
pub struct Schema {
    table: TableRef,
    attributes: Vec<AttributeDef>,
    index: HashMap<&'static str, usize>,
    accessors: AccessorTable,
    on_instantiate: Option<InstantiateHook>,
}

impl Schema {
    pub fn builder(table: &'static str) -> SchemaBuilder {
        SchemaBuilder::new(TableRef::new(table))
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Looks up an attribute by internal key.
    pub fn attribute(&self, key: &str) -> Option<&AttributeDef> {
        self.index.get(key).map(|i| &self.attributes[*i])
    }

    pub fn accessors(&self) -> &AccessorTable {
        &self.accessors
    }

    pub fn on_instantiate(&self) -> Option<InstantiateHook> {
        self.on_instantiate
    }

    pub fn primary_key_defs(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.iter().filter(|v| v.primary_key)
    }

    pub fn has_primary_key(&self) -> bool {
        self.primary_key_defs().next().is_some()
    }

    /// Primary key attributes, failing when the entity declares none.
    pub fn require_primary_key(&self) -> Result<Vec<&AttributeDef>> {
        let result = self.primary_key_defs().collect::<Vec<_>>();
        if result.is_empty() {
            return Err(ModelError::no_primary_key(&self.table));
        }
        Ok(result)
    }

    pub fn relations(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.iter().filter(|v| v.relation().is_some())
    }
}

pub struct SchemaBuilder {
    table: TableRef,
    attributes: Vec<AttributeDef>,
    accessors: AccessorTable,
    on_instantiate: Option<InstantiateHook>,
}

impl SchemaBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            attributes: Vec::new(),
            accessors: Default::default(),
            on_instantiate: None,
        }
    }

    pub fn table_schema(mut self, schema: &'static str) -> Self {
        self.table = self.table.with_schema(schema);
        self
    }

    /// Declares the next attribute. Redeclaring a key replaces the earlier declaration in place.
    pub fn attribute(mut self, attribute: AttributeDef) -> Self {
        match self.attributes.iter().position(|v| v.key == attribute.key) {
            Some(i) => self.attributes[i] = attribute,
            None => self.attributes.push(attribute),
        }
        self
    }

    pub fn getter(mut self, key: &'static str, getter: Getter) -> Self {
        self.accessors.set_getter(key, getter);
        self
    }

    pub fn setter(mut self, key: &'static str, setter: Setter) -> Self {
        self.accessors.set_setter(key, setter);
        self
    }

    pub fn on_instantiate(mut self, hook: InstantiateHook) -> Self {
        self.on_instantiate = Some(hook);
        self
    }

    pub fn build(self) -> Schema {
        let index = self
            .attributes
            .iter()
            .enumerate()
            .map(|(i, v)| (v.key, i))
            .collect::<HashMap<_, _>>();
        for key in self.accessors.keys() {
            if !index.contains_key(key) {
                log::warn!(
                    "Accessor registered for `{}` which is not an attribute of `{}`",
                    key,
                    self.table
                );
            }
        }
        Schema {
            table: self.table,
            attributes: self.attributes,
            index,
            accessors: self.accessors,
            on_instantiate: self.on_instantiate,
        }
    }
}
