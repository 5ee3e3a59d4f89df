use crate::{Schema, Value};
use std::fmt::{self, Debug, Formatter};

/// How many child models a relation holds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// One owned child.
    #[default]
    One,
    /// Ordered sequence of owned children.
    Many,
}

/// Link to the schema of a child entity.
///
/// The schema is reached through a function so that entity types may refer to
/// each other without either owning the other.
#[derive(Clone, Copy)]
pub struct Relation {
    pub schema: fn() -> &'static Schema,
    pub cardinality: Cardinality,
}

impl Relation {
    pub fn schema(&self) -> &'static Schema {
        (self.schema)()
    }
}

impl Debug for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("table", &self.schema().table().full_name())
            .field("cardinality", &self.cardinality)
            .finish()
    }
}

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy)]
pub enum DataType {
    /// Storage type spelling (`int`, `varchar(64)`, `datetime`, `flag`, ...),
    /// resolved to a family by the casting rules.
    Sql(&'static str),
    /// Child model relation.
    Model(Relation),
    /// Opaque value, stored as is.
    Opaque,
}

impl DataType {
    pub const fn sql(name: &'static str) -> Self {
        DataType::Sql(name)
    }
    pub const fn child(schema: fn() -> &'static Schema) -> Self {
        DataType::Model(Relation {
            schema,
            cardinality: Cardinality::One,
        })
    }
    pub const fn children(schema: fn() -> &'static Schema) -> Self {
        DataType::Model(Relation {
            schema,
            cardinality: Cardinality::Many,
        })
    }
    pub fn relation(&self) -> Option<&Relation> {
        match self {
            DataType::Model(relation) => Some(relation),
            _ => None,
        }
    }
}

/// Kind of form control a presentation layer renders for the attribute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    #[default]
    Text,
    TextArea,
    Number,
    Checkbox,
    Select,
    Radio,
    Date,
    Password,
    Hidden,
}

/// Presentation hints. Carried with the attribute, never interpreted by the model.
#[derive(Debug, Default, Clone)]
pub struct InputConfig {
    pub kind: InputKind,
    /// Allowed values with their display labels.
    pub values: Vec<(Value, String)>,
    pub read_only: bool,
    pub hidden: bool,
    pub required: bool,
    pub multiple: bool,
}

/// Declarative description of one mapped attribute.
#[derive(Debug, Clone)]
pub struct AttributeDef {
    /// Internal key, used for the model members.
    pub key: &'static str,
    /// Storage field name, also the external name.
    pub name: &'static str,
    pub data_type: DataType,
    pub nullable: bool,
    /// Value used by `fabricate` and whenever no value is supplied.
    pub default: Value,
    /// Primary key participation, more than one attribute forms a composite key.
    pub primary_key: bool,
    /// Key on the parent whose value filters the related children.
    pub foreign_key: Option<&'static str>,
    /// Matching key on the child, when it is named differently.
    pub foreign_key_child: Option<&'static str>,
    /// Derived attribute, never written to storage.
    pub dynamic: bool,
    pub input: InputConfig,
}

impl AttributeDef {
    /// Relations holding many children default to an empty sequence, every
    /// other attribute to null.
    pub fn new(key: &'static str, name: &'static str, data_type: DataType) -> Self {
        let default = match data_type.relation().map(|v| v.cardinality) {
            Some(Cardinality::Many) => Value::Children(Vec::new()),
            _ => Value::Null,
        };
        Self {
            key,
            name,
            data_type,
            nullable: false,
            default,
            primary_key: false,
            foreign_key: None,
            foreign_key_child: None,
            dynamic: false,
            input: InputConfig::default(),
        }
    }

    /// Attribute whose key and storage name coincide.
    pub fn named(name: &'static str, data_type: DataType) -> Self {
        Self::new(name, name, data_type)
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Links a child relation: `parent` names the key on this entity,
    /// `child` the corresponding key on the child entity (defaults to `parent`).
    pub fn foreign_key(mut self, parent: &'static str, child: Option<&'static str>) -> Self {
        self.foreign_key = Some(parent);
        self.foreign_key_child = child;
        self
    }

    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    pub fn input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    pub fn relation(&self) -> Option<&Relation> {
        self.data_type.relation()
    }

    /// Whether the attribute is a stored column of the entity's own row.
    pub fn is_column(&self) -> bool {
        self.relation().is_none()
            && self.foreign_key.is_none()
            && self.foreign_key_child.is_none()
            && !self.dynamic
    }
}
