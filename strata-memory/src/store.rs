use std::collections::HashMap;
use strata_core::{
    ModelError, Record, Result, RowsAffected, Schema, TableRef, Value, printable_pairs, to_string,
};

/// Operation received by a [`MemoryConnection`](crate::MemoryConnection), in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Select {
        table: String,
        keys: Vec<(String, Value)>,
    },
    SelectAll {
        table: String,
        key: String,
        value: Value,
    },
    Insert {
        table: String,
        record: Record,
    },
    Update {
        table: String,
        keys: Vec<(String, Value)>,
        record: Record,
    },
    Delete {
        table: String,
        keys: Vec<(String, Value)>,
    },
}

impl Call {
    pub fn table(&self) -> &str {
        match self {
            Call::Select { table, .. }
            | Call::SelectAll { table, .. }
            | Call::Insert { table, .. }
            | Call::Update { table, .. }
            | Call::Delete { table, .. } => table,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Call::Insert { .. })
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Call::Update { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Call::Delete { .. })
    }
}

pub(crate) fn owned_keys(keys: &[(&str, Value)]) -> Vec<(String, Value)> {
    keys.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
}

/// Equality of a stored value and a filter value. Nulls match each other,
/// scalars of different variants compare through their string form.
pub fn matches_value(stored: &Value, filter: &Value) -> bool {
    if stored.is_null() || filter.is_null() {
        return stored.is_null() && filter.is_null();
    }
    if stored == filter {
        return true;
    }
    stored.is_scalar()
        && filter.is_scalar()
        && matches!((to_string(stored), to_string(filter)), (Ok(a), Ok(b)) if a == b)
}

fn matches_keys(row: &Record, keys: &[(&str, Value)]) -> bool {
    keys.iter().all(|(name, value)| {
        let stored = row.get(name).unwrap_or(&Value::Null);
        matches_value(stored, value)
    })
}

/// Storage keeps a true null, the sentinel only travels in projections.
fn stored(value: &Value) -> Value {
    match value {
        Value::SqlNull => Value::Null,
        v => v.clone(),
    }
}

#[derive(Debug, Default)]
pub struct Table {
    /// Column whose value is generated on insert.
    pub auto_increment: Option<String>,
    /// Columns that jointly identify a row.
    pub unique: Vec<String>,
    pub rows: Vec<Record>,
    next_id: i64,
}

impl Table {
    fn from_schema(schema: &Schema, start: i64) -> Self {
        let keys = schema.primary_key_defs().map(|v| v.name.to_owned()).collect::<Vec<_>>();
        Self {
            auto_increment: if keys.len() == 1 { keys.first().cloned() } else { None },
            unique: keys,
            rows: Vec::new(),
            next_id: start,
        }
    }

    fn insert(&mut self, table: &str, projection: &Record) -> Result<RowsAffected> {
        let mut row: Record = projection.iter().map(|(k, v)| (k, stored(v))).collect();
        let mut generated = None;
        if let Some(column) = &self.auto_increment {
            match row.get(column).filter(|v| !v.is_empty()) {
                Some(value) => {
                    if let Value::Int(id) = value {
                        self.next_id = self.next_id.max(id.saturating_add(1));
                    }
                }
                None => {
                    let id = self.next_id;
                    self.next_id = id.checked_add(1).ok_or_else(|| {
                        ModelError::database(format!("The keys of `{table}` are exhausted"))
                    })?;
                    row.insert(column.as_str(), id);
                    generated = Some(id);
                }
            }
        }
        if !self.unique.is_empty() {
            let keys = self
                .unique
                .iter()
                .map(|v| (v.as_str(), row.get(v).cloned().unwrap_or_default()))
                .collect::<Vec<_>>();
            if self.rows.iter().any(|v| matches_keys(v, &keys)) {
                return Err(ModelError::duplicate(table).context(format!(
                    "The key {} already exists",
                    printable_pairs(keys.iter().map(|(k, v)| (*k, v)))
                )));
            }
        }
        self.rows.push(row);
        Ok(RowsAffected {
            rows_affected: 1,
            last_affected_id: generated,
        })
    }

    fn update(&mut self, keys: &[(&str, Value)], projection: &Record) -> RowsAffected {
        let mut result = RowsAffected::default();
        for row in self.rows.iter_mut().filter(|v| matches_keys(v, keys)) {
            for (name, value) in projection.iter() {
                row.insert(name, stored(value));
            }
            result.rows_affected += 1;
        }
        result
    }

    fn delete(&mut self, keys: &[(&str, Value)]) -> RowsAffected {
        let before = self.rows.len();
        self.rows.retain(|v| !matches_keys(v, keys));
        RowsAffected {
            rows_affected: (before - self.rows.len()) as u64,
            last_affected_id: None,
        }
    }
}

/// Tables of one memory database, keyed by full table name.
#[derive(Debug)]
pub struct Store {
    tables: HashMap<String, Table>,
    /// First generated key of every new table.
    start: i64,
}

impl Store {
    pub fn new(start: i64) -> Self {
        Self {
            tables: HashMap::new(),
            start,
        }
    }

    pub fn table(&self, table: &TableRef) -> Option<&Table> {
        self.tables.get(&table.full_name())
    }

    fn table_mut(&mut self, table: &TableRef) -> &mut Table {
        let start = self.start;
        self.tables
            .entry(table.full_name())
            .or_insert_with(|| Table {
                next_id: start,
                ..Default::default()
            })
    }

    pub(crate) fn create_table(&mut self, schema: &Schema) -> bool {
        let name = schema.table().full_name();
        if self.tables.contains_key(&name) {
            return false;
        }
        self.tables
            .insert(name, Table::from_schema(schema, self.start));
        true
    }

    pub(crate) fn drop_table(&mut self, table: &TableRef) -> bool {
        self.tables.remove(&table.full_name()).is_some()
    }

    pub(crate) fn select(&self, table: &TableRef, keys: &[(&str, Value)]) -> Option<Record> {
        self.table(table)?
            .rows
            .iter()
            .find(|v| matches_keys(v, keys))
            .cloned()
    }

    pub(crate) fn select_all(&self, table: &TableRef, key: &str, value: &Value) -> Vec<Record> {
        let keys = [(key, value.clone())];
        self.table(table)
            .map(|v| {
                v.rows
                    .iter()
                    .filter(|v| matches_keys(v, &keys))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn insert(&mut self, table: &TableRef, projection: &Record) -> Result<RowsAffected> {
        self.table_mut(table).insert(&table.full_name(), projection)
    }

    pub(crate) fn update(
        &mut self,
        table: &TableRef,
        keys: &[(&str, Value)],
        projection: &Record,
    ) -> RowsAffected {
        self.table_mut(table).update(keys, projection)
    }

    pub(crate) fn delete(&mut self, table: &TableRef, keys: &[(&str, Value)]) -> RowsAffected {
        self.table_mut(table).delete(keys)
    }
}
