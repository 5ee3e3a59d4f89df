use crate::{Record, Result, Schema, TableRef, Value, stream::Stream};
use std::future::Future;

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Key generated by an insert, when the backend produced one.
    pub last_affected_id: Option<i64>,
}

impl RowsAffected {
    /// Generated key, `0` counts as none.
    pub fn new_key(&self) -> Option<i64> {
        self.last_affected_id.filter(|v| *v != 0)
    }
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

/// Storage collaborator of the models.
///
/// Keys are an ordered list of `(storage name, value)` pairs matched by
/// equality, a composite key simply carries more than one pair. Records
/// handed to `insert` / `update` may contain [`Value::SqlNull`], which must be
/// stored as a true NULL. Failures are reported as `Err`.
pub trait Executor: Send {
    /// Prepares the storage of an entity: primary key uniqueness and, for a
    /// single primary key, key generation. Existing tables are kept.
    fn create_table(&mut self, schema: &Schema) -> impl Future<Output = Result<()>> + Send;

    /// Removes a table and its rows, missing tables are not an error.
    fn drop_table(&mut self, table: &TableRef) -> impl Future<Output = Result<()>> + Send;

    /// Single row fetch.
    fn select(
        &mut self,
        table: &TableRef,
        keys: &[(&str, Value)],
    ) -> impl Future<Output = Result<Option<Record>>> + Send;

    /// Every row where `key` equals `value`.
    fn select_all(
        &mut self,
        table: &TableRef,
        key: &str,
        value: &Value,
    ) -> impl Stream<Item = Result<Record>> + Send;

    /// Insert a row, `last_affected_id` carries the generated key if any.
    fn insert(
        &mut self,
        table: &TableRef,
        projection: &Record,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    fn update(
        &mut self,
        table: &TableRef,
        keys: &[(&str, Value)],
        projection: &Record,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    fn delete(
        &mut self,
        table: &TableRef,
        keys: &[(&str, Value)],
    ) -> impl Future<Output = Result<RowsAffected>> + Send;
}
