use crate::{Call, MemoryDriver, Store, owned_keys};
use async_stream::try_stream;
use std::{borrow::Cow, env, sync::Arc};
use strata_core::{
    Connection, Context, Driver, Error, Executor, ModelError, Record, Result, RowsAffected,
    Schema, TableRef, Value, stream::Stream,
};
use tokio::sync::Mutex;
use url::Url;
use urlencoding::decode;

/// Executor keeping its tables in process memory.
///
/// Clones share the same tables and the same call log.
#[derive(Clone)]
pub struct MemoryConnection {
    label: String,
    read_only: bool,
    store: Arc<Mutex<Store>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MemoryConnection {
    pub fn new(label: impl Into<String>, start: i64, read_only: bool) -> Self {
        Self {
            label: label.into(),
            read_only,
            store: Arc::new(Mutex::new(Store::new(start))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Calls received so far.
    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    /// Current rows of a table, empty when the table does not exist.
    pub async fn rows(&self, table: &TableRef) -> Vec<Record> {
        self.store
            .lock()
            .await
            .table(table)
            .map(|v| v.rows.clone())
            .unwrap_or_default()
    }

    async fn record(&self, call: Call) {
        log::debug!("Memory `{}` received {:?}", self.label, call);
        self.calls.lock().await.push(call);
    }

    fn check_writable(&self, table: &TableRef) -> Result<()> {
        if self.read_only {
            let error = ModelError::database(format!(
                "Memory database `{}` is read only",
                self.label
            ))
            .context(format!("While writing to `{table}`"));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }
}

impl Default for MemoryConnection {
    fn default() -> Self {
        Self::new("default", 1, false)
    }
}

impl Executor for MemoryConnection {
    async fn create_table(&mut self, schema: &Schema) -> Result<()> {
        if self.store.lock().await.create_table(schema) {
            log::debug!("Memory `{}` created table `{}`", self.label, schema.table());
        }
        Ok(())
    }

    async fn drop_table(&mut self, table: &TableRef) -> Result<()> {
        if self.store.lock().await.drop_table(table) {
            log::debug!("Memory `{}` dropped table `{}`", self.label, table);
        }
        Ok(())
    }

    async fn select(&mut self, table: &TableRef, keys: &[(&str, Value)]) -> Result<Option<Record>> {
        self.record(Call::Select {
            table: table.full_name(),
            keys: owned_keys(keys),
        })
        .await;
        Ok(self.store.lock().await.select(table, keys))
    }

    fn select_all(
        &mut self,
        table: &TableRef,
        key: &str,
        value: &Value,
    ) -> impl Stream<Item = Result<Record>> + Send {
        let call = Call::SelectAll {
            table: table.full_name(),
            key: key.to_owned(),
            value: value.clone(),
        };
        let table = table.clone();
        let key = key.to_owned();
        let value = value.clone();
        try_stream! {
            self.record(call).await;
            let rows = self.store.lock().await.select_all(&table, &key, &value);
            for row in rows {
                yield row;
            }
        }
    }

    async fn insert(&mut self, table: &TableRef, projection: &Record) -> Result<RowsAffected> {
        self.record(Call::Insert {
            table: table.full_name(),
            record: projection.clone(),
        })
        .await;
        self.check_writable(table)?;
        self.store.lock().await.insert(table, projection)
    }

    async fn update(
        &mut self,
        table: &TableRef,
        keys: &[(&str, Value)],
        projection: &Record,
    ) -> Result<RowsAffected> {
        self.record(Call::Update {
            table: table.full_name(),
            keys: owned_keys(keys),
            record: projection.clone(),
        })
        .await;
        self.check_writable(table)?;
        Ok(self.store.lock().await.update(table, keys, projection))
    }

    async fn delete(&mut self, table: &TableRef, keys: &[(&str, Value)]) -> Result<RowsAffected> {
        self.record(Call::Delete {
            table: table.full_name(),
            keys: owned_keys(keys),
        })
        .await;
        self.check_writable(table)?;
        Ok(self.store.lock().await.delete(table, keys))
    }
}

impl Connection for MemoryConnection {
    #[allow(refining_impl_trait)]
    async fn connect(url: Cow<'static, str>) -> Result<MemoryConnection> {
        let context = || format!("While trying to connect to `{}`", url);
        let url = decode(&url).with_context(context)?;
        let prefix = format!("{}://", MemoryDriver::NAME);
        if !url.starts_with(&prefix) {
            let error = Error::msg(format!(
                "Memory connection url must start with `{}`",
                &prefix
            ))
            .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        let url = Url::parse(&url).with_context(context)?;
        let take_url_param = |key: &str, env_var: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .or_else(|| env::var(env_var).ok())
        };
        let start = match take_url_param("start", "STRATA_MEMORY_START") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid `start` value `{v}`"))
                .with_context(context)?,
            None => 1,
        };
        let read_only = match take_url_param("read_only", "STRATA_MEMORY_READ_ONLY") {
            Some(v) => match v.trim() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" | "" => false,
                v => {
                    return Err(Error::msg(format!("Invalid `read_only` value `{v}`"))
                        .context(context()));
                }
            },
            None => false,
        };
        let label = url.host_str().unwrap_or_default().to_owned();
        log::debug!(
            "Connected to memory database `{}` (start {}, read only {})",
            label,
            start,
            read_only
        );
        Ok(Self::new(label, start, read_only))
    }
}
