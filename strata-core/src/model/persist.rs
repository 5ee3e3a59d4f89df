use crate::{
    AttributeDef, Cardinality, Context, Executor, Model, ModelError, Record, Result, Schema, Value,
    mapping, printable_pairs, stream::TryStreamExt,
};
use futures::{FutureExt, future::BoxFuture};

/// Behavior of a load that finds no matching row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoadOption {
    /// Return the filled, unsaved instance.
    #[default]
    NotExistsNew,
    /// Fail with `NotFound`.
    NotExistsFail,
    /// Create the row from the supplied attributes.
    NotExistsCreate,
}

/// Behavior of a create whose insert does not produce a row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CreateOption {
    /// Fail with `Duplicate` or `Database`.
    #[default]
    Fail,
    /// Update the existing row instead.
    UpdateOnExists,
    /// Return the instance unsaved.
    IgnoreOnFailure,
}

fn printable_keys(keys: &[(&str, Value)]) -> String {
    printable_pairs(keys.iter().map(|(k, v)| (*k, v)))
}

impl Model {
    /// Populates every attribute from `record` (by internal key or external
    /// name). Child relations missing from the record are loaded through the
    /// executor using the parent's foreign key value, every other missing
    /// attribute gets its default. The schema's instantiate hook runs last.
    pub async fn fill<E: Executor>(&mut self, executor: &mut E, record: &Record) -> Result<&mut Self> {
        let schema = self.schema();
        let mut related = Vec::new();
        for attribute in schema.attributes() {
            match record
                .get(attribute.key)
                .or_else(|| record.get(attribute.name))
            {
                Some(value) => {
                    self.set_attrib_value(attribute.key, value.clone())?;
                }
                None if attribute.relation().is_some() && attribute.foreign_key.is_some() => {
                    related.push(attribute);
                }
                None => {
                    self.set_attrib_value(attribute.key, attribute.default.clone())?;
                }
            }
        }
        // Relations after the plain attributes, their filter is the parent key
        for attribute in related {
            let value = self.load_related(executor, attribute).await?;
            self.set_attrib_value(attribute.key, value)?;
        }
        if let Some(hook) = schema.on_instantiate() {
            hook(self)?;
        }
        Ok(self)
    }

    async fn load_related<E: Executor>(
        &self,
        executor: &mut E,
        attribute: &AttributeDef,
    ) -> Result<Value> {
        let (Some(relation), Some(foreign_key)) = (attribute.relation(), attribute.foreign_key)
        else {
            return Ok(attribute.default.clone());
        };
        let parent_value = self.stored(foreign_key)?.clone();
        if parent_value.is_empty() {
            return Ok(match relation.cardinality {
                Cardinality::One => attribute.default.clone(),
                Cardinality::Many => Value::Children(Vec::new()),
            });
        }
        let child = relation.schema();
        let child_key = attribute.foreign_key_child.unwrap_or(foreign_key);
        let child_key = mapping::resolve(child, child_key)
            .and_then(|v| child.attribute(v))
            .map(|v| v.name)
            .ok_or_else(|| {
                ModelError::invalid_parameter(format!(
                    "`{}` is not an attribute of `{}`",
                    child_key,
                    child.table()
                ))
            })?;
        let children = Model::load_all(child, executor, child_key, &parent_value).await?;
        Ok(match relation.cardinality {
            Cardinality::One => children
                .into_iter()
                .next()
                .map_or_else(|| attribute.default.clone(), Value::from),
            Cardinality::Many => Value::Children(children),
        })
    }

    /// Every row of `schema` where `key` equals `value`, each marked as loaded.
    pub fn load_all<'a, E: Executor>(
        schema: &'static Schema,
        executor: &'a mut E,
        key: &'a str,
        value: &'a Value,
    ) -> BoxFuture<'a, Result<Vec<Model>>> {
        async move {
            let records = executor
                .select_all(schema.table(), key, value)
                .try_collect::<Vec<_>>()
                .await
                .with_context(|| {
                    format!("While loading `{}` where {} = {}", schema.table(), key, value)
                })?;
            log::debug!(
                "Loaded {} rows of `{}` where {} = {}",
                records.len(),
                schema.table(),
                key,
                value
            );
            let mut result = Vec::with_capacity(records.len());
            for record in records {
                let mut model = Model::fabricate(schema)?;
                model.set_loaded(true);
                model.fill(executor, &record).await?;
                result.push(model);
            }
            Ok(result)
        }
        .boxed()
    }

    /// Fabricates and fills a new instance, inserts it and saves its children.
    pub async fn create<E: Executor>(
        schema: &'static Schema,
        executor: &mut E,
        record: &Record,
        option: CreateOption,
    ) -> Result<Model> {
        let table = schema.table();
        let mut model = Model::fabricate(schema)?;
        model.fill(executor, record).await?;
        let projection = model.sql_object(true)?;
        log::debug!("Creating `{}`: {}", table, projection);
        let failure = match executor.insert(table, &projection).await {
            Ok(affected) if affected.rows_affected > 0 || affected.new_key().is_some() => {
                if let Some(key) = affected.new_key()
                    && model.adopts_key()
                {
                    model.set_key(key)?;
                }
                None
            }
            Ok(..) => Some(ModelError::database(format!(
                "The insert into `{table}` did not produce a row"
            ))),
            Err(error) => Some(error),
        };
        match (failure, option) {
            (None, _) => model.set_loaded(true),
            (Some(error), CreateOption::UpdateOnExists) => {
                log::warn!(
                    "Could not insert into `{}`, updating the existing row: {:#}",
                    table,
                    error
                );
                model.set_loaded(true);
                if !model.save(executor, None, false).await? {
                    return Err(ModelError::database(format!(
                        "Could not insert nor update `{table}`"
                    )));
                }
            }
            (Some(error), CreateOption::IgnoreOnFailure) => {
                log::warn!("Ignoring the failed insert into `{}`: {:#}", table, error);
                return Ok(model);
            }
            (Some(error), CreateOption::Fail) => {
                let error = match ModelError::of(&error) {
                    Some(ModelError::Duplicate { .. }) => error,
                    _ => ModelError::database(format!("{error:#}")),
                };
                let error = error.context(format!("While creating `{table}`"));
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        if !model.save_children(executor).await? {
            log::warn!("Some children of `{}` could not be saved", table);
        }
        Ok(model)
    }

    /// Fills a new instance from `record` and looks its row up by primary key
    /// (by the supplied attributes when the entity has none). A found row is
    /// filled over the supplied values and the instance becomes loaded.
    pub async fn load<E: Executor>(
        schema: &'static Schema,
        executor: &mut E,
        record: &Record,
        option: LoadOption,
    ) -> Result<Model> {
        let mut model = Model::fabricate(schema)?;
        model.fill(executor, record).await?;
        let keys = if schema.has_primary_key() {
            if model.is_key_empty() {
                Vec::new()
            } else {
                model.key_pairs()?
            }
        } else {
            model.filter_pairs(record)?
        };
        model.find(executor, record, keys, option).await
    }

    /// Like [`Model::load`], matching every supplied attribute instead of the primary key.
    pub async fn load_by_attributes<E: Executor>(
        schema: &'static Schema,
        executor: &mut E,
        record: &Record,
        option: LoadOption,
    ) -> Result<Model> {
        let mut model = Model::fabricate(schema)?;
        model.fill(executor, record).await?;
        let keys = model.filter_pairs(record)?;
        model.find(executor, record, keys, option).await
    }

    /// Storage names and casted values of the plain attributes named in `record`.
    fn filter_pairs(&self, record: &Record) -> Result<Vec<(&'static str, Value)>> {
        let mut result: Vec<(&'static str, Value)> = Vec::with_capacity(record.len());
        for (name, _) in record.iter() {
            let attribute = self.attribute(name)?;
            if !attribute.is_column() || result.iter().any(|(v, _)| *v == attribute.name) {
                continue;
            }
            result.push((attribute.name, self.member(attribute).clone()));
        }
        Ok(result)
    }

    async fn find<E: Executor>(
        mut self,
        executor: &mut E,
        record: &Record,
        keys: Vec<(&'static str, Value)>,
        option: LoadOption,
    ) -> Result<Model> {
        let schema = self.schema();
        let table = schema.table();
        let found = if keys.is_empty() {
            log::debug!("Nothing identifies the `{}` row to load", table);
            None
        } else {
            executor
                .select(table, &keys)
                .await
                .with_context(|| format!("While loading `{}` where {}", table, printable_keys(&keys)))?
        };
        match (found, option) {
            (Some(row), _) => {
                log::debug!("Loaded `{}` where {}", table, printable_keys(&keys));
                self.set_loaded(true);
                self.fill(executor, &row).await?;
                Ok(self)
            }
            (None, LoadOption::NotExistsNew) => Ok(self),
            (None, LoadOption::NotExistsFail) => Err(ModelError::not_found(table)
                .context(format!("While loading `{}` where {}", table, printable_keys(&keys)))),
            (None, LoadOption::NotExistsCreate) => {
                Model::create(schema, executor, record, CreateOption::default()).await
            }
        }
    }

    /// Re-fetches the row by primary key and fills it over the current values.
    pub async fn reload<E: Executor>(&mut self, executor: &mut E) -> Result<&mut Self> {
        let table = self.schema().table();
        let keys = self.key_pairs()?;
        let found = executor
            .select(table, &keys)
            .await
            .with_context(|| format!("While reloading `{}` where {}", table, printable_keys(&keys)))?;
        let Some(row) = found else {
            return Err(ModelError::not_found(table)
                .context(format!("While reloading `{}` where {}", table, printable_keys(&keys))));
        };
        self.set_loaded(true);
        self.fill(executor, &row).await
    }

    /// Whether an insert should adopt the key generated by storage.
    fn adopts_key(&self) -> bool {
        self.schema().primary_key_defs().count() == 1 && self.is_key_empty()
    }

    /// Writes the instance: insert when it has no primary key, is not loaded
    /// or its key is empty, update by all primary key attributes otherwise.
    ///
    /// `partial` restricts the written attributes. Executor failures are logged
    /// and reported as `false`. Children are saved afterwards when `cascade`.
    pub fn save<'a, E: Executor>(
        &'a mut self,
        executor: &'a mut E,
        partial: Option<&'a [&'a str]>,
        cascade: bool,
    ) -> BoxFuture<'a, Result<bool>> {
        async move {
            let schema = self.schema();
            let table = schema.table();
            let has_key = schema.has_primary_key();
            if !has_key && self.is_loaded() {
                return Err(ModelError::no_primary_key(table)
                    .context(format!("While updating a loaded `{table}` row")));
            }
            let insert = !has_key || !self.is_loaded() || self.is_key_empty();
            let mut projection = self.sql_object(insert)?;
            if let Some(partial) = partial {
                let names = partial
                    .iter()
                    .map(|v| self.attribute(v).map(|v| v.name))
                    .collect::<Result<Vec<_>>>()?;
                projection.retain(|name, _| names.iter().any(|v| *v == name));
            }
            let mut result = if insert {
                self.insert_row(executor, &projection).await?
            } else {
                self.update_row(executor, projection).await?
            };
            if cascade {
                result &= self.save_children(executor).await?;
            }
            Ok(result)
        }
        .boxed()
    }

    async fn insert_row<E: Executor>(&mut self, executor: &mut E, projection: &Record) -> Result<bool> {
        let table = self.schema().table();
        log::debug!("Inserting into `{}`: {}", table, projection);
        let affected = match executor.insert(table, projection).await {
            Ok(affected) => affected,
            Err(error) => {
                log::error!("{:#}", error.context(format!("While inserting into `{table}`")));
                return Ok(false);
            }
        };
        if self.adopts_key() {
            let Some(key) = affected.new_key() else {
                log::error!("The insert into `{}` did not produce a key", table);
                return Ok(false);
            };
            self.set_key(key)?;
        } else if affected.rows_affected == 0 {
            log::error!("The insert into `{}` did not produce a row", table);
            return Ok(false);
        }
        self.set_loaded(true);
        Ok(true)
    }

    async fn update_row<E: Executor>(&mut self, executor: &mut E, mut projection: Record) -> Result<bool> {
        let table = self.schema().table();
        let keys = self.key_pairs()?;
        for (name, _) in &keys {
            projection.remove(name);
        }
        if projection.is_empty() {
            log::debug!("Nothing to update in `{}` where {}", table, printable_keys(&keys));
            return Ok(true);
        }
        log::debug!(
            "Updating `{}` where {}: {}",
            table,
            printable_keys(&keys),
            projection
        );
        match executor.update(table, &keys, &projection).await {
            Ok(..) => Ok(true),
            Err(error) => {
                log::error!(
                    "{:#}",
                    error.context(format!("While updating `{}` where {}", table, printable_keys(&keys)))
                );
                Ok(false)
            }
        }
    }

    /// Saves every child, after pointing its foreign key at this instance.
    fn save_children<'a, E: Executor>(&'a mut self, executor: &'a mut E) -> BoxFuture<'a, Result<bool>> {
        async move {
            let relations = self.schema().relations().collect::<Vec<_>>();
            let mut result = true;
            for attribute in relations {
                let parent_value = match attribute.foreign_key {
                    Some(key) => Some(self.stored(key)?.clone()),
                    None => None,
                };
                let child_key = attribute.foreign_key_child.or(attribute.foreign_key);
                let children: Vec<&mut Model> = match self.member_mut(attribute) {
                    Some(Value::Child(child)) => vec![child.as_mut()],
                    Some(Value::Children(children)) => children.iter_mut().collect(),
                    _ => continue,
                };
                for child in children {
                    if let (Some(key), Some(value)) = (child_key, &parent_value) {
                        child.set_attrib_value(key, value.clone())?;
                    }
                    let saved = child.save(executor, None, true).await?;
                    if !saved {
                        log::warn!(
                            "Could not save a `{}` child of `{}`",
                            child.schema().table(),
                            attribute.key
                        );
                    }
                    result &= saved;
                }
            }
            Ok(result)
        }
        .boxed()
    }

    /// Deletes the children first, then the row: by primary key, or for a
    /// loaded entity without primary key by every non null column value.
    /// Returns whether a row was removed, executor failures give `false`.
    pub fn delete<'a, E: Executor>(&'a mut self, executor: &'a mut E) -> BoxFuture<'a, Result<bool>> {
        async move {
            let schema = self.schema();
            let table = schema.table();
            let has_key = schema.has_primary_key();
            let keys = if has_key {
                if self.is_key_empty() {
                    log::debug!("The `{}` row to delete has no key value", table);
                    return Ok(false);
                }
                self.key_pairs()?
            } else if self.is_loaded() {
                schema
                    .attributes()
                    .iter()
                    .filter(|v| v.is_column())
                    .filter_map(|v| {
                        let value = self.member(v);
                        (!value.is_null()).then(|| (v.name, value.clone()))
                    })
                    .collect::<Vec<_>>()
            } else {
                return Err(ModelError::no_primary_key(table)
                    .context(format!("While deleting an unloaded `{table}` row")));
            };
            if keys.is_empty() {
                log::warn!("Nothing identifies the `{}` row to delete", table);
                return Ok(false);
            }
            if !self.delete_children(executor).await? {
                log::warn!("Some children of `{}` could not be deleted", table);
            }
            log::debug!("Deleting `{}` where {}", table, printable_keys(&keys));
            match executor.delete(table, &keys).await {
                Ok(affected) => {
                    let deleted = affected.rows_affected > 0 || !has_key;
                    if deleted {
                        self.set_loaded(false);
                    }
                    Ok(deleted)
                }
                Err(error) => {
                    log::error!(
                        "{:#}",
                        error.context(format!("While deleting `{}` where {}", table, printable_keys(&keys)))
                    );
                    Ok(false)
                }
            }
        }
        .boxed()
    }

    /// Deletes the children held in memory, loading them first when the
    /// relation is empty but linked by a foreign key.
    fn delete_children<'a, E: Executor>(&'a mut self, executor: &'a mut E) -> BoxFuture<'a, Result<bool>> {
        async move {
            let relations = self.schema().relations().collect::<Vec<_>>();
            let mut result = true;
            for attribute in relations {
                let held = match self.member(attribute) {
                    Value::Child(..) => true,
                    Value::Children(children) => !children.is_empty(),
                    _ => false,
                };
                if !held && attribute.foreign_key.is_some() {
                    let related = self.load_related(executor, attribute).await?;
                    self.members.insert(attribute.key, related);
                }
                let children: Vec<&mut Model> = match self.member_mut(attribute) {
                    Some(Value::Child(child)) => vec![child.as_mut()],
                    Some(Value::Children(children)) => children.iter_mut().collect(),
                    _ => continue,
                };
                for child in children {
                    result &= child.delete(executor).await?;
                }
                let cleared = match attribute.relation().map(|v| v.cardinality) {
                    Some(Cardinality::Many) => Value::Children(Vec::new()),
                    _ => Value::Null,
                };
                self.members.insert(attribute.key, cleared);
            }
            Ok(result)
        }
        .boxed()
    }
}
