use crate::{CreateOption, Executor, LoadOption, Model, Record, Result, Schema, Value, future::BoxFuture};
use std::future::Future;

/// Entity type with a static schema.
///
/// Only [`Entity::schema`] must be provided, the rest forwards to the
/// corresponding [`Model`] operations.
pub trait Entity {
    fn schema() -> &'static Schema;

    fn create_table<E: Executor>(executor: &mut E) -> impl Future<Output = Result<()>> + Send {
        executor.create_table(Self::schema())
    }

    fn drop_table<E: Executor>(executor: &mut E) -> impl Future<Output = Result<()>> + Send {
        executor.drop_table(Self::schema().table())
    }

    fn fabricate() -> Result<Model> {
        Model::fabricate(Self::schema())
    }

    fn create<E: Executor>(
        executor: &mut E,
        record: &Record,
        option: CreateOption,
    ) -> impl Future<Output = Result<Model>> + Send {
        Model::create(Self::schema(), executor, record, option)
    }

    fn load<E: Executor>(
        executor: &mut E,
        record: &Record,
        option: LoadOption,
    ) -> impl Future<Output = Result<Model>> + Send {
        Model::load(Self::schema(), executor, record, option)
    }

    fn load_by_attributes<E: Executor>(
        executor: &mut E,
        record: &Record,
        option: LoadOption,
    ) -> impl Future<Output = Result<Model>> + Send {
        Model::load_by_attributes(Self::schema(), executor, record, option)
    }

    fn load_all<'a, E: Executor>(
        executor: &'a mut E,
        key: &'a str,
        value: &'a Value,
    ) -> BoxFuture<'a, Result<Vec<Model>>> {
        Model::load_all(Self::schema(), executor, key, value)
    }
}
