mod accessor;
mod as_value;
mod attribute;
mod cast;
mod connection;
pub mod convert;
mod driver;
mod entity;
mod error;
mod executor;
pub mod mapping;
mod model;
mod record;
mod schema;
mod table_ref;
mod util;
mod value;

pub use ::anyhow::Context;
pub use accessor::*;
pub use as_value::*;
pub use attribute::*;
pub use cast::*;
pub use connection::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use model::*;
pub use record::*;
pub use schema::*;
pub use table_ref::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
