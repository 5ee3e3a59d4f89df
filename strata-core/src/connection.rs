use crate::{Executor, Result};
use std::{borrow::Cow, future::Future};

pub trait Connection: Executor {
    /// Establish a connection described by `url`, whose scheme is the driver name.
    fn connect(url: Cow<'static, str>) -> impl Future<Output = Result<Self>> + Send
    where
        Self: Sized;
}
