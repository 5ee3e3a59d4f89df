use crate::{Connection, Result};
use std::{borrow::Cow, future::Future};

pub trait Driver {
    type Connection: Connection;
    /// URL scheme accepted by the connections of this driver.
    const NAME: &'static str;

    fn connect(
        &self,
        url: Cow<'static, str>,
    ) -> impl Future<Output = Result<Self::Connection>> + Send {
        Self::Connection::connect(url)
    }
}
