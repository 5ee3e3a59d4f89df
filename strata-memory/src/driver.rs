use crate::MemoryConnection;
use strata_core::Driver;

pub struct MemoryDriver {}

impl MemoryDriver {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Driver for MemoryDriver {
    type Connection = MemoryConnection;

    const NAME: &'static str = "memory";
}
