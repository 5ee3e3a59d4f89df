//! Attribute-driven persistence models.
//!
//! Entities declare their attributes once in a [`Schema`]; a [`Model`] casts,
//! maps and serializes the values and cascades persistence through any
//! [`Executor`].
pub use strata_core::*;
