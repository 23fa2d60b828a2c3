//! Internal utility helpers.

pub(crate) mod query;
