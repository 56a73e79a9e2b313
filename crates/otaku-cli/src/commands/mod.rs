//! Command handlers grouped by concern.

pub(crate) mod detail;
pub(crate) mod open;
pub(crate) mod search;
