/// Data types for dealing with query errors.
pub mod query;

/// Data types for dealing with stored values and key tuples.
pub mod store;
