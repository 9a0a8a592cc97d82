/// Implementation of `CheapClone` for cheaply shared types.
pub mod cheap_clone;

/// Traits and types shared with the query layer.
pub mod components;

/// Common data types used throughout viewgraph.
pub mod data;

/// Environment variables that tune pagination and fetch planning.
pub mod env;

/// Logging setup and log codes.
pub mod log;

/// The explicitly registered schema descriptor.
pub mod schema;

/// Utilities.
pub mod util;

pub use anyhow;
pub use slog;

/// A prelude that makes all shared traits and data types available.
///
/// Add the following code to import all traits and data types listed below at once.
///
/// ```
/// use viewgraph::prelude::*;
/// ```
pub mod prelude {
    pub use ::anyhow;
    pub use anyhow::{anyhow, Context as _, Error};
    pub use chrono;
    pub use envconfig;
    pub use hex;
    pub use num_bigint;
    pub use lazy_static::lazy_static;
    pub use serde;
    pub use serde_derive::{Deserialize, Serialize};
    pub use slog::{self, crit, debug, error, info, o, trace, warn, Logger};
    pub use std::fmt::Debug;
    pub use std::iter::FromIterator;
    pub use std::sync::Arc;
    pub use thiserror;

    pub use crate::cheap_clone::CheapClone;
    pub use crate::components::store::{Cursor, FetchPlan, KeysetWindow, Row};
    pub use crate::data::query::{CursorError, QueryExecutionError};
    pub use crate::data::store::{Attribute, Keyset, Value, ValueType};
    pub use crate::env::ENV_VARS;
    pub use crate::log::LogCode;
    pub use crate::schema::{
        FieldType, SchemaDescriptor, SchemaDescriptorBuilder, SchemaValidationError,
        TypeDescriptor, META_FIELD_PREFIX, TYPENAME_FIELD,
    };
    pub use crate::util::cache::MemoCache;
}
