pub extern crate graphql_parser;

/// Opaque cursor tokens.
pub mod cursor;

/// Relay pagination arguments and the fetch window they resolve to.
pub mod pagination;

/// Edges and page info for a fetched page.
pub mod connection;

/// Fetch plans from selection sets.
pub mod selection;

/// Ties pagination and fetch planning together for one schema.
pub mod support;

/// Prelude that exports the most important traits and types.
pub mod prelude {
    pub use super::connection::{
        Connection, ConnectionAssembler, Edge, KeysetCoverage, PageInfo, PageMeta,
    };
    pub use super::cursor::{CursorCodec, MAX_KEY_VALUES};
    pub use super::pagination::{ArgumentNames, PaginationArgs, WindowResolver};
    pub use super::selection::{collect_fields, SelectionField, SelectionPlanResolver};
    pub use super::support::{ConnectionNames, GraphQlSupport, QuerySetting};
}
