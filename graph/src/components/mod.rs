//! The components of viewgraph are plain, synchronous building blocks that
//! sit between the GraphQL execution layer and the query layer of the ORM.
//!
//! The query layer itself is not part of viewgraph. The types in this module
//! describe what is handed to it (a `KeysetWindow` and a `FetchPlan`) and
//! what comes back from it (`Row`s tagged with their sort keys).

/// Types exchanged with the query layer.
pub mod store;
