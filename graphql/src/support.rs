use graphql_parser::query as q;

use graph::prelude::*;

use crate::connection::{Connection, ConnectionAssembler, PageMeta};
use crate::cursor::CursorCodec;
use crate::pagination::{ArgumentNames, PaginationArgs, WindowResolver};
use crate::selection::{collect_fields, SelectionField, SelectionPlanResolver};

fn default_edges() -> String {
    "edges".to_string()
}

fn default_node() -> String {
    "node".to_string()
}

fn default_cursor() -> String {
    "cursor".to_string()
}

fn default_total_count() -> String {
    "totalCount".to_string()
}

/// The field and argument names of connection types.
///
/// ```toml
/// totalCount = "count"
///
/// [arguments]
/// offset = "skip"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionNames {
    #[serde(default = "default_edges")]
    pub edges: String,
    #[serde(default = "default_node")]
    pub node: String,
    #[serde(default = "default_cursor")]
    pub cursor: String,
    #[serde(default = "default_total_count")]
    pub total_count: String,
    #[serde(default)]
    pub arguments: ArgumentNames,
}

impl Default for ConnectionNames {
    fn default() -> Self {
        ConnectionNames {
            edges: default_edges(),
            node: default_node(),
            cursor: default_cursor(),
            total_count: default_total_count(),
            arguments: ArgumentNames::default(),
        }
    }
}

impl ConnectionNames {
    pub fn from_toml(source: &str) -> Result<Self, Error> {
        toml::from_str(source).context("invalid connection names")
    }

    /// The path from a connection to its nodes, `edges/node` by default.
    pub fn element_root(&self) -> String {
        format!("{}/{}", self.edges, self.node)
    }

    fn edge_cursor(&self) -> String {
        format!("{}/{}", self.edges, self.cursor)
    }
}

/// Everything the query layer needs to run the query for one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySetting {
    /// The type of the elements to query
    pub entity_type: String,
    pub window: KeysetWindow,
    /// The attributes to load eagerly
    pub fetches: FetchPlan,
    /// Set when the total count was not selected and need not be computed.
    pub disable_count_query: bool,
    /// Set when edge cursors were selected, so every row needs its key
    /// values and not just the first and the last one.
    pub extract_all_keysets: bool,
}

/// Pagination and fetch planning for the fields of one schema.
pub struct GraphQlSupport {
    logger: Logger,
    schema: Arc<SchemaDescriptor>,
    names: ConnectionNames,
    windows: WindowResolver,
    assembler: ConnectionAssembler,
    plans: SelectionPlanResolver,
    element_types: MemoCache<(FieldType, String), String>,
}

impl GraphQlSupport {
    pub fn new(logger: &Logger, schema: Arc<SchemaDescriptor>, names: ConnectionNames) -> Self {
        let logger = logger.new(o!("component" => "GraphQlSupport"));
        let codec = CursorCodec::for_schema(&logger, &schema);
        let windows = WindowResolver::new(
            &logger,
            codec.clone(),
            names.arguments.clone(),
            ENV_VARS.default_page_size(),
        );
        let assembler = ConnectionAssembler::new(&logger, codec);
        let cache_size = ENV_VARS.selection_cache_size();
        let plans = SelectionPlanResolver::new(&logger, schema.cheap_clone(), cache_size);

        GraphQlSupport {
            logger,
            schema,
            names,
            windows,
            assembler,
            plans,
            element_types: MemoCache::new(cache_size),
        }
    }

    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.schema
    }

    pub fn names(&self) -> &ConnectionNames {
        &self.names
    }

    /// The name of the type found by following `element_root`, a `/`
    /// separated list of field names, from `field_type`.
    pub fn element_type_name(
        &self,
        field_type: &FieldType,
        element_root: &str,
    ) -> Result<String, QueryExecutionError> {
        let key = (field_type.clone(), element_root.to_string());
        self.element_types.get_or_try_insert_with(&key, || {
            let mut type_name = field_type.named_type();
            for part in element_root.split('/').filter(|part| !part.is_empty()) {
                let type_descriptor = self.schema.get(type_name).ok_or_else(|| {
                    QueryExecutionError::UnmappableTypeError(type_name.to_string())
                })?;
                type_name = type_descriptor
                    .type_of(part)
                    .ok_or_else(|| {
                        QueryExecutionError::UnknownElementRoot(
                            type_name.to_string(),
                            part.to_string(),
                        )
                    })?
                    .named_type();
            }
            if !self.schema.has_type(type_name) {
                return Err(QueryExecutionError::UnmappableTypeError(
                    type_name.to_string(),
                ));
            }
            Ok(type_name.to_string())
        })
    }

    pub fn pagination_args(
        &self,
        arguments: &[(String, q::Value<'static, String>)],
    ) -> Result<PaginationArgs, QueryExecutionError> {
        PaginationArgs::from_arguments(arguments, &self.names.arguments)
    }

    /// The setting for a field that returns the elements below
    /// `element_root` of `field_type`.
    pub fn create_setting(
        &self,
        field_type: &FieldType,
        args: &PaginationArgs,
        fields: &[SelectionField],
        element_root: &str,
    ) -> Result<QuerySetting, QueryExecutionError> {
        let entity_type = self.element_type_name(field_type, element_root)?;
        let window = self.windows.resolve(args)?;
        let fetches = self.plans.resolve(fields, element_root)?;
        Ok(QuerySetting {
            entity_type,
            window,
            fetches,
            disable_count_query: false,
            extract_all_keysets: false,
        })
    }

    /// The setting for a connection field. `fields` are the selected fields
    /// below the connection.
    pub fn create_paginated_setting(
        &self,
        field_type: &FieldType,
        args: &PaginationArgs,
        fields: &[SelectionField],
    ) -> Result<QuerySetting, QueryExecutionError> {
        let mut setting =
            self.create_setting(field_type, args, fields, &self.names.element_root())?;

        let edge_cursor = self.names.edge_cursor();
        setting.disable_count_query = !fields
            .iter()
            .any(|field| field.path() == self.names.total_count);
        setting.extract_all_keysets = fields.iter().any(|field| field.path() == edge_cursor);

        debug!(
            self.logger,
            "Created query setting";
            "entity_type" => &setting.entity_type,
            "window" => %setting.window,
            "fetches" => setting.fetches.len(),
            "count" => !setting.disable_count_query
        );
        Ok(setting)
    }

    /// Like `create_paginated_setting`, reading arguments and selected
    /// fields straight from the connection field of a query.
    pub fn setting_for_field(
        &self,
        field_type: &FieldType,
        field: &q::Field<'static, String>,
        fragments: &[q::FragmentDefinition<'static, String>],
    ) -> Result<QuerySetting, QueryExecutionError> {
        let args = self.pagination_args(&field.arguments)?;
        let fields = collect_fields(
            &self.schema,
            field_type.named_type(),
            &field.selection_set,
            fragments,
        )?;
        self.create_paginated_setting(field_type, &args, &fields)
    }

    /// Build the connection for a page fetched with `window`.
    pub fn assemble<T>(
        &self,
        rows: Vec<Row<T>>,
        window: &KeysetWindow,
        total_count: Option<u64>,
    ) -> Connection<T> {
        let meta = PageMeta::from_window(window).total_count(total_count);
        self.assembler.assemble(rows, &meta)
    }

    pub fn assemble_page<T>(&self, rows: Vec<Row<T>>, meta: &PageMeta) -> Connection<T> {
        self.assembler.assemble(rows, meta)
    }

    pub fn decode_cursor(&self, token: &str) -> Result<Cursor, CursorError> {
        self.windows.codec().decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionNames;
    use crate::pagination::ArgumentNames;
    use pretty_assertions::assert_eq;

    #[test]
    fn loads_names_from_toml() {
        let names = ConnectionNames::from_toml(
            r#"
            totalCount = "count"

            [arguments]
            offset = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(
            ConnectionNames {
                total_count: "count".to_string(),
                arguments: ArgumentNames {
                    offset: "skip".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            names
        );
        assert_eq!("edges/node", names.element_root());

        assert_eq!(ConnectionNames::default(), ConnectionNames::from_toml("").unwrap());
        assert!(ConnectionNames::from_toml("edges = 1").is_err());
    }
}
