use graphql_parser::query as q;

use graph::prelude::*;

fn default_first() -> String {
    "first".to_string()
}

fn default_last() -> String {
    "last".to_string()
}

fn default_offset() -> String {
    "offset".to_string()
}

fn default_before() -> String {
    "before".to_string()
}

fn default_after() -> String {
    "after".to_string()
}

/// The names under which the pagination arguments appear on a connection
/// field. Every name can be overridden individually.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentNames {
    #[serde(default = "default_first")]
    pub first: String,
    #[serde(default = "default_last")]
    pub last: String,
    #[serde(default = "default_offset")]
    pub offset: String,
    #[serde(default = "default_before")]
    pub before: String,
    #[serde(default = "default_after")]
    pub after: String,
}

impl Default for ArgumentNames {
    fn default() -> Self {
        ArgumentNames {
            first: default_first(),
            last: default_last(),
            offset: default_offset(),
            before: default_before(),
            after: default_after(),
        }
    }
}

/// The raw pagination arguments of one connection field. Counts are kept
/// signed so that negative values can be reported as such.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationArgs {
    pub first: Option<i64>,
    pub last: Option<i64>,
    pub offset: Option<i64>,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl PaginationArgs {
    pub fn first(mut self, n: i64) -> Self {
        self.first = Some(n);
        self
    }

    pub fn last(mut self, n: i64) -> Self {
        self.last = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Pick the pagination arguments out of the arguments of a field.
    /// Variables must already have been substituted. Arguments with other
    /// names are ignored and `null` counts as absent.
    pub fn from_arguments(
        arguments: &[(String, q::Value<'static, String>)],
        names: &ArgumentNames,
    ) -> Result<Self, QueryExecutionError> {
        let value = |name: &str| {
            arguments
                .iter()
                .find(|(arg, _)| arg == name)
                .map(|(_, value)| value)
        };

        Ok(PaginationArgs {
            first: int_argument(&names.first, value(&names.first))?,
            last: int_argument(&names.last, value(&names.last))?,
            offset: int_argument(&names.offset, value(&names.offset))?,
            before: string_argument(&names.before, value(&names.before))?,
            after: string_argument(&names.after, value(&names.after))?,
        })
    }

    pub fn has_cursor(&self) -> bool {
        self.before.is_some() || self.after.is_some()
    }
}

fn int_argument(
    name: &str,
    value: Option<&q::Value<'static, String>>,
) -> Result<Option<i64>, QueryExecutionError> {
    match value {
        None | Some(q::Value::Null) => Ok(None),
        Some(q::Value::Int(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| QueryExecutionError::invalid_argument(name, "integer out of range")),
        Some(q::Value::Variable(var)) => Err(QueryExecutionError::invalid_argument(
            name,
            format!("variable `{}` was not substituted", var),
        )),
        Some(_) => Err(QueryExecutionError::invalid_argument(
            name,
            "expected an Int",
        )),
    }
}

fn string_argument(
    name: &str,
    value: Option<&q::Value<'static, String>>,
) -> Result<Option<String>, QueryExecutionError> {
    match value {
        None | Some(q::Value::Null) => Ok(None),
        Some(q::Value::String(s)) => Ok(Some(s.clone())),
        Some(q::Value::Variable(var)) => Err(QueryExecutionError::invalid_argument(
            name,
            format!("variable `{}` was not substituted", var),
        )),
        Some(_) => Err(QueryExecutionError::invalid_argument(
            name,
            "expected a String",
        )),
    }
}
