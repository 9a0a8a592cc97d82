use std::fmt::{Display, Error, Formatter};

/// Stable identifiers attached to log lines as the `code` key so that
/// rejected requests can be counted without parsing messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogCode {
    InvalidCursor,
    UnencodableKeyset,
    InvalidPaginationArguments,
    UnmappableSelection,
    FetchPlanResolved,
}

impl Display for LogCode {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let value = match self {
            LogCode::InvalidCursor => "InvalidCursor",
            LogCode::UnencodableKeyset => "UnencodableKeyset",
            LogCode::InvalidPaginationArguments => "InvalidPaginationArguments",
            LogCode::UnmappableSelection => "UnmappableSelection",
            LogCode::FetchPlanResolved => "FetchPlanResolved",
        };
        write!(f, "{}", value)
    }
}

impl slog::Value for LogCode {
    fn serialize(
        &self,
        _rec: &slog::Record,
        key: slog::Key,
        serializer: &mut dyn slog::Serializer,
    ) -> slog::Result {
        serializer.emit_str(key, format!("{}", self).as_str())
    }
}
