mod error;

pub use self::error::{CursorError, QueryExecutionError};
