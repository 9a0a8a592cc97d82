use graph::prelude::*;

use super::{ArgumentNames, PaginationArgs};
use crate::cursor::CursorCodec;

/// The largest count accepted for `first`, `last` and `offset`. `u32::MAX`
/// itself marks an unbounded page inside cursors.
const MAX_COUNT: i64 = u32::MAX as i64 - 1;

/// Resolves Relay pagination arguments into a `KeysetWindow`.
#[derive(Clone, Debug)]
pub struct WindowResolver {
    logger: Logger,
    codec: CursorCodec,
    names: ArgumentNames,
    default_page_size: Option<u32>,
}

impl WindowResolver {
    pub fn new(
        logger: &Logger,
        codec: CursorCodec,
        names: ArgumentNames,
        default_page_size: Option<u32>,
    ) -> Self {
        WindowResolver {
            logger: logger.new(o!("component" => "WindowResolver")),
            codec,
            names,
            default_page_size,
        }
    }

    pub fn codec(&self) -> &CursorCodec {
        &self.codec
    }

    pub fn names(&self) -> &ArgumentNames {
        &self.names
    }

    pub fn resolve(&self, args: &PaginationArgs) -> Result<KeysetWindow, QueryExecutionError> {
        let window = self.resolve_window(args);
        match &window {
            Ok(window) => trace!(self.logger, "Resolved window"; "window" => %window),
            Err(e) => debug!(
                self.logger,
                "Invalid pagination arguments";
                "code" => LogCode::InvalidPaginationArguments,
                "error" => %e
            ),
        }
        window
    }

    fn resolve_window(&self, args: &PaginationArgs) -> Result<KeysetWindow, QueryExecutionError> {
        let first = count(&self.names.first, args.first)?;
        let last = count(&self.names.last, args.last)?;
        let offset = count(&self.names.offset, args.offset)?;

        if args.before.is_some() && args.after.is_some() {
            return Err(QueryExecutionError::invalid_argument(
                &self.names.before,
                "before and after are exclusive",
            ));
        }

        if first.is_none() && last.is_none() && !args.has_cursor() {
            return Ok(KeysetWindow::offset(
                offset.unwrap_or(0),
                self.default_page_size,
            ));
        }

        let before = self.decode(args.before.as_deref())?;
        let after = self.decode(args.after.as_deref())?;

        let page_size = match (first, last) {
            (_, Some(last)) => Some(last),
            (Some(first), None) => Some(first),
            (None, None) => before
                .as_ref()
                .or(after.as_ref())
                .and_then(Cursor::bounded_page_size),
        };

        // Where the page starts, counted from the start of the result. This
        // is only bookkeeping for the cursors of the page when the query
        // seeks by keyset.
        let start = match (offset, &before, &after) {
            (Some(offset), _, _) => offset,
            (None, Some(before), _) => before.offset.saturating_sub(page_size.unwrap_or(0)),
            (None, None, Some(after)) => after.offset.saturating_add(after.page_size),
            (None, None, None) => 0,
        };

        // A cursor given together with `last` is decoded so that tampered
        // cursors are rejected, but its key values are not used: the page is
        // read backwards from the end of the result instead. Without a cursor
        // the bound is the empty boundary keyset, read from the start for
        // `first` and from the end for `last`.
        let (lowest, highest) = match (before, after, first, last) {
            (Some(before), _, _, _) => (Some(before), None),
            (None, Some(_), _, Some(last)) => (Some(Cursor::boundary(0, last)), None),
            (None, Some(after), _, None) => (None, Some(after)),
            (None, None, None, Some(last)) => (Some(Cursor::boundary(0, last)), None),
            (None, None, Some(first), None) => (Some(Cursor::boundary(0, first)), None),
            (None, None, _, _) => (None, None),
        };
        let from_end = last.is_some();

        let (offset, use_keyset) = match (first, last) {
            (Some(first), Some(last)) => {
                let offset = (offset.unwrap_or(0) as i64 + first as i64 - last as i64)
                    .clamp(0, u32::MAX as i64) as u32;
                (offset, lowest.is_some() || highest.is_some())
            }
            _ => (start, offset.is_none()),
        };

        Ok(
            KeysetWindow::new(offset, page_size, lowest, highest, use_keyset)
                .with_scan_from_end(from_end),
        )
    }

    fn decode(&self, token: Option<&str>) -> Result<Option<Cursor>, QueryExecutionError> {
        match token {
            Some(token) => Ok(Some(self.codec.decode(token)?)),
            None => Ok(None),
        }
    }
}

fn count(name: &str, value: Option<i64>) -> Result<Option<u32>, QueryExecutionError> {
    match value {
        None => Ok(None),
        Some(n) if n < 0 => Err(QueryExecutionError::invalid_argument(
            name,
            format!("must not be negative, got {}", n),
        )),
        Some(n) if n > MAX_COUNT => Err(QueryExecutionError::invalid_argument(
            name,
            format!("must be at most {}, got {}", MAX_COUNT, n),
        )),
        Some(n) => Ok(Some(n as u32)),
    }
}
