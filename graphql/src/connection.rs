use graph::prelude::*;

use crate::cursor::CursorCodec;
use graph::components::store::UNBOUNDED_PAGE_SIZE;

#[derive(Clone, Debug, PartialEq)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// A Relay connection built from one page of rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    pub total_count: Option<u64>,
}

impl<T> Connection<T> {
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }
}

/// Where a page sits in the overall result. The `has_previous` and
/// `has_next` hints come from the query layer and override what can be
/// derived from the offset and the total count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub offset: u32,
    pub page_size: Option<u32>,
    pub total_count: Option<u64>,
    pub has_previous: Option<bool>,
    pub has_next: Option<bool>,
}

impl PageMeta {
    pub fn new(offset: u32, page_size: Option<u32>) -> Self {
        PageMeta {
            offset,
            page_size,
            ..Default::default()
        }
    }

    pub fn from_window(window: &KeysetWindow) -> Self {
        Self::new(window.first_result(), window.page_size())
    }

    pub fn total_count(mut self, total_count: Option<u64>) -> Self {
        self.total_count = total_count;
        self
    }

    pub fn has_previous(mut self, has_previous: bool) -> Self {
        self.has_previous = Some(has_previous);
        self
    }

    pub fn has_next(mut self, has_next: bool) -> Self {
        self.has_next = Some(has_next);
        self
    }

    fn has_previous_page(&self) -> bool {
        self.has_previous.unwrap_or(self.offset != 0)
    }

    fn has_next_page(&self) -> bool {
        if let Some(has_next) = self.has_next {
            return has_next;
        }
        match (self.total_count, self.page_size) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(total), Some(page_size)) => (self.offset as u64 + page_size as u64) < total,
        }
    }
}

/// How many rows of a page carry their key values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeysetCoverage {
    /// Every row
    Full,
    /// The first and the last row, none of the rows between them
    Boundary,
    /// Some other mix
    Partial,
    /// No row, or the page is empty
    None,
}

impl KeysetCoverage {
    pub fn of<T>(rows: &[Row<T>]) -> Self {
        let keyed = rows.iter().filter(|row| row.keyset.is_some()).count();
        let first = rows.first().map_or(false, |row| row.keyset.is_some());
        let last = rows.last().map_or(false, |row| row.keyset.is_some());
        if keyed == 0 {
            KeysetCoverage::None
        } else if keyed == rows.len() {
            KeysetCoverage::Full
        } else if first && last && keyed == 2 {
            KeysetCoverage::Boundary
        } else {
            KeysetCoverage::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeysetCoverage::Full => "full",
            KeysetCoverage::Boundary => "boundary",
            KeysetCoverage::Partial => "partial",
            KeysetCoverage::None => "none",
        }
    }
}

/// Turns a fetched page into edges and page info.
///
/// Rows that carry key values get a cursor that can be used to seek from
/// that row. All other rows get a positional cursor, their 1-based index
/// in the page, which satisfies the edge cursor contract but is not
/// accepted as `before` or `after`. When only the first and the last row
/// carry key values, the start and end cursors are still re-enterable.
#[derive(Clone, Debug)]
pub struct ConnectionAssembler {
    logger: Logger,
    codec: CursorCodec,
}

impl ConnectionAssembler {
    pub fn new(logger: &Logger, codec: CursorCodec) -> Self {
        ConnectionAssembler {
            logger: logger.new(o!("component" => "ConnectionAssembler")),
            codec,
        }
    }

    pub fn assemble<T>(&self, rows: Vec<Row<T>>, meta: &PageMeta) -> Connection<T> {
        let coverage = KeysetCoverage::of(&rows);
        trace!(
            self.logger,
            "Assembling connection";
            "rows" => rows.len(),
            "keysets" => coverage.as_str(),
            "offset" => meta.offset
        );

        let page_size = meta.page_size.unwrap_or(UNBOUNDED_PAGE_SIZE);
        let edges: Vec<_> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let cursor = row
                    .keyset
                    .and_then(|keyset| self.encode(meta.offset, page_size, keyset))
                    .unwrap_or_else(|| (i + 1).to_string());
                Edge {
                    node: row.node,
                    cursor,
                }
            })
            .collect();

        let page_info = PageInfo {
            has_previous_page: meta.has_previous_page(),
            has_next_page: meta.has_next_page(),
            start_cursor: edges.first().map(|edge| edge.cursor.clone()),
            end_cursor: edges.last().map(|edge| edge.cursor.clone()),
        };

        Connection {
            edges,
            page_info,
            total_count: meta.total_count,
        }
    }

    /// The cursor for a row with key values, or `None` if the keyset can't
    /// be put into a cursor; the row then gets a positional cursor.
    fn encode(&self, offset: u32, page_size: u32, keyset: Keyset) -> Option<String> {
        match self.codec.encode(&Cursor::new(offset, page_size, keyset)) {
            Ok(cursor) => Some(cursor),
            Err(e) => {
                warn!(
                    self.logger,
                    "Falling back to a positional cursor";
                    "code" => LogCode::UnencodableKeyset,
                    "error" => %e
                );
                None
            }
        }
    }
}
