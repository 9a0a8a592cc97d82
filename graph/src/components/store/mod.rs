use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;

use crate::data::store::Keyset;

/// The page size recorded in a cursor for a page without a size limit.
pub const UNBOUNDED_PAGE_SIZE: u32 = u32::MAX;

/// A pointer to the sort position of a row, together with the offset and
/// page size of the page the row was on. Cursors are only ever exchanged
/// with clients in their serialized form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub offset: u32,
    pub page_size: u32,
    pub keyset: Keyset,
}

impl Cursor {
    pub fn new(offset: u32, page_size: u32, keyset: Keyset) -> Self {
        Cursor {
            offset,
            page_size,
            keyset,
        }
    }

    /// A cursor that does not point at a row but at one end of the result,
    /// see `Keyset::empty`.
    pub fn boundary(offset: u32, page_size: u32) -> Self {
        Cursor::new(offset, page_size, Keyset::empty())
    }

    pub fn is_boundary(&self) -> bool {
        self.keyset.is_empty()
    }

    /// The page size, or `None` if the page had no size limit.
    pub fn bounded_page_size(&self) -> Option<u32> {
        if self.page_size == UNBOUNDED_PAGE_SIZE {
            None
        } else {
            Some(self.page_size)
        }
    }
}

/// The pagination request handed to the query layer.
///
/// When `use_keyset` is set, the query should seek with the `lowest` and
/// `highest` key tuples instead of skipping `offset` rows; rows are
/// strictly before `lowest` and strictly after `highest`. The numeric
/// `offset` and `page_size` are kept either way since they are needed to
/// re-encode cursors for the returned page.
///
/// A bound with an empty keyset does not point at a row but at one end of
/// the result. Which end is given by `scans_from_end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeysetWindow {
    offset: u32,
    page_size: Option<u32>,
    lowest: Option<Cursor>,
    highest: Option<Cursor>,
    use_keyset: bool,
    from_end: bool,
}

impl KeysetWindow {
    /// Create a window. A request to use the keyset is dropped if there
    /// is neither a lower nor an upper bound to seek with.
    pub fn new(
        offset: u32,
        page_size: Option<u32>,
        lowest: Option<Cursor>,
        highest: Option<Cursor>,
        use_keyset: bool,
    ) -> Self {
        let use_keyset = use_keyset && (lowest.is_some() || highest.is_some());
        KeysetWindow {
            offset,
            page_size,
            lowest,
            highest,
            use_keyset,
            from_end: false,
        }
    }

    /// Mark the window as reading the last rows of the result. Only has an
    /// effect when `lowest` is a boundary.
    pub fn with_scan_from_end(mut self, from_end: bool) -> Self {
        self.from_end = from_end;
        self
    }

    /// A window that pages by offset only.
    pub fn offset(offset: u32, page_size: Option<u32>) -> Self {
        KeysetWindow::new(offset, page_size, None, None, false)
    }

    pub fn first_result(&self) -> u32 {
        self.offset
    }

    /// The maximum number of rows to fetch, `None` for no limit.
    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn lowest(&self) -> Option<&Cursor> {
        self.lowest.as_ref()
    }

    pub fn highest(&self) -> Option<&Cursor> {
        self.highest.as_ref()
    }

    pub fn use_keyset(&self) -> bool {
        self.use_keyset
    }

    /// `true` when the page has to be read backwards from the end of the
    /// result. With a boundary `lowest` that is not scanned from the end,
    /// the page is read forward from the start.
    pub fn scans_from_end(&self) -> bool {
        self.from_end && self.lowest.as_ref().map_or(false, Cursor::is_boundary)
    }

    /// `true` when the page is read forward from the start of the result.
    pub fn scans_from_start(&self) -> bool {
        !self.from_end && self.lowest.as_ref().map_or(false, Cursor::is_boundary)
    }
}

impl fmt::Display for KeysetWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "offset {}", self.offset)?;
        match self.page_size {
            Some(n) => write!(f, ", first {}", n)?,
            None => write!(f, ", unbounded")?,
        }
        if let Some(lowest) = &self.lowest {
            write!(f, ", before {}", lowest.keyset)?;
        }
        if let Some(highest) = &self.highest {
            write!(f, ", after {}", highest.keyset)?;
        }
        if self.scans_from_end() {
            write!(f, ", from end")?;
        }
        if self.use_keyset {
            write!(f, ", keyset")?;
        }
        Ok(())
    }
}

/// One element of a fetched page. The query layer attaches the row's sort
/// key values when it extracted them; they are only used to build cursors.
#[derive(Clone, Debug, PartialEq)]
pub struct Row<T> {
    pub node: T,
    pub keyset: Option<Keyset>,
}

impl<T> Row<T> {
    pub fn new(node: T) -> Self {
        Row { node, keyset: None }
    }

    pub fn with_keyset(node: T, keyset: Keyset) -> Self {
        Row {
            node,
            keyset: Some(keyset),
        }
    }
}

/// The dotted attribute paths that need to be loaded to answer a
/// selection set. Paths are kept sorted and unique.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FetchPlan(BTreeSet<String>);

impl FetchPlan {
    pub fn new() -> Self {
        FetchPlan(BTreeSet::new())
    }

    /// Add `path`; returns `false` if it was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.0.insert(path.into())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn extend(&mut self, other: FetchPlan) {
        self.0.extend(other.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }
}

impl FromIterator<String> for FetchPlan {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        FetchPlan(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for FetchPlan {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        FetchPlan(iter.into_iter().map(str::to_owned).collect())
    }
}

impl IntoIterator for FetchPlan {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FetchPlan {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FetchPlan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}
