mod basic;
mod sectioned;
mod tables;

pub use basic::BasicMapIndex;
pub use sectioned::SectionedMapIndex;
pub use tables::MappingIter;

pub(crate) use tables::MappingTables;

use crate::document::Document;
use crate::mapping::{GeneratedLocation, MappingOrder, OriginalLocation};
use crate::{Error, Result};
use std::sync::Arc;

#[inline]
pub(crate) fn check_line(line: u32) -> Result<()> {
    if line == 0 {
        return Err(Error::InvalidArgument(
            "line must be greater than or equal to 1, got 0".to_string(),
        ));
    }
    Ok(())
}

/// A parsed source map, answering position queries in both directions.
///
/// Parsing dispatches on the presence of `sections`: a single-file map becomes
/// [MapIndex::Basic], an index map becomes [MapIndex::Sectioned]. Both variants answer the same
/// queries.
///
/// # Example
/// ```
/// # use smap::MapIndex;
/// let index = MapIndex::from_str(
///     r#"{"version":3,"sources":["a.js"],"names":["foo"],"mappings":"AAAA,EAAEA"}"#,
/// ).unwrap();
///
/// let loc = index.original_position_for(1, 3).unwrap().unwrap();
/// assert_eq!(&*loc.source, "a.js");
/// assert_eq!((loc.line, loc.column), (1, 2));
/// assert_eq!(loc.name.as_deref(), Some("foo"));
///
/// let loc = index.generated_position_for("a.js", 1, 0).unwrap().unwrap();
/// assert_eq!((loc.line, loc.column), (1, 0));
/// ```
#[derive(Debug, Clone)]
pub enum MapIndex {
    Basic(BasicMapIndex),
    Sectioned(SectionedMapIndex),
}

macro_rules! dispatch {
    ($self:ident, $index:ident => $body:expr) => {
        match $self {
            MapIndex::Basic($index) => $body,
            MapIndex::Sectioned($index) => $body,
        }
    };
}

impl MapIndex {
    /// Parses a JSON document. A leading `)]}'` guard is skipped.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        Self::from_document(Document::parse(json)?)
    }

    /// Same as [Self::from_str]. The slice is used as scratch space by the JSON parser.
    #[inline]
    pub fn from_slice(json: &mut [u8]) -> Result<Self> {
        Self::from_document(Document::parse_slice(json)?)
    }

    pub fn from_document(doc: Document) -> Result<Self> {
        if doc.is_indexed() {
            SectionedMapIndex::from_document(doc).map(Self::Sectioned)
        } else {
            BasicMapIndex::from_document(doc).map(Self::Basic)
        }
    }

    /// Creates a single-file index over the current state of `builder`.
    #[cfg(feature = "builder")]
    pub fn from_builder(builder: &mut crate::MapBuilder) -> Self {
        Self::Basic(BasicMapIndex::from_builder(builder))
    }

    pub(crate) fn tables(&self) -> Result<&MappingTables> {
        dispatch!(self, index => index.tables())
    }

    pub(crate) fn has_source(&self, source: &str) -> bool {
        self.sources().iter().any(|s| &**s == source)
    }
}

impl MapIndex {
    /// Finds the original position of a generated position.
    ///
    /// The nearest mapping at or before (`line`, `column`) is used, as long as it lies on the
    /// same generated line and carries a source. `line` is 1-based, `column` 0-based.
    pub fn original_position_for(&self, line: u32, column: u32) -> Result<Option<OriginalLocation>> {
        dispatch!(self, index => index.original_position_for(line, column))
    }

    /// Finds the generated position of an original position.
    ///
    /// `source` may be given with or without `sourceRoot` applied. The nearest mapping at or
    /// before (`source`, `line`, `column`) in original order is used.
    pub fn generated_position_for(
        &self,
        source: &str,
        line: u32,
        column: u32,
    ) -> Result<Option<GeneratedLocation>> {
        dispatch!(self, index => index.generated_position_for(source, line, column))
    }

    /// Finds every generated position mapped from `line` of `source`, in original column order.
    pub fn all_generated_positions_for(
        &self,
        source: &str,
        line: u32,
    ) -> Result<Vec<GeneratedLocation>> {
        dispatch!(self, index => index.all_generated_positions_for(source, line))
    }

    /// Iterates over all mappings in the given order, with sources resolved against `sourceRoot`.
    pub fn each_mapping(&self, order: MappingOrder) -> Result<MappingIter<'_>> {
        dispatch!(self, index => index.each_mapping(order))
    }

    /// Fills in [GeneratedLocation::last_column] for later queries.
    pub fn compute_column_spans(&mut self) -> Result<()> {
        dispatch!(self, index => index.compute_column_spans())
    }

    /// Returns the embedded content of `source`, see
    /// [BasicMapIndex::source_content_for].
    pub fn source_content_for(&self, source: &str, null_on_missing: bool) -> Result<Option<&str>> {
        dispatch!(self, index => index.source_content_for(source, null_on_missing))
    }
}

impl MapIndex {
    #[inline]
    pub fn file(&self) -> Option<&str> {
        dispatch!(self, index => index.file())
    }

    /// The `sourceRoot` of a single-file map. Index maps have none.
    #[inline]
    pub fn source_root(&self) -> Option<&str> {
        match self {
            Self::Basic(index) => index.source_root(),
            Self::Sectioned(_) => None,
        }
    }

    #[inline]
    pub fn sources(&self) -> &[Arc<str>] {
        dispatch!(self, index => index.sources())
    }

    #[inline]
    pub fn names(&self) -> &[Arc<str>] {
        dispatch!(self, index => index.names())
    }
}
