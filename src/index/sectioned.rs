use super::basic::check_version;
use super::tables::{MappingIter, MappingTables};
use super::{check_line, MapIndex};
use crate::document::Document;
use crate::mapping::{GeneratedLocation, MappingOrder, OriginalLocation, Position};
use crate::search::nearest_at_or_before;
use crate::{Error, Result};
use once_cell::unsync::OnceCell;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct IndexSection {
    // 1-based line, 0-based column
    generated_offset: Position,
    index: MapIndex,
}

impl IndexSection {
    /// Translates a parent position into the section's own coordinates. The column offset only
    /// applies on the section's first line.
    fn to_local(&self, pos: Position) -> Position {
        let offset = self.generated_offset;
        let line = pos.line - (offset.line - 1);
        let column = if pos.line == offset.line {
            pos.column.saturating_sub(offset.column)
        } else {
            pos.column
        };
        Position::new(line, column)
    }

    fn to_parent(&self, loc: GeneratedLocation) -> GeneratedLocation {
        let offset = self.generated_offset;
        let shift = |column: u32| {
            if loc.line == 1 && column != u32::MAX {
                column.saturating_add(offset.column)
            } else {
                column
            }
        };
        GeneratedLocation {
            line: loc.line.saturating_add(offset.line - 1),
            column: shift(loc.column),
            last_column: loc.last_column.map(shift),
        }
    }
}

/// An index over an index map: a list of sections, each an embedded source map placed at an
/// offset of the generated file.
///
/// Queries by generated position are routed to the section containing the position. Queries by
/// original position visit every section listing the source, in order.
#[derive(Debug, Clone)]
pub struct SectionedMapIndex {
    file: Option<String>,
    sections: Vec<IndexSection>,
    sources: Vec<Arc<str>>,
    names: Vec<Arc<str>>,
    tables: OnceCell<MappingTables>,
}

impl SectionedMapIndex {
    pub fn from_document(doc: Document) -> Result<Self> {
        check_version(doc.version)?;

        let mut sections = Vec::new();
        let mut last_offset = Position::new(0, 0);
        for (idx, section) in doc.sections.unwrap_or_default().into_iter().enumerate() {
            let idx = idx as u32;
            if section.url.is_some() {
                return Err(Error::UnsupportedSectionUrl(idx));
            }

            let offset = section
                .offset
                .ok_or(Error::MissingRequiredField("offset"))?;
            let offset = Position::new(
                offset.line.ok_or(Error::MissingRequiredField("line"))?,
                offset.column.ok_or(Error::MissingRequiredField("column"))?,
            );
            if offset < last_offset {
                return Err(Error::UnorderedSections(idx));
            }
            last_offset = offset;

            let map = section.map.ok_or(Error::MissingRequiredField("map"))?;
            sections.push(IndexSection {
                generated_offset: Position::new(offset.line.saturating_add(1), offset.column),
                index: MapIndex::from_document(*map)?,
            });
        }

        let sources = sections
            .iter()
            .flat_map(|section| section.index.sources().iter().cloned())
            .collect();
        let names = sections
            .iter()
            .flat_map(|section| section.index.names().iter().cloned())
            .collect();

        Ok(Self {
            file: doc.file,
            sections,
            sources,
            names,
            tables: OnceCell::new(),
        })
    }

    pub(crate) fn tables(&self) -> Result<&MappingTables> {
        self.tables.get_or_try_init(|| {
            let parts = self
                .sections
                .iter()
                .map(|section| Ok((section.index.tables()?, section.generated_offset)))
                .collect::<Result<Vec<_>>>()?;
            Ok(MappingTables::compose(parts))
        })
    }
}

impl SectionedMapIndex {
    /// See [MapIndex::original_position_for](crate::MapIndex::original_position_for).
    pub fn original_position_for(&self, line: u32, column: u32) -> Result<Option<OriginalLocation>> {
        check_line(line)?;
        let needle = Position::new(line, column);
        let Some(idx) =
            nearest_at_or_before(&self.sections, |section| needle.cmp(&section.generated_offset))
        else {
            return Ok(None);
        };

        let section = &self.sections[idx];
        let local = section.to_local(needle);
        section.index.original_position_for(local.line, local.column)
    }

    /// See [MapIndex::generated_position_for](crate::MapIndex::generated_position_for).
    ///
    /// Sections that list `source` but hold no mapping for it are skipped.
    pub fn generated_position_for(
        &self,
        source: &str,
        line: u32,
        column: u32,
    ) -> Result<Option<GeneratedLocation>> {
        check_line(line)?;
        for section in &self.sections {
            if !section.index.has_source(source) {
                continue;
            }
            if let Some(loc) = section.index.generated_position_for(source, line, column)? {
                return Ok(Some(section.to_parent(loc)));
            }
        }
        Ok(None)
    }

    /// See [MapIndex::all_generated_positions_for](crate::MapIndex::all_generated_positions_for).
    pub fn all_generated_positions_for(
        &self,
        source: &str,
        line: u32,
    ) -> Result<Vec<GeneratedLocation>> {
        check_line(line)?;
        Ok(self.tables()?.all_generated_for(source, line))
    }

    pub fn each_mapping(&self, order: MappingOrder) -> Result<MappingIter<'_>> {
        Ok(self.tables()?.iter(order))
    }

    /// Computes column spans of the composed mappings and of every section.
    pub fn compute_column_spans(&mut self) -> Result<()> {
        for section in &mut self.sections {
            section.index.compute_column_spans()?;
        }
        self.tables()?;
        if let Some(tables) = self.tables.get_mut() {
            tables.compute_column_spans();
        }
        Ok(())
    }

    /// Returns the content of `source` from the first section that has it.
    pub fn source_content_for(&self, source: &str, null_on_missing: bool) -> Result<Option<&str>> {
        for section in &self.sections {
            if let Some(content) = section.index.source_content_for(source, true)? {
                return Ok(Some(content));
            }
        }

        if null_on_missing {
            Ok(None)
        } else {
            Err(Error::SourceNotFound(source.to_owned()))
        }
    }
}

impl SectionedMapIndex {
    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Sources of every section, concatenated in section order.
    #[inline]
    pub fn sources(&self) -> &[Arc<str>] {
        &self.sources
    }

    #[inline]
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    #[inline]
    pub fn sections_len(&self) -> usize {
        self.sections.len()
    }
}
