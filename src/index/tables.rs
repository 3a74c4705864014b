use crate::compare::{compare_by_generated, compare_by_original, MappingView};
use crate::mapping::{
    GeneratedLocation, Mapping, MappingOrder, OriginalLocation, Position, RawMapping,
};
use crate::search::nearest_at_or_before;
use crate::splitter::{Piece, Pieces};
use crate::vlq::VlqDecoder;
use crate::{Error, Result};
use std::sync::Arc;

/// The two sorted views over the decoded mappings of an index.
///
/// `source_keys` are the strings mappings are ordered and searched by, `sources` the strings
/// reported to callers. They differ only when a `sourceRoot` is applied.
#[derive(Debug, Clone)]
pub(crate) struct MappingTables {
    source_keys: Vec<Arc<str>>,
    sources: Vec<Arc<str>>,
    names: Vec<Arc<str>>,
    generated: Vec<RawMapping>,
    // indices into `generated` of mappings with a source
    by_original: Vec<u32>,
}

#[inline]
fn view<'a>(
    source_keys: &'a [Arc<str>],
    names: &'a [Arc<str>],
    mapping: &RawMapping,
) -> MappingView<'a> {
    let source_info = mapping.source_info();
    MappingView {
        generated: mapping.generated(),
        original: source_info.map(|info| info.position),
        source: source_info.and_then(|info| source_keys.get(info.id as usize).map(|s| &**s)),
        name: mapping
            .name_info()
            .and_then(|id| names.get(id as usize).map(|s| &**s)),
    }
}

#[inline]
fn position(value: i64, segment: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::MappingMalformed(segment.to_owned()))
}

impl MappingTables {
    /// Sorts `generated` and derives the original-position order from it.
    pub fn new(
        source_keys: Vec<Arc<str>>,
        sources: Vec<Arc<str>>,
        names: Vec<Arc<str>>,
        mut generated: Vec<RawMapping>,
    ) -> Self {
        generated.sort_by(|a, b| {
            compare_by_generated(
                &view(&source_keys, &names, a),
                &view(&source_keys, &names, b),
                false,
            )
        });

        let mut by_original = generated
            .iter()
            .enumerate()
            .filter(|(_, m)| m.has_source())
            .map(|(idx, _)| idx as u32)
            .collect::<Vec<_>>();
        by_original.sort_by(|&a, &b| {
            compare_by_original(
                &view(&source_keys, &names, &generated[a as usize]),
                &view(&source_keys, &names, &generated[b as usize]),
                false,
            )
        });

        Self {
            source_keys,
            sources,
            names,
            generated,
            by_original,
        }
    }

    /// Decodes a `mappings` string. Every field except the generated column is a delta against
    /// the previous segment across the whole string; the generated column restarts on each line.
    pub fn decode(
        mappings: &str,
        source_keys: Vec<Arc<str>>,
        sources: Vec<Arc<str>>,
        names: Vec<Arc<str>>,
    ) -> Result<Self> {
        let sources_len = source_keys.len() as i64;
        let names_len = names.len() as i64;

        let mut generated = Vec::with_capacity(mappings.len() / 6);
        let mut decoder = VlqDecoder::new();

        let mut generated_line = 1u32;
        let mut generated_col = 0i64;
        let mut source_id = 0i64;
        let mut original_line = 0i64;
        let mut original_col = 0i64;
        let mut name_id = 0i64;

        for piece in Pieces::new(mappings) {
            let segment = match piece {
                Piece::LineEnd => {
                    generated_line += 1;
                    generated_col = 0;
                    continue;
                }
                Piece::Segment(segment) => segment,
            };

            let nums = decoder.decode(segment)?;

            generated_col = generated_col.saturating_add(nums[0]);
            let mut mapping =
                RawMapping::new(Position::new(generated_line, position(generated_col, segment)?));

            if nums.len() > 1 {
                source_id = source_id.saturating_add(nums[1]);
                if !(0..sources_len).contains(&source_id) {
                    return Err(Error::IndexOutOfRange(source_id));
                }
                original_line = original_line.saturating_add(nums[2]);
                original_col = original_col.saturating_add(nums[3]);

                // lines are 0-based on the wire
                let line = position(original_line, segment)?
                    .checked_add(1)
                    .ok_or_else(|| Error::MappingMalformed(segment.to_owned()))?;
                let original = Position::new(line, position(original_col, segment)?);
                mapping = mapping.with_source(source_id as u32, original);

                if nums.len() == 5 {
                    name_id = name_id.saturating_add(nums[4]);
                    if !(0..names_len).contains(&name_id) {
                        return Err(Error::IndexOutOfRange(name_id));
                    }
                    mapping = mapping.with_name(name_id as u32);
                }
            }

            generated.push(mapping);
        }

        tracing::debug!(
            mappings = generated.len(),
            sources = sources_len,
            names = names_len,
            "decoded mappings"
        );

        Ok(Self::new(source_keys, sources, names, generated))
    }

    /// Concatenates several tables into one, shifting each part's mappings to start at the paired
    /// generated position. Source and name ids are rebased onto the concatenated lists.
    pub fn compose<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = (&'a MappingTables, Position)>,
    {
        let mut sources = Vec::new();
        let mut names = Vec::new();
        let mut generated = Vec::new();

        for (tables, start) in parts {
            let source_base = sources.len() as u32;
            let name_base = names.len() as u32;
            sources.extend(tables.sources.iter().cloned());
            names.extend(tables.names.iter().cloned());

            generated.reserve(tables.generated.len());
            for mapping in &tables.generated {
                let local = mapping.generated();
                let line = local.line.saturating_add(start.line.saturating_sub(1));
                let column = if local.line == 1 {
                    local.column.saturating_add(start.column)
                } else {
                    local.column
                };
                generated.push(mapping.rebased(Position::new(line, column), source_base, name_base));
            }
        }

        tracing::debug!(mappings = generated.len(), "composed section mappings");

        // callers see the resolved sources, so they are also the sort keys
        Self::new(sources.clone(), sources, names, generated)
    }
}

impl MappingTables {
    #[inline]
    fn view(&self, mapping: &RawMapping) -> MappingView<'_> {
        view(&self.source_keys, &self.names, mapping)
    }

    /// The mapping nearest at or before `pos` on the same generated line, if it has a source.
    pub fn original_for(&self, pos: Position) -> Option<OriginalLocation> {
        let needle = MappingView {
            generated: pos,
            original: None,
            source: None,
            name: None,
        };
        let idx = nearest_at_or_before(&self.generated, |m| {
            compare_by_generated(&needle, &self.view(m), true)
        })?;

        let mapping = &self.generated[idx];
        if mapping.generated().line != pos.line {
            return None;
        }

        let source_info = mapping.source_info()?;
        Some(OriginalLocation {
            source: self.sources.get(source_info.id as usize)?.clone(),
            line: source_info.position.line,
            column: source_info.position.column,
            name: mapping
                .name_info()
                .and_then(|id| self.names.get(id as usize).cloned()),
        })
    }

    /// The mapping nearest at or before (`source`, `pos`) in original order. The match may belong
    /// to an earlier line or source.
    pub fn generated_for(&self, source: &str, pos: Position) -> Option<GeneratedLocation> {
        let rank = self.search_original(source, pos)?;
        let mapping = self.by_original_at(rank);
        // the nearest mapping may belong to the preceding source
        if self.view(mapping).source != Some(source) {
            return None;
        }
        Some(mapping.generated_location())
    }

    /// All mappings on `line` of `source`, in original column order.
    pub fn all_generated_for(&self, source: &str, line: u32) -> Vec<GeneratedLocation> {
        let mut locations = Vec::new();
        // an infinite column finds the last mapping of the line
        let Some(last) = self.search_original(source, Position::new(line, u32::MAX)) else {
            return locations;
        };

        for rank in (0..=last).rev() {
            let mapping = self.by_original_at(rank);
            let view = self.view(mapping);
            if view.source != Some(source) || view.original.map(|p| p.line) != Some(line) {
                break;
            }
            locations.push(mapping.generated_location());
        }

        locations.reverse();
        locations
    }

    /// Returns the rank in `by_original` of the nearest mapping in original order.
    fn search_original(&self, source: &str, pos: Position) -> Option<usize> {
        let needle = MappingView {
            generated: Position::new(0, 0),
            original: Some(pos),
            source: Some(source),
            name: None,
        };
        nearest_at_or_before(&self.by_original, |&idx| {
            compare_by_original(&needle, &self.view(&self.generated[idx as usize]), true)
        })
    }

    #[inline]
    fn by_original_at(&self, rank: usize) -> &RawMapping {
        &self.generated[self.by_original[rank] as usize]
    }

    /// Sets the inclusive last generated column of every mapping: one before the next mapping on
    /// the same line, or `u32::MAX` for the last mapping of a line.
    pub fn compute_column_spans(&mut self) {
        for idx in 0..self.generated.len() {
            let current = self.generated[idx].generated();
            let last_column = match self.generated.get(idx + 1).map(RawMapping::generated) {
                Some(next) if next.line == current.line => next.column.saturating_sub(1),
                _ => u32::MAX,
            };
            self.generated[idx].set_last_generated_column(last_column);
        }
    }

    pub fn iter(&self, order: MappingOrder) -> MappingIter<'_> {
        MappingIter {
            tables: self,
            order,
            next: 0,
        }
    }

    fn to_mapping(&self, raw: &RawMapping) -> Mapping {
        let source_info = raw.source_info();
        Mapping {
            generated: raw.generated(),
            original: source_info.map(|info| info.position),
            source: source_info.and_then(|info| self.sources.get(info.id as usize).cloned()),
            name: raw
                .name_info()
                .and_then(|id| self.names.get(id as usize).cloned()),
        }
    }
}

/// Iterator over the mappings of a [MapIndex](crate::MapIndex), created by
/// [each_mapping](crate::MapIndex::each_mapping). Sources are resolved against `sourceRoot`.
#[derive(Debug, Clone)]
pub struct MappingIter<'a> {
    tables: &'a MappingTables,
    order: MappingOrder,
    next: usize,
}

impl Iterator for MappingIter<'_> {
    type Item = Mapping;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = match self.order {
            MappingOrder::Generated => self.tables.generated.get(self.next)?,
            MappingOrder::Original => {
                if self.next >= self.tables.by_original.len() {
                    return None;
                }
                self.tables.by_original_at(self.next)
            }
        };
        self.next += 1;
        Some(self.tables.to_mapping(raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = match self.order {
            MappingOrder::Generated => self.tables.generated.len(),
            MappingOrder::Original => self.tables.by_original.len(),
        };
        let remaining = len.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MappingIter<'_> {}
