use crate::compare::MappingView;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// `Position` represents a one-based line and zero-based column in a file.
///
/// # Note
///
/// The source map specification does not define whether lines start at 0 or 1.
/// This crate follows the convention of NPM libraries such as `source-map`, `acorn` and `babel`:
/// lines are 1-based and columns are 0-based. Columns count UTF-16 code units.
///
/// The only exception is [Offset](crate::Offset) of an index map section, which is 0-based in
/// both fields as written in the document.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl From<(u32, u32)> for Position {
    fn from((line, column): (u32, u32)) -> Self {
        Self::new(line, column)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One point-to-point correspondence between generated and original text.
///
/// A well-formed mapping has one of three shapes:
///
/// 1. just the generated position;
/// 2. the generated position, a source and the original position;
/// 3. as 2, plus a name.
///
/// [MapBuilder](crate::MapBuilder) rejects every other combination unless validation is skipped.
#[derive(Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Mapping {
    pub generated: Position,
    pub original: Option<Position>,
    pub source: Option<Arc<str>>,
    pub name: Option<Arc<str>>,
}

impl Mapping {
    #[inline]
    pub fn new(generated_line: u32, generated_column: u32) -> Self {
        Self {
            generated: Position::new(generated_line, generated_column),
            original: None,
            source: None,
            name: None,
        }
    }

    #[inline]
    pub fn with_source<S>(self, source: S, original_line: u32, original_column: u32) -> Self
    where
        S: Into<Arc<str>>,
    {
        Self {
            original: Some(Position::new(original_line, original_column)),
            source: Some(source.into()),
            ..self
        }
    }

    #[inline]
    pub fn with_name<S>(self, name: S) -> Self
    where
        S: Into<Arc<str>>,
    {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    #[inline]
    pub(crate) fn view(&self) -> MappingView<'_> {
        MappingView {
            generated: self.generated,
            original: self.original,
            source: self.source.as_deref(),
            name: self.name.as_deref(),
        }
    }
}

impl Debug for Mapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Mapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.generated)?;
        match (&self.source, self.original) {
            (Some(source), Some(original)) => write!(f, " -> {source}:{original}")?,
            (Some(source), None) => write!(f, " -> {source}")?,
            (None, Some(original)) => write!(f, " -> {original}")?,
            (None, None) => {}
        }
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

/// Result of translating a generated position to the original source.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct OriginalLocation {
    pub source: Arc<str>,
    pub line: u32,
    pub column: u32,
    pub name: Option<Arc<str>>,
}

impl Display for OriginalLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

/// Result of translating an original position to the generated text.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratedLocation {
    pub line: u32,
    pub column: u32,
    /// Inclusive last column covered by the mapping, available after
    /// [compute_column_spans](crate::MapIndex::compute_column_spans).
    /// `u32::MAX` means the mapping runs to the end of the line.
    pub last_column: Option<u32>,
}

/// Iteration order of [MapIndex::each_mapping](crate::MapIndex::each_mapping).
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum MappingOrder {
    /// Sorted by generated line and column.
    #[default]
    Generated,
    /// Sorted by source, original line and column. Mappings without an original position are
    /// skipped.
    Original,
}

/// Presents a specific position in a specific source file.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct SourceInfo {
    pub id: u32,
    pub position: Position,
}

impl SourceInfo {
    pub const fn new(id: u32, position: Position) -> Self {
        Self { id, position }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct OptionNum<const N: usize>([u32; N]);

impl<const N: usize> OptionNum<N> {
    const MISSING: u32 = 0xFFFFFFFF;

    #[inline]
    const fn missing() -> Self {
        Self([Self::MISSING; N])
    }

    #[inline]
    const fn new(v: [u32; N]) -> Self {
        Self(v)
    }

    #[inline]
    const fn get(&self) -> Option<&[u32; N]> {
        if self.is_missing() {
            None
        } else {
            Some(&self.0)
        }
    }

    #[inline]
    const fn is_missing(&self) -> bool {
        self.0[0] == Self::MISSING
    }
}

/// A decoded mapping whose source and name are ids into the owning table.
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct RawMapping {
    generated: Position,

    // [source_id, source_line, source_col]
    source: OptionNum<3>,

    // [name_id]
    name: OptionNum<1>,

    last_generated_column: Option<u32>,
}

impl Debug for RawMapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.generated)?;
        if let Some(source_info) = self.source_info() {
            write!(f, " -> #{}:{}", source_info.id, source_info.position)?;
            if let Some(name_id) = self.name_info() {
                write!(f, " (#{})", name_id)?;
            }
        }
        Ok(())
    }
}

impl RawMapping {
    #[inline(always)]
    pub const fn new(generated: Position) -> Self {
        Self {
            generated,
            source: OptionNum::missing(),
            name: OptionNum::missing(),
            last_generated_column: None,
        }
    }

    #[inline(always)]
    pub const fn with_source(self, source_id: u32, original: Position) -> Self {
        Self {
            source: OptionNum::new([source_id, original.line, original.column]),
            ..self
        }
    }

    #[inline(always)]
    pub const fn with_name(self, name_id: u32) -> Self {
        Self {
            name: OptionNum::new([name_id]),
            ..self
        }
    }

    /// Moves the mapping to `generated` and shifts its ids by the given bases. The column span is
    /// not carried over.
    #[inline]
    pub fn rebased(&self, generated: Position, source_base: u32, name_base: u32) -> Self {
        let mut mapping = Self::new(generated);
        if let Some(info) = self.source_info() {
            mapping = mapping.with_source(info.id + source_base, info.position);
            if let Some(name_id) = self.name_info() {
                mapping = mapping.with_name(name_id + name_base);
            }
        }
        mapping
    }

    #[inline]
    pub fn generated(&self) -> Position {
        self.generated
    }

    #[inline]
    pub fn source_info(&self) -> Option<SourceInfo> {
        self.source
            .get()
            .map(|&[source_id, source_line, source_col]| {
                SourceInfo::new(source_id, Position::new(source_line, source_col))
            })
    }

    #[inline]
    pub fn has_source(&self) -> bool {
        !self.source.is_missing()
    }

    /// Name information is only present alongside source information.
    #[inline]
    pub fn name_info(&self) -> Option<u32> {
        self.name.get().map(|&[v]| v)
    }

    #[inline]
    pub fn set_last_generated_column(&mut self, column: u32) {
        self.last_generated_column = Some(column);
    }

    #[inline]
    pub fn generated_location(&self) -> GeneratedLocation {
        GeneratedLocation {
            line: self.generated.line,
            column: self.generated.column,
            last_column: self.last_generated_column,
        }
    }
}
