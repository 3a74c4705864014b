use super::tables::{MappingIter, MappingTables};
use super::check_line;
use crate::document::Document;
use crate::mapping::{GeneratedLocation, MappingOrder, OriginalLocation, Position};
use crate::string_set::OrderedStringSet;
use crate::util::{self, Url};
use crate::{Error, Result};
use once_cell::unsync::OnceCell;
use std::sync::Arc;

/// An index over a single-file source map.
///
/// `mappings` is kept undecoded until the first query needs it; the decoded tables are cached
/// for the lifetime of the index.
#[derive(Debug, Clone)]
pub struct BasicMapIndex {
    file: Option<String>,
    source_root: Option<String>,
    // normalized, as written in the document
    sources: OrderedStringSet,
    // `sources` joined with `source_root`
    resolved_sources: Vec<Arc<str>>,
    names: OrderedStringSet,
    sources_content: Option<Vec<Option<String>>>,
    mappings: String,
    tables: OnceCell<MappingTables>,
}

pub(crate) fn check_version(version: Option<u32>) -> Result<()> {
    match version {
        Some(3) => Ok(()),
        Some(version) => Err(Error::UnsupportedVersion(version)),
        None => Err(Error::MissingRequiredField("version")),
    }
}

fn resolve_sources(source_root: Option<&str>, sources: &OrderedStringSet) -> Vec<Arc<str>> {
    match source_root {
        Some(root) => sources
            .iter()
            .map(|source| Arc::from(util::join(root, source)))
            .collect(),
        None => sources.items().to_vec(),
    }
}

impl BasicMapIndex {
    pub fn from_document(doc: Document) -> Result<Self> {
        check_version(doc.version)?;
        let sources = doc
            .sources
            .ok_or(Error::MissingRequiredField("sources"))?;
        let mappings = doc
            .mappings
            .ok_or(Error::MissingRequiredField("mappings"))?;

        if let Some(sources_content) = &doc.sources_content {
            if sources_content.len() != sources.len() {
                return Err(Error::invalid_sources_content(
                    sources.len(),
                    sources_content.len(),
                ));
            }
        }

        // producers emit both `./foo.js` and `foo.js` for the same file
        let sources = OrderedStringSet::from_iter_with_duplicates(
            sources.iter().map(|source| util::normalize(source)),
            true,
        );
        // producers also emit duplicates, keep them so ids stay aligned
        let names = OrderedStringSet::from_iter_with_duplicates(doc.names.unwrap_or_default(), true);
        let resolved_sources = resolve_sources(doc.source_root.as_deref(), &sources);

        Ok(Self {
            file: doc.file,
            source_root: doc.source_root,
            sources,
            resolved_sources,
            names,
            sources_content: doc.sources_content,
            mappings,
            tables: OnceCell::new(),
        })
    }

    /// Creates an index over the current state of `builder`, without serializing it.
    #[cfg(feature = "builder")]
    pub fn from_builder(builder: &mut crate::MapBuilder) -> Self {
        use crate::mapping::RawMapping;

        let source_root = builder.source_root().map(str::to_owned);
        let sources = OrderedStringSet::from_iter_with_duplicates(builder.sources().iter(), true);
        let names = OrderedStringSet::from_iter_with_duplicates(builder.names().iter(), true);
        let sources_content = builder.generate_sources_content(sources.iter());
        let resolved_sources = resolve_sources(source_root.as_deref(), &sources);

        let generated = builder
            .sorted_mappings()
            .iter()
            .map(|mapping| {
                let mut raw = RawMapping::new(mapping.generated);
                if let (Some(source), Some(original)) = (mapping.source.as_deref(), mapping.original)
                {
                    if let Ok(source_id) = sources.index_of(source) {
                        raw = raw.with_source(source_id, original);
                        if let Some(name_id) =
                            mapping.name.as_deref().and_then(|n| names.index_of(n).ok())
                        {
                            raw = raw.with_name(name_id);
                        }
                    }
                }
                raw
            })
            .collect();

        let tables = MappingTables::new(
            sources.items().to_vec(),
            resolved_sources.clone(),
            names.items().to_vec(),
            generated,
        );

        Self {
            file: builder.file().map(str::to_owned),
            source_root,
            sources,
            resolved_sources,
            names,
            sources_content,
            mappings: String::new(),
            tables: OnceCell::with_value(tables),
        }
    }

    pub(crate) fn tables(&self) -> Result<&MappingTables> {
        self.tables.get_or_try_init(|| {
            MappingTables::decode(
                &self.mappings,
                self.sources.items().to_vec(),
                self.resolved_sources.clone(),
                self.names.items().to_vec(),
            )
        })
    }

    #[inline]
    fn relative_source<'a>(&self, source: &'a str) -> &'a str {
        match self.source_root.as_deref() {
            Some(root) => util::relative(root, source),
            None => source,
        }
    }
}

impl BasicMapIndex {
    /// See [MapIndex::original_position_for](crate::MapIndex::original_position_for).
    pub fn original_position_for(&self, line: u32, column: u32) -> Result<Option<OriginalLocation>> {
        check_line(line)?;
        Ok(self.tables()?.original_for(Position::new(line, column)))
    }

    /// See [MapIndex::generated_position_for](crate::MapIndex::generated_position_for).
    pub fn generated_position_for(
        &self,
        source: &str,
        line: u32,
        column: u32,
    ) -> Result<Option<GeneratedLocation>> {
        check_line(line)?;
        let source = self.relative_source(source);
        Ok(self
            .tables()?
            .generated_for(source, Position::new(line, column)))
    }

    /// See [MapIndex::all_generated_positions_for](crate::MapIndex::all_generated_positions_for).
    pub fn all_generated_positions_for(
        &self,
        source: &str,
        line: u32,
    ) -> Result<Vec<GeneratedLocation>> {
        check_line(line)?;
        let source = self.relative_source(source);
        Ok(self.tables()?.all_generated_for(source, line))
    }

    pub fn each_mapping(&self, order: MappingOrder) -> Result<MappingIter<'_>> {
        Ok(self.tables()?.iter(order))
    }

    pub fn compute_column_spans(&mut self) -> Result<()> {
        self.tables()?;
        if let Some(tables) = self.tables.get_mut() {
            tables.compute_column_spans();
        }
        Ok(())
    }

    /// Returns the embedded content of `source`.
    ///
    /// `source` may be given as listed in [sources](Self::sources) or relative to `sourceRoot`.
    /// A known source without content yields `None`; an unknown one is an error unless
    /// `null_on_missing` is set.
    pub fn source_content_for(&self, source: &str, null_on_missing: bool) -> Result<Option<&str>> {
        let source = self.relative_source(source);
        if let Ok(idx) = self.sources.index_of(source) {
            return Ok(self.content_at(idx));
        }

        if let Some(url) = self.source_root.as_deref().and_then(Url::parse) {
            // `file://` sources behave as if served from a local server
            let file_path = source.strip_prefix("file://").unwrap_or(source);
            if url.scheme.as_deref() == Some("file") {
                if let Ok(idx) = self.sources.index_of(file_path) {
                    return Ok(self.content_at(idx));
                }
            }

            if matches!(url.path.as_deref(), None | Some("/")) {
                if let Ok(idx) = self.sources.index_of(&format!("/{source}")) {
                    return Ok(self.content_at(idx));
                }
            }
        }

        if null_on_missing {
            Ok(None)
        } else {
            Err(Error::SourceNotFound(source.to_owned()))
        }
    }

    #[inline]
    fn content_at(&self, idx: u32) -> Option<&str> {
        self.sources_content
            .as_ref()?
            .get(idx as usize)?
            .as_deref()
    }
}

impl BasicMapIndex {
    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    #[inline]
    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    /// Sources joined with `sourceRoot`, in document order.
    #[inline]
    pub fn sources(&self) -> &[Arc<str>] {
        &self.resolved_sources
    }

    #[inline]
    pub fn names(&self) -> &[Arc<str>] {
        self.names.items()
    }
}
