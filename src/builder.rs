use crate::compare::compare_by_generated;
use crate::document::Document;
use crate::index::MapIndex;
use crate::mapping::{Mapping, MappingOrder, Position};
use crate::mapping_list::MappingList;
use crate::string_set::OrderedStringSet;
use crate::util;
use crate::vlq::VlqEncoder;
use crate::{Error, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

/// Builds a source map while the generated file is being written.
///
/// Mappings may be added in any order; they are sorted when the map is serialized.
///
/// # Example
/// ```
/// # use smap::{MapBuilder, Mapping};
/// let mut builder = MapBuilder::new().with_file("min.js");
/// builder.add_mapping(Mapping::new(1, 0).with_source("a.js", 1, 0)).unwrap();
/// builder.add_mapping(Mapping::new(1, 5).with_source("a.js", 1, 2).with_name("x")).unwrap();
/// assert_eq!(
///     builder.to_string().unwrap(),
///     r#"{"version":3,"file":"min.js","sources":["a.js"],"names":["x"],"mappings":"AAAA,KAAEA"}"#
/// );
/// ```
#[derive(Debug, Default, Clone)]
pub struct MapBuilder {
    file: Option<String>,
    source_root: Option<String>,
    skip_validation: bool,
    sources: OrderedStringSet,
    names: OrderedStringSet,
    // keyed by source relative to `source_root`
    sources_content: HashMap<String, String>,
    mappings: MappingList,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn with_file<S>(mut self, file: S) -> Self
    where
        S: Into<String>,
    {
        self.file = Some(file.into());
        self
    }

    #[inline(always)]
    pub fn with_source_root<S>(mut self, source_root: S) -> Self
    where
        S: Into<String>,
    {
        self.source_root = Some(source_root.into());
        self
    }

    /// Disables the shape check of [Self::add_mapping]. Malformed mappings then produce a
    /// malformed map.
    #[inline(always)]
    pub fn with_skip_validation(mut self, skip_validation: bool) -> Self {
        self.skip_validation = skip_validation;
        self
    }

    /// Creates a builder holding every mapping and source content of `index`.
    pub fn from_index(index: &MapIndex) -> Result<Self> {
        let source_root = index.source_root();
        let mut builder = Self {
            file: index.file().map(str::to_owned),
            source_root: source_root.map(str::to_owned),
            ..Self::default()
        };

        for mapping in index.each_mapping(MappingOrder::Generated)? {
            let mut replayed = Mapping::new(mapping.generated.line, mapping.generated.column);
            if let (Some(source), Some(original)) = (&mapping.source, mapping.original) {
                let source: Arc<str> = match source_root {
                    Some(root) => Arc::from(util::relative(root, source)),
                    None => source.clone(),
                };
                replayed = replayed.with_source(source, original.line, original.column);
                if let Some(name) = mapping.name {
                    replayed = replayed.with_name(name);
                }
            }
            builder.add_mapping(replayed)?;
        }

        for source in index.sources() {
            if let Some(content) = index.source_content_for(source, true)? {
                builder.set_source_content(source, Some(content.to_owned()));
            }
        }

        Ok(builder)
    }
}

fn validate(mapping: &Mapping) -> Result<()> {
    let valid = mapping.generated.line > 0
        && match (&mapping.original, &mapping.source, &mapping.name) {
            (None, None, None) => true,
            (Some(original), Some(_), _) => original.line > 0,
            _ => false,
        };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidMapping(mapping.to_string()))
    }
}

impl MapBuilder {
    /// Adds a mapping, registering its source and name.
    ///
    /// Fails with [Error::InvalidMapping] unless the mapping has a positive generated line and
    /// either nothing else, or a source with a positive original line and an optional name.
    pub fn add_mapping(&mut self, mapping: Mapping) -> Result<()> {
        if !self.skip_validation {
            validate(&mapping)?;
        }

        if let Some(source) = mapping.source.as_deref() {
            self.sources.add(source, false);
        }
        if let Some(name) = mapping.name.as_deref() {
            self.names.add(name, false);
        }
        self.mappings.add(mapping);
        Ok(())
    }

    /// Sets the content of `source`, or removes it when `content` is `None`.
    pub fn set_source_content(&mut self, source: &str, content: Option<String>) {
        let source = match self.source_root.as_deref() {
            Some(root) => util::relative(root, source),
            None => source,
        };

        match content {
            Some(content) => {
                self.sources_content.insert(source.to_owned(), content);
            }
            None => {
                self.sources_content.remove(source);
            }
        }
    }

    /// Rewrites the mappings pointing into `source_file` through `index`, a map of that file.
    ///
    /// `source_file` defaults to the file of `index`. Sources produced by `index` are joined
    /// onto `source_map_path` when given, which is needed when the two maps live in different
    /// directories. Mappings `index` cannot resolve are kept as they are. Afterwards only the
    /// sources and names still referenced remain, and the source contents of `index` are copied.
    pub fn apply_map(
        &mut self,
        index: &MapIndex,
        source_file: Option<&str>,
        source_map_path: Option<&str>,
    ) -> Result<()> {
        let source_file = match source_file {
            Some(source_file) => source_file,
            None => index.file().ok_or(Error::MissingRequiredField("file"))?,
        };
        let source_root = self.source_root.clone();
        let source_file = match source_root.as_deref() {
            Some(root) => util::relative(root, source_file),
            None => source_file,
        };

        // all lookups run before any mapping changes
        let resolved = self
            .mappings
            .iter_unsorted()
            .map(|mapping| match mapping.original {
                Some(original) if mapping.source.as_deref() == Some(source_file) => {
                    index.original_position_for(original.line, original.column)
                }
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sources = OrderedStringSet::new();
        let mut names = OrderedStringSet::new();
        let mut rewritten = 0usize;

        for (mapping, loc) in self.mappings.iter_unsorted_mut().zip(resolved) {
            if let Some(loc) = loc {
                let mut source = loc.source.to_string();
                if let Some(path) = source_map_path {
                    source = util::join(path, &source);
                }
                if let Some(root) = source_root.as_deref() {
                    source = util::relative(root, &source).to_owned();
                }

                mapping.source = Some(Arc::from(source));
                mapping.original = Some(Position::new(loc.line, loc.column));
                if loc.name.is_some() {
                    mapping.name = loc.name;
                }
                rewritten += 1;
            }

            if let Some(source) = mapping.source.as_deref() {
                sources.add(source, false);
            }
            if let Some(name) = mapping.name.as_deref() {
                names.add(name, false);
            }
        }

        self.sources = sources;
        self.names = names;
        self.mappings.mark_unsorted();

        for source in index.sources() {
            if let Some(content) = index.source_content_for(source, true)? {
                let source = match source_map_path {
                    Some(path) => util::join(path, source),
                    None => source.to_string(),
                };
                self.set_source_content(&source, Some(content.to_owned()));
            }
        }

        tracing::debug!(source_file, rewritten, "applied source map");
        Ok(())
    }
}

impl MapBuilder {
    /// Produces the document for the current state.
    pub fn serialize(&mut self) -> Result<Document> {
        let mappings = self.serialize_mappings()?;
        Ok(Document {
            version: Some(3),
            file: self.file.clone(),
            source_root: self.source_root.clone(),
            sources: Some(self.sources.to_vec()),
            sources_content: self.generate_sources_content(self.sources.iter()),
            names: Some(self.names.to_vec()),
            mappings: Some(mappings),
            sections: None,
        })
    }

    fn serialize_mappings(&mut self) -> Result<String> {
        let mappings = self.mappings.as_sorted();
        let mut buf = Vec::with_capacity(mappings.len() * 6);

        let mut prev_generated_line = 1;
        let mut prev_generated_col = 0;
        let mut prev_source_id = 0;
        let mut prev_original_line = 0;
        let mut prev_original_col = 0;
        let mut prev_name_id = 0;
        let mut prev: Option<&Mapping> = None;

        for mapping in mappings {
            let generated = mapping.generated;
            if generated.line != prev_generated_line {
                prev_generated_col = 0;
                while prev_generated_line < generated.line {
                    buf.push(b';');
                    prev_generated_line += 1;
                }
            } else if let Some(prev) = prev {
                if compare_by_generated(&mapping.view(), &prev.view(), false) == Ordering::Equal {
                    continue;
                }
                buf.push(b',');
            }
            prev = Some(mapping);

            let mut encoder = VlqEncoder::new(&mut buf);
            encoder.encode(prev_generated_col, generated.column)?;
            prev_generated_col = generated.column;

            if let (Some(source), Some(original)) = (mapping.source.as_deref(), mapping.original) {
                let source_id = self.sources.index_of(source)?;
                encoder.encode(prev_source_id, source_id)?;
                prev_source_id = source_id;

                // lines are 0-based on the wire
                let original_line = original.line.saturating_sub(1);
                encoder.encode(prev_original_line, original_line)?;
                prev_original_line = original_line;

                encoder.encode(prev_original_col, original.column)?;
                prev_original_col = original.column;

                if let Some(name) = mapping.name.as_deref() {
                    let name_id = self.names.index_of(name)?;
                    encoder.encode(prev_name_id, name_id)?;
                    prev_name_id = name_id;
                }
            }
        }

        // SAFETY: only base 64 digits, `;` and `,` were written
        Ok(unsafe { String::from_utf8_unchecked(buf) })
    }

    pub fn write<W>(&mut self, w: &mut W) -> Result<()>
    where
        W: Write,
    {
        self.serialize()?.write(w)?;
        Ok(())
    }

    #[inline]
    pub fn to_vec(&mut self) -> Result<Vec<u8>> {
        let mut v = Vec::with_capacity(1024);
        self.write(&mut v)?;
        Ok(v)
    }

    #[inline]
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&mut self) -> Result<String> {
        Ok(self.serialize()?.to_string()?)
    }
}

impl MapBuilder {
    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    #[inline]
    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    #[inline]
    pub fn sources(&self) -> &OrderedStringSet {
        &self.sources
    }

    #[inline]
    pub fn names(&self) -> &OrderedStringSet {
        &self.names
    }

    /// The mappings sorted by generated position.
    #[inline]
    pub fn sorted_mappings(&mut self) -> &[Mapping] {
        self.mappings.as_sorted()
    }

    /// The content of each of `sources`, or `None` when no content was set at all.
    pub(crate) fn generate_sources_content<'a, I>(&self, sources: I) -> Option<Vec<Option<String>>>
    where
        I: Iterator<Item = &'a str>,
    {
        if self.sources_content.is_empty() {
            return None;
        }

        let contents = sources
            .map(|source| {
                let source = match self.source_root.as_deref() {
                    Some(root) => util::relative(root, source),
                    None => source,
                };
                self.sources_content.get(source).cloned()
            })
            .collect();
        Some(contents)
    }
}
