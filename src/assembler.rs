use crate::builder::MapBuilder;
use crate::index::MapIndex;
use crate::mapping::{Mapping, MappingOrder};
use crate::util;
use crate::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

/// The original position a [TextAssembler] node was generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub source: Arc<str>,
    /// 1-based
    pub line: u32,
    /// 0-based
    pub column: u32,
    pub name: Option<Arc<str>>,
}

impl Origin {
    pub fn new<S>(source: S, line: u32, column: u32) -> Self
    where
        S: Into<Arc<str>>,
    {
        Self {
            source: source.into(),
            line,
            column,
            name: None,
        }
    }

    pub fn with_name<S>(mut self, name: S) -> Self
    where
        S: Into<Arc<str>>,
    {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone)]
pub enum Chunk {
    Text(String),
    Node(TextAssembler),
}

impl From<String> for Chunk {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Chunk {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<TextAssembler> for Chunk {
    fn from(node: TextAssembler) -> Self {
        Self::Node(node)
    }
}

/// Generated text paired with the map describing it.
#[derive(Debug, Clone)]
pub struct CodeWithMap {
    pub code: String,
    pub map: MapBuilder,
}

/// A tree of text fragments, each node optionally tagged with the original position it was
/// generated from.
///
/// Code generators build the tree while emitting code, then call
/// [to_string_with_map](Self::to_string_with_map) to get the text and its source map in one
/// pass.
///
/// # Example
/// ```
/// # use smap::{MapBuilder, Origin, TextAssembler};
/// let mut call = TextAssembler::tagged(Origin::new("a.js", 1, 0));
/// call.add("foo();");
///
/// let mut root = TextAssembler::new();
/// root.add("(function() {\n");
/// root.add(call);
/// root.add("\n})();");
///
/// let mut out = root.to_string_with_map(MapBuilder::new()).unwrap();
/// assert_eq!(out.code, "(function() {\nfoo();\n})();");
/// assert_eq!(out.map.serialize().unwrap().mappings.as_deref(), Some(";AAAA,M"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextAssembler {
    origin: Option<Origin>,
    children: Vec<Chunk>,
    sources_content: HashMap<String, String>,
}

impl TextAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tagged(origin: Origin) -> Self {
        Self {
            origin: Some(origin),
            ..Self::default()
        }
    }

    #[inline]
    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    #[inline]
    pub fn children(&self) -> &[Chunk] {
        &self.children
    }

    /// Appends a chunk. Empty text is dropped.
    pub fn add<C>(&mut self, chunk: C) -> &mut Self
    where
        C: Into<Chunk>,
    {
        match chunk.into() {
            Chunk::Text(text) if text.is_empty() => {}
            chunk => self.children.push(chunk),
        }
        self
    }

    pub fn add_all<I, C>(&mut self, chunks: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Chunk>,
    {
        for chunk in chunks {
            self.add(chunk);
        }
        self
    }

    /// Inserts a chunk before every other child. Empty text is dropped.
    pub fn prepend<C>(&mut self, chunk: C) -> &mut Self
    where
        C: Into<Chunk>,
    {
        match chunk.into() {
            Chunk::Text(text) if text.is_empty() => {}
            chunk => self.children.insert(0, chunk),
        }
        self
    }

    /// Inserts `chunks` before every other child, keeping their order.
    pub fn prepend_all<I, C>(&mut self, chunks: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Chunk>,
    {
        let mut chunks = chunks
            .into_iter()
            .map(Into::into)
            .filter(|chunk| !matches!(chunk, Chunk::Text(text) if text.is_empty()))
            .collect::<Vec<_>>();
        chunks.append(&mut self.children);
        self.children = chunks;
        self
    }

    /// Puts `separator` between every two children.
    pub fn join(&mut self, separator: &str) -> &mut Self {
        if self.children.len() < 2 {
            return self;
        }

        let children = std::mem::take(&mut self.children);
        let last = children.len() - 1;
        self.children.reserve(children.len() * 2 - 1);
        for (idx, child) in children.into_iter().enumerate() {
            self.children.push(child);
            if idx != last && !separator.is_empty() {
                self.children.push(Chunk::Text(separator.to_owned()));
            }
        }
        self
    }

    /// Replaces the first occurrence of `pattern` in the right-most text of the tree.
    pub fn replace_right(&mut self, pattern: &str, replacement: &str) -> &mut Self {
        match self.children.last_mut() {
            Some(Chunk::Node(node)) => {
                node.replace_right(pattern, replacement);
            }
            Some(Chunk::Text(text)) => {
                *text = text.replacen(pattern, replacement, 1);
            }
            None => {}
        }
        self
    }

    /// Records the content of `source`, or forgets it when `content` is `None`.
    pub fn set_source_content(&mut self, source: &str, content: Option<String>) {
        match content {
            Some(content) => {
                self.sources_content.insert(source.to_owned(), content);
            }
            None => {
                self.sources_content.remove(source);
            }
        }
    }

    /// Visits every recorded source content, descendants first.
    pub fn walk_source_contents<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &str),
    {
        self.walk_source_contents_inner(&mut visit);
    }

    fn walk_source_contents_inner(&self, visit: &mut dyn FnMut(&str, &str)) {
        for child in &self.children {
            if let Chunk::Node(node) = child {
                node.walk_source_contents_inner(visit);
            }
        }
        for (source, content) in &self.sources_content {
            visit(source, content);
        }
    }

    /// Visits every non-empty text fragment depth first, along with the origin of the node
    /// directly holding it.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&str, Option<&Origin>),
    {
        let _ = self.try_walk::<Infallible>(&mut |text, origin| {
            visit(text, origin);
            Ok(())
        });
    }

    fn try_walk<E>(
        &self,
        visit: &mut dyn FnMut(&str, Option<&Origin>) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        for child in &self.children {
            match child {
                Chunk::Node(node) => node.try_walk(visit)?,
                Chunk::Text(text) if !text.is_empty() => visit(text, self.origin.as_ref())?,
                Chunk::Text(_) => {}
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Cursor {
    line: u32,
    column: u32,
    last: Option<Origin>,
    active: bool,
}

fn mapping_at(line: u32, column: u32, origin: &Origin) -> Mapping {
    let mapping =
        Mapping::new(line, column).with_source(origin.source.clone(), origin.line, origin.column);
    match &origin.name {
        Some(name) => mapping.with_name(name.clone()),
        None => mapping,
    }
}

impl TextAssembler {
    /// Concatenates the tree into text and records a mapping into `map` each time the origin
    /// changes. Generated columns count UTF-16 code units.
    pub fn to_string_with_map(&self, mut map: MapBuilder) -> Result<CodeWithMap> {
        let mut code = String::new();
        let mut cursor = Cursor {
            line: 1,
            ..Cursor::default()
        };

        self.try_walk::<Error>(&mut |text, origin| {
            code.push_str(text);

            match origin {
                Some(origin) => {
                    if cursor.last.as_ref() != Some(origin) {
                        map.add_mapping(mapping_at(cursor.line, cursor.column, origin))?;
                        cursor.last = Some(origin.clone());
                    }
                    cursor.active = true;
                }
                None if cursor.active => {
                    // close the run so the rest of the line maps to nothing
                    map.add_mapping(Mapping::new(cursor.line, cursor.column))?;
                    cursor.last = None;
                    cursor.active = false;
                }
                None => {}
            }

            let mut rest = text;
            while let Some(pos) = memchr::memchr(b'\n', rest.as_bytes()) {
                cursor.line += 1;
                cursor.column = 0;
                rest = &rest[pos + 1..];

                if rest.is_empty() {
                    cursor.last = None;
                    cursor.active = false;
                } else if cursor.active {
                    if let Some(origin) = origin {
                        map.add_mapping(mapping_at(cursor.line, 0, origin))?;
                    }
                }
            }
            cursor.column += util::utf16_len(rest) as u32;
            Ok(())
        })?;

        self.walk_source_contents(|source, content| {
            map.set_source_content(source, Some(content.to_owned()));
        });

        Ok(CodeWithMap { code, map })
    }
}

impl TextAssembler {
    /// Rebuilds a tree from generated `code` and the map describing it.
    ///
    /// Each mapped stretch of `code` becomes a tagged node. Sources, and the recorded source
    /// contents, are joined onto `relative_path` when given.
    pub fn from_parsed_mapping(
        code: &str,
        index: &MapIndex,
        relative_path: Option<&str>,
    ) -> Result<Self> {
        let mut node = Self::new();
        let mut lines = code
            .split_inclusive('\n')
            .map(|line| match line.strip_suffix("\r\n") {
                Some(content) => (content, "\r\n"),
                None => match line.strip_suffix('\n') {
                    Some(content) => (content, "\n"),
                    None => (line, ""),
                },
            })
            .collect::<VecDeque<_>>();

        let mut last_line = 1;
        let mut last_column = 0;
        let mut last_mapping: Option<Mapping> = None;

        for mapping in index.each_mapping(MappingOrder::Generated)? {
            let generated = mapping.generated;
            if let Some(last) = &last_mapping {
                if last_line < generated.line {
                    node.add_with_origin(last, next_line(&mut lines), relative_path);
                    last_line += 1;
                    last_column = 0;
                } else {
                    let text = take_columns(&mut lines, generated.column.saturating_sub(last_column));
                    last_column = generated.column;
                    node.add_with_origin(last, text, relative_path);
                    last_mapping = Some(mapping);
                    continue;
                }
            }

            while last_line < generated.line {
                node.add(next_line(&mut lines));
                last_line += 1;
            }
            if last_column < generated.column {
                node.add(take_columns(&mut lines, generated.column));
                last_column = generated.column;
            }
            last_mapping = Some(mapping);
        }

        if !lines.is_empty() {
            if let Some(last) = &last_mapping {
                node.add_with_origin(last, next_line(&mut lines), relative_path);
            }
            let rest = lines
                .drain(..)
                .flat_map(|(content, newline)| [content, newline])
                .collect::<String>();
            node.add(rest);
        }

        for source in index.sources() {
            if let Some(content) = index.source_content_for(source, true)? {
                let source = match relative_path {
                    Some(path) => util::join(path, source),
                    None => source.to_string(),
                };
                node.set_source_content(&source, Some(content.to_owned()));
            }
        }

        Ok(node)
    }

    fn add_with_origin(&mut self, mapping: &Mapping, text: String, relative_path: Option<&str>) {
        let (Some(source), Some(original)) = (&mapping.source, mapping.original) else {
            self.add(text);
            return;
        };

        let source: Arc<str> = match relative_path {
            Some(path) => Arc::from(util::join(path, source)),
            None => source.clone(),
        };
        let mut origin = Origin::new(source, original.line, original.column);
        origin.name = mapping.name.clone();

        let mut child = Self::tagged(origin);
        child.add(text);
        self.add(child);
    }
}

fn next_line(lines: &mut VecDeque<(&str, &str)>) -> String {
    match lines.pop_front() {
        Some((content, newline)) => format!("{content}{newline}"),
        None => String::new(),
    }
}

/// Takes up to `columns` UTF-16 units off the front of the current line, never its line end.
fn take_columns(lines: &mut VecDeque<(&str, &str)>, columns: u32) -> String {
    let Some((content, _)) = lines.front_mut() else {
        return String::new();
    };
    let (head, tail) = util::split_at_utf16(*content, columns as usize);
    *content = tail;
    head.to_owned()
}

impl fmt::Display for TextAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.try_walk(&mut |text, _| f.write_str(text))
    }
}
