use crate::Result;
use simd_json_derive::{Deserialize, Serialize};
use std::io::{self, Write};

const XSSI_GUARD: &[u8] = b")]}'";

/// The JSON form of a version 3 source map.
///
/// A document is either a single-file map (`sources`, `names`, `mappings`) or an index map
/// (`sections`). Fields are kept as they appear in the input; [MapIndex](crate::MapIndex) checks
/// which ones are required. Unknown fields are ignored.
///
/// # Example
/// ```
/// # use smap::Document;
/// let doc = Document::parse(r#"{"version":3,"sources":["a.js"],"mappings":"AAAA"}"#).unwrap();
/// assert_eq!(doc.version, Some(3));
/// assert_eq!(doc.to_string().unwrap(), r#"{"version":3,"sources":["a.js"],"mappings":"AAAA"}"#);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[simd_json(rename_all = "camelCase")]
pub struct Document {
    pub version: Option<u32>,
    pub file: Option<String>,
    pub source_root: Option<String>,
    pub sources: Option<Vec<String>>,
    pub sources_content: Option<Vec<Option<String>>>,
    pub names: Option<Vec<String>>,
    pub mappings: Option<String>,
    pub sections: Option<Vec<Section>>,
}

/// One entry of an index map.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Section {
    pub offset: Option<Offset>,
    pub url: Option<String>,
    pub map: Option<Box<Document>>,
}

/// Where a section starts in the generated file. Both fields are 0-based.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Offset {
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Document {
    /// Parses a JSON document. A leading `)]}'` guard is skipped.
    pub fn parse(json: &str) -> Result<Self> {
        let mut bytes = json.as_bytes().to_vec();
        Self::parse_slice(&mut bytes)
    }

    /// Same as [Self::parse], but parses in place. The slice is used as scratch space.
    pub fn parse_slice(json: &mut [u8]) -> Result<Self> {
        let json = if json.starts_with(XSSI_GUARD) {
            &mut json[XSSI_GUARD.len()..]
        } else {
            json
        };
        Ok(<Self as Deserialize>::from_slice(json)?)
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.sections.is_some()
    }
}

impl Document {
    pub fn write<W>(&self, w: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        w.write_all(b"{")?;
        match self.version {
            Some(version) => write!(w, r#""version":{version}"#)?,
            None => w.write_all(br#""version":null"#)?,
        }

        if let Some(file) = self.file.as_deref() {
            w.write_all(br#","file":"#)?;
            file.json_write(w)?;
        }
        if let Some(source_root) = self.source_root.as_deref() {
            w.write_all(br#","sourceRoot":"#)?;
            source_root.json_write(w)?;
        }
        if let Some(sources) = &self.sources {
            w.write_all(br#","sources":"#)?;
            sources.json_write(w)?;
        }
        if let Some(sources_content) = &self.sources_content {
            w.write_all(br#","sourcesContent":"#)?;
            sources_content.json_write(w)?;
        }
        if let Some(names) = &self.names {
            w.write_all(br#","names":"#)?;
            names.json_write(w)?;
        }
        if let Some(mappings) = self.mappings.as_deref() {
            w.write_all(br#","mappings":"#)?;
            mappings.json_write(w)?;
        }
        if let Some(sections) = &self.sections {
            w.write_all(br#","sections":["#)?;
            for (idx, section) in sections.iter().enumerate() {
                if idx > 0 {
                    w.write_all(b",")?;
                }
                section.write(w)?;
            }
            w.write_all(b"]")?;
        }

        w.write_all(b"}")
    }

    #[inline]
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        let mut v = Vec::with_capacity(1024);
        self.write(&mut v)?;
        Ok(v)
    }

    #[inline]
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> io::Result<String> {
        // SAFETY: every byte written is either ASCII punctuation or JSON-escaped UTF-8
        self.to_vec()
            .map(|v| unsafe { String::from_utf8_unchecked(v) })
    }
}

impl Section {
    fn write<W>(&self, w: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        w.write_all(b"{")?;
        let offset = self.offset.unwrap_or_default();
        write!(
            w,
            r#""offset":{{"line":{},"column":{}}}"#,
            offset.line.unwrap_or(0),
            offset.column.unwrap_or(0)
        )?;
        if let Some(url) = self.url.as_deref() {
            w.write_all(br#","url":"#)?;
            url.json_write(w)?;
        }
        if let Some(map) = &self.map {
            w.write_all(br#","map":"#)?;
            map.write(w)?;
        }
        w.write_all(b"}")
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::Error;

    #[test]
    fn test_parse_single_file() {
        let doc = Document::parse(
            r#"{
    "version":3,
    "file":"sum.js",
    "sourceRoot":"src",
    "sources":["sum.ts"],
    "sourcesContent":[null],
    "names":[],
    "mappings":";;;AAAO,IAAM",
    "x_google_ignoreList":[0]
}"#,
        )
        .unwrap();
        assert_eq!(doc.version, Some(3));
        assert_eq!(doc.file.as_deref(), Some("sum.js"));
        assert_eq!(doc.source_root.as_deref(), Some("src"));
        assert_eq!(doc.sources, Some(vec!["sum.ts".to_string()]));
        assert_eq!(doc.sources_content, Some(vec![None]));
        assert_eq!(doc.names, Some(vec![]));
        assert_eq!(doc.mappings.as_deref(), Some(";;;AAAO,IAAM"));
        assert!(!doc.is_indexed());
    }

    #[test]
    fn test_parse_guarded() {
        let doc = Document::parse(r#")]}'{"version":3,"sources":[],"mappings":""}"#).unwrap();
        assert_eq!(doc.version, Some(3));
    }

    #[test]
    fn test_parse_sections() {
        let doc = Document::parse(
            r#"{"version":3,"sections":[
    {"offset":{"line":0,"column":0},"map":{"version":3,"sources":["a.js"],"mappings":"AAAA"}},
    {"offset":{"line":10,"column":4},"url":"b.js.map"}
]}"#,
        )
        .unwrap();
        let sections = doc.sections.as_deref().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].offset.unwrap().line, Some(10));
        assert_eq!(sections[1].url.as_deref(), Some("b.js.map"));
        let inner = sections[0].map.as_deref().unwrap();
        assert_eq!(inner.mappings.as_deref(), Some("AAAA"));

        insta::assert_snapshot!(doc.to_string().unwrap(), @r###"{"version":3,"sections":[{"offset":{"line":0,"column":0},"map":{"version":3,"sources":["a.js"],"mappings":"AAAA"}},{"offset":{"line":10,"column":4},"url":"b.js.map"}]}"###);
    }

    #[test]
    fn test_parse_error() {
        let result = Document::parse(r#"{"version":3,"sources":["a.js"] "mappings":""}"#);
        assert!(matches!(result, Err(Error::Syntax(_))));
    }

    #[test]
    fn test_write_escapes() {
        let doc = Document {
            version: Some(3),
            file: Some("out \"min\".js".into()),
            sources: Some(vec!["a.js".into()]),
            sources_content: Some(vec![Some("let x = '\n';".into())]),
            names: Some(vec![]),
            mappings: Some("AAAA".into()),
            ..Default::default()
        };
        insta::assert_snapshot!(doc.to_string().unwrap(), @r###"{"version":3,"file":"out \"min\".js","sources":["a.js"],"sourcesContent":["let x = '\n';"],"names":[],"mappings":"AAAA"}"###);
    }
}
