use std::error::Error as StdError;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("source map syntax error: {0}")]
    Syntax(Box<dyn StdError>),
    #[error("unsupported source map version: {0}")]
    UnsupportedVersion(u32),
    #[error("\"{0}\" is a required field")]
    MissingRequiredField(&'static str),
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),
    #[error("a mapping is malformed: \"{0}\"")]
    MappingMalformed(String),
    #[error("expected more digits in base 64 VLQ value")]
    TruncatedVarint,
    #[error("not a valid base 64 digit: {0:?}")]
    InvalidDigit(char),
    #[error("base 64 VLQ value does not fit in 64 bits")]
    VarintOverflow,
    #[error("must be between 0 and 63: {0}")]
    DigitOutOfRange(u8),
    #[error("\"{0}\" is not in the set")]
    NotFound(String),
    #[error("no element indexed by {0}")]
    IndexOutOfRange(i64),
    #[error("\"{0}\" is not in the source map")]
    SourceNotFound(String),
    #[error("section #{0} is out of order: its offset precedes the previous section")]
    UnorderedSections(u32),
    #[error("section #{0} references its map by url, which is not supported")]
    UnsupportedSectionUrl(u32),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(
        "source map has {} sources but {} sourcesContent entries",
        sources_len,
        sources_content_len
    )]
    InvalidSourcesContent {
        sources_len: u32,
        sources_content_len: u32,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<simd_json::Error> for Error {
    fn from(value: simd_json::Error) -> Self {
        Self::Syntax(Box::new(value))
    }
}

impl Error {
    #[cold]
    pub(crate) fn invalid_sources_content(sources_len: usize, sources_content_len: usize) -> Self {
        Self::InvalidSourcesContent {
            sources_len: sources_len as u32,
            sources_content_len: sources_content_len as u32,
        }
    }
}
