//! # smap
//!
//! This crate provides data structures and utilities for producing and consuming source maps
//! (revision 3) in Rust.
//!
//! ## Getting Started
//!
//! ```
//! use smap::MapIndex;
//!
//! // Parse a source map from text
//! let index = MapIndex::from_str(
//!     r#"{"version":3,"sources":["a.js"],"names":["foo"],"mappings":"AAAA,EAAEA"}"#,
//! ).unwrap();
//!
//! // Find the original position of line 1, column 3 of the generated file
//! let found = index.original_position_for(1, 3).unwrap().unwrap();
//! assert_eq!(found.to_string(), "a.js:1:2 (foo)");
//! ```
//!
//! ## Overview
//!
//! ### `MapIndex`
//!
//! [MapIndex] is a parsed source map answering queries in both directions, from generated
//! positions to original ones and back. It has two variants: [BasicMapIndex] for a single-file
//! map and [SectionedMapIndex] for an index map made of sections.
//!
//! ### `MapBuilder`
//!
//! [MapBuilder] collects mappings while generated code is written and serializes them into a
//! [Document]. It can also rewrite its mappings through another map with
//! [MapBuilder::apply_map].
//!
//! ### `TextAssembler`
//!
//! [TextAssembler] is a tree of text fragments tagged with original positions. Concatenating it
//! yields the generated text and its source map at once.
//!
//! ### `Position`
//!
//! [Position] is a 1-based line and a 0-based column, counted in UTF-16 code units.
//!
//! ### `Mapping`
//!
//! [Mapping] is one entry of the `mappings` field, with its source and name resolved.
//!
//! ## Features
//!
//! - `builder` (default): Enables [MapBuilder], [MappingList], [TextAssembler] and
//!   [MapIndex::from_builder].
//! - `serialize`: Derives `Serialize` and `Deserialize` for the position and mapping types.
//!

pub mod base64;
mod compare;
mod document;
mod error;
mod index;
mod mapping;
mod search;
mod splitter;
mod string_set;
pub mod util;
pub mod vlq;

#[cfg(feature = "builder")]
mod assembler;
#[cfg(feature = "builder")]
mod builder;
#[cfg(feature = "builder")]
mod mapping_list;

pub use document::{Document, Offset, Section};
pub use error::*;
pub use index::{BasicMapIndex, MapIndex, MappingIter, SectionedMapIndex};
pub use mapping::{GeneratedLocation, Mapping, MappingOrder, OriginalLocation, Position};
pub use string_set::OrderedStringSet;

#[cfg(feature = "builder")]
pub use assembler::{Chunk, CodeWithMap, Origin, TextAssembler};
#[cfg(feature = "builder")]
pub use builder::MapBuilder;
#[cfg(feature = "builder")]
pub use mapping_list::MappingList;
