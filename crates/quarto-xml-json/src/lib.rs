//! Order-preserving conversion between XML documents and JSON trees.
//!
//! This crate decodes an XML document (MusicXML is the main customer) into a
//! structured tree that maps cleanly onto JSON, and encodes such a tree back
//! into XML. The tree keeps enough information to reproduce the original
//! document: element names, attributes, text, sibling order across differently
//! named children, source lines, and the declaration and DOCTYPE.
//!
//! # Overview
//!
//! The main types are:
//! - [`Document`]: root element plus the [`Metadata`] needed to write it back
//! - [`Node`]: one element with attributes, text, order index and children
//! - [`Value`]: a child entry, either a [`Scalar`], a single [`Node`] or a sequence
//! - [`ReservedKeys`]: the JSON keys that hold attributes, text, order and line
//!
//! # Example
//!
//! ```rust
//! use quarto_xml_json::{decode, encode, DecodeOptions, EncodeOptions};
//!
//! let source = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
//! <score-partwise>
//!   <measure number="1">
//!     <note/><backup/><note/>
//!   </measure>
//! </score-partwise>"#;
//!
//! let document = decode(source, &DecodeOptions::default()).unwrap();
//! let measure = document.root.get_children("measure")[0];
//! assert_eq!(measure.get_attribute("number"), Some("1"));
//! assert_eq!(measure.get_children("note").len(), 2);
//!
//! // Sibling order survives the round trip.
//! let xml = encode(&document, &EncodeOptions::compact()).unwrap();
//! assert!(xml.ends_with(r#"<measure number="1"><note/><backup/><note/></measure></score-partwise>"#));
//! ```
//!
//! # JSON form
//!
//! [`Document::to_json`] produces a single-entry object `{root_name: root}`.
//! Within it, reserved keys (by default `$`, `#text`, `%` and `#l`) carry
//! attributes, text, order index and line number. None of them can be an XML
//! name, so they never collide with child elements:
//!
//! ```rust
//! use quarto_xml_json::{decode_to_json, DecodeOptions};
//!
//! let json = decode_to_json(
//!     r#"<?xml version="1.0" encoding="UTF-8"?>
//! <!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
//! <score-partwise><note dur="4"/></score-partwise>"#,
//!     &DecodeOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(json["score-partwise"]["note"]["$"]["dur"], "4");
//! assert_eq!(json["score-partwise"]["note"]["%"], 1);
//! ```

pub mod builder;
pub mod document;
pub mod emitter;
pub mod error;
pub mod json;
pub mod keys;
pub mod metadata;
pub mod options;
pub mod order;
pub mod parser;
pub mod types;

// Re-export main types
pub use builder::TreeBuilder;
pub use document::{Decoder, Encoder, Phase, decode, decode_to_json, encode, encode_json};
pub use emitter::{emit_document, emit_element};
pub use error::{Error, Result};
pub use keys::ReservedKeys;
pub use metadata::{Declaration, Doctype, Metadata, extract_metadata};
pub use options::{DecodeOptions, EncodeOptions, Indent};
pub use parser::parse_tree;
pub use types::{Document, Node, Scalar, Value};
