//! Options for decoding and encoding.
//!
//! Both option types deserialize with `#[serde(default)]`, so a partial
//! configuration (or none at all) falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::ReservedKeys;

/// Options controlling XML -> structured tree decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Record an order index on every child so sibling order survives a round trip.
    pub preserve_order: bool,

    /// Reserved keys for the JSON form of the result.
    pub keys: ReservedKeys,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            preserve_order: true,
            keys: ReservedKeys::default(),
        }
    }
}

impl DecodeOptions {
    pub fn with_preserve_order(mut self, preserve_order: bool) -> Self {
        self.preserve_order = preserve_order;
        self
    }

    pub fn with_keys(mut self, keys: ReservedKeys) -> Self {
        self.keys = keys;
        self
    }
}

/// Indentation used when pretty-printing XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Indent {
    /// Character repeated for each level. Must be ASCII.
    pub char: char,
    /// Characters per nesting level.
    pub size: usize,
}

impl Default for Indent {
    fn default() -> Self {
        Self { char: ' ', size: 2 }
    }
}

/// Options controlling structured tree -> XML encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Pretty-print with this indentation, or write compact XML when `None`.
    pub indent: Option<Indent>,

    /// Reserved keys expected in JSON input.
    pub keys: ReservedKeys,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: Some(Indent::default()),
            keys: ReservedKeys::default(),
        }
    }
}

impl EncodeOptions {
    /// Compact output without indentation or line breaks.
    pub fn compact() -> Self {
        Self {
            indent: None,
            ..Default::default()
        }
    }

    pub fn with_indent(mut self, indent: Option<Indent>) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_keys(mut self, keys: ReservedKeys) -> Self {
        self.keys = keys;
        self
    }
}
