//! Core types for the ordered structured tree.

use indexmap::IndexMap;

use crate::metadata::Metadata;

/// One XML element in structured form.
///
/// Attributes, text, sibling order and source line are explicit fields, so
/// none of them can ever collide with a child element name. Children are
/// grouped by element name; when two or more siblings share a name they are
/// stored as a [`Value::Sequence`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Attributes in document order. Empty when the element had none.
    pub attributes: IndexMap<String, String>,

    /// Concatenated text content. `None` when the element only held whitespace.
    pub text: Option<String>,

    /// Dense, parent-scoped ordinal starting at 1.
    ///
    /// Only meaningful relative to siblings under the same parent.
    pub order: Option<u64>,

    /// 1-based source line of the start tag.
    pub line: Option<usize>,

    /// Child elements keyed by element name, in first-seen order.
    pub children: IndexMap<String, Value>,
}

/// The value stored under a child name.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A primitive that becomes the text of a childless element.
    Scalar(Scalar),

    /// A single child element.
    Node(Node),

    /// Two or more same-named child elements.
    Sequence(Vec<Node>),
}

/// A primitive leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

/// A decoded document: the root element plus the metadata needed to write it back.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Declaration and doctype fields.
    pub metadata: Metadata,

    /// Name of the root element (lowercased on decode).
    pub root_name: String,

    /// The root element.
    pub root: Node,
}

impl Node {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style helper to set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder-style helper to set the order index.
    pub fn with_order(mut self, order: u64) -> Self {
        self.order = Some(order);
        self
    }

    /// Builder-style helper to attach a child, merging same-named siblings.
    pub fn with_child(mut self, name: impl Into<String>, child: Node) -> Self {
        self.push_child(name.into(), child);
        self
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Get the value stored under a child name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.children.get(name)
    }

    /// Get all child nodes with the given name, whether stored singly or as a sequence.
    pub fn get_children(&self, name: &str) -> Vec<&Node> {
        match self.children.get(name) {
            Some(Value::Node(node)) => vec![node],
            Some(Value::Sequence(nodes)) => nodes.iter().collect(),
            Some(Value::Scalar(_)) | None => Vec::new(),
        }
    }

    /// Iterate over every child node in storage order, flattening sequences.
    ///
    /// Scalar children are skipped since they can't carry an order index.
    pub fn child_nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children.values_mut().flat_map(|value| match value {
            Value::Node(node) => std::slice::from_mut(node).iter_mut(),
            Value::Sequence(nodes) => nodes.iter_mut(),
            Value::Scalar(_) => std::slice::IterMut::default(),
        })
    }

    /// Attach a child under `name`.
    ///
    /// The first child with a name is stored directly. A second one turns the
    /// entry into a sequence holding both, and later ones are appended.
    pub fn push_child(&mut self, name: String, child: Node) {
        match self.children.get_mut(&name) {
            None => {
                self.children.insert(name, Value::Node(child));
            }
            Some(Value::Sequence(nodes)) => nodes.push(child),
            Some(existing) => {
                let previous = std::mem::replace(existing, Value::Sequence(Vec::new()));
                let mut nodes = match previous {
                    Value::Node(node) => vec![node],
                    // A scalar sibling is promoted to a text-only node so it can share the sequence.
                    Value::Scalar(scalar) => vec![Node::new().with_text(scalar.to_string())],
                    Value::Sequence(nodes) => nodes,
                };
                nodes.push(child);
                *existing = Value::Sequence(nodes);
            }
        }
    }

    /// Whether the node has no attributes, text or children.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.text.is_none() && self.children.is_empty()
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(number) => write!(f, "{}", number),
            Scalar::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl Document {
    /// Create a document from its parts.
    pub fn new(metadata: Metadata, root_name: impl Into<String>, root: Node) -> Self {
        Self {
            metadata,
            root_name: root_name.into(),
            root,
        }
    }
}
