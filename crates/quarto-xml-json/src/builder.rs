//! Stack-based construction of the structured tree from reader events.

use indexmap::IndexMap;

use crate::order::OrderCounter;
use crate::{Error, Node, Result};

/// Builds one [`Node`] tree from a stream of open / text / close events.
///
/// A builder handles exactly one document. Once the root element has been
/// closed, any further element is rejected.
#[derive(Debug)]
pub struct TreeBuilder {
    /// Record order indices on children.
    preserve_order: bool,

    /// Elements that are open, innermost last.
    stack: Vec<Frame>,

    /// The finished root element and its name.
    root: Option<(String, Node)>,
}

/// An element being constructed.
#[derive(Debug)]
struct Frame {
    /// Lowercased element name. Used as the key in the parent, never stored in the node.
    name: String,

    /// The node being filled in.
    node: Node,

    /// Text accumulated across every text event inside this element.
    text: String,

    /// Order indices handed out to this element's children.
    counter: OrderCounter,
}

impl TreeBuilder {
    pub fn new(preserve_order: bool) -> Self {
        Self {
            preserve_order,
            stack: Vec::new(),
            root: None,
        }
    }

    /// Handle a start tag.
    pub fn on_open<I>(&mut self, name: &str, attributes: I, line: usize) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if let Some((root_name, _)) = &self.root {
            return Err(Error::structure(format!(
                "element <{}> on line {} follows the root element <{}>",
                name, line, root_name
            )));
        }

        let node = Node {
            attributes: attributes.into_iter().collect::<IndexMap<_, _>>(),
            line: Some(line),
            ..Node::default()
        };

        tracing::trace!(element = name, line, depth = self.stack.len(), "open");

        self.stack.push(Frame {
            name: name.to_lowercase(),
            node,
            text: String::new(),
            counter: OrderCounter::new(),
        });
        Ok(())
    }

    /// Handle a run of character data.
    ///
    /// Runs inside one element are concatenated, even when child elements sit
    /// between them. Outside the root element only whitespace is allowed;
    /// `line` is reported if anything else shows up there.
    pub fn on_text(&mut self, text: &str, line: usize) -> Result<()> {
        match self.stack.last_mut() {
            Some(frame) => frame.text.push_str(text),
            None if text.trim().is_empty() => {}
            None => {
                return Err(Error::Tokenizer {
                    message: "text data outside of root element".to_string(),
                    line: Some(line),
                });
            }
        }
        Ok(())
    }

    /// Handle an end tag.
    ///
    /// Returns `true` when this closed the root element and the tree is complete.
    pub fn on_close(&mut self, name: &str) -> Result<bool> {
        let Some(frame) = self.stack.pop() else {
            return Err(Error::structure(format!(
                "closing tag </{}> without an open element",
                name
            )));
        };

        if frame.name != name.to_lowercase() {
            return Err(Error::structure(format!(
                "closing tag </{}> does not match <{}>",
                name, frame.name
            )));
        }

        let Frame {
            name,
            mut node,
            text,
            counter: _,
        } = frame;

        if !text.trim().is_empty() {
            node.text = Some(text);
        }

        tracing::trace!(element = %name, depth = self.stack.len(), "close");

        match self.stack.last_mut() {
            Some(parent) => {
                if self.preserve_order {
                    parent.counter.annotate(&mut parent.node, &mut node);
                }
                parent.node.push_child(name, node);
                Ok(false)
            }
            None => {
                self.root = Some((name, node));
                Ok(true)
            }
        }
    }

    /// Finish building and hand out the root element with its name.
    pub fn finish(self) -> Result<(String, Node)> {
        if let Some(frame) = self.stack.last() {
            return Err(Error::Tokenizer {
                message: format!("unexpected end of input, expected </{}>", frame.name),
                line: frame.node.line,
            });
        }
        self.root
            .ok_or_else(|| Error::structure("document has no root element"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn no_attrs() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_single_element() {
        let mut builder = TreeBuilder::new(true);
        builder.on_open("Root", no_attrs(), 1).unwrap();
        assert!(builder.on_close("Root").unwrap());

        let (name, root) = builder.finish().unwrap();
        assert_eq!(name, "root");
        assert_eq!(root.line, Some(1));
        assert!(root.is_empty());
    }

    #[test]
    fn test_attributes() {
        let mut builder = TreeBuilder::new(true);
        builder
            .on_open(
                "note",
                vec![
                    ("dur".to_string(), "4".to_string()),
                    ("step".to_string(), "C".to_string()),
                ],
                1,
            )
            .unwrap();
        builder.on_close("note").unwrap();

        let (_, note) = builder.finish().unwrap();
        assert_eq!(note.get_attribute("dur"), Some("4"));
        assert_eq!(note.get_attribute("step"), Some("C"));
        assert_eq!(note.attributes.len(), 2);
    }

    #[test]
    fn test_mixed_text_is_concatenated() {
        let mut builder = TreeBuilder::new(true);
        builder.on_open("a", no_attrs(), 1).unwrap();
        builder.on_text("foo", 1).unwrap();
        builder.on_open("b", no_attrs(), 1).unwrap();
        builder.on_close("b").unwrap();
        builder.on_text("bar", 1).unwrap();
        builder.on_close("a").unwrap();

        let (_, a) = builder.finish().unwrap();
        assert_eq!(a.text.as_deref(), Some("foobar"));
        assert!(a.get("b").is_some());
    }

    #[test]
    fn test_whitespace_text_is_pruned() {
        let mut builder = TreeBuilder::new(true);
        builder.on_open("a", no_attrs(), 1).unwrap();
        builder.on_text("\n   ", 1).unwrap();
        builder.on_text("\t\n", 2).unwrap();
        builder.on_close("a").unwrap();

        let (_, a) = builder.finish().unwrap();
        assert_eq!(a.text, None);
    }

    #[test]
    fn test_order_indices_span_names() {
        let mut builder = TreeBuilder::new(true);
        builder.on_open("p", no_attrs(), 1).unwrap();
        for (i, name) in ["a", "b", "a", "c"].iter().enumerate() {
            builder.on_open(name, no_attrs(), i + 2).unwrap();
            builder.on_close(name).unwrap();
        }
        builder.on_close("p").unwrap();

        let (_, p) = builder.finish().unwrap();
        let a: Vec<_> = p.get_children("a").iter().map(|n| n.order).collect();
        assert_eq!(a, vec![Some(1), Some(3)]);
        assert_eq!(p.get_children("b")[0].order, Some(2));
        assert_eq!(p.get_children("c")[0].order, Some(4));
        assert_eq!(p.order, None);
        assert!(matches!(p.get("a"), Some(Value::Sequence(v)) if v.len() == 2));
    }

    #[test]
    fn test_order_off_writes_no_indices() {
        let mut builder = TreeBuilder::new(false);
        builder.on_open("p", no_attrs(), 1).unwrap();
        builder.on_open("a", no_attrs(), 2).unwrap();
        builder.on_close("a").unwrap();
        builder.on_open("b", no_attrs(), 3).unwrap();
        builder.on_close("b").unwrap();
        builder.on_close("p").unwrap();

        let (_, p) = builder.finish().unwrap();
        assert_eq!(p.get_children("a")[0].order, None);
        assert_eq!(p.get_children("b")[0].order, None);
    }

    #[test]
    fn test_names_are_lowercased() {
        let mut builder = TreeBuilder::new(true);
        builder.on_open("Score", no_attrs(), 1).unwrap();
        builder.on_open("PART", no_attrs(), 1).unwrap();
        builder.on_close("PART").unwrap();
        builder.on_close("Score").unwrap();

        let (name, score) = builder.finish().unwrap();
        assert_eq!(name, "score");
        assert!(score.get("part").is_some());
    }

    #[test]
    fn test_whitespace_outside_root_is_allowed() {
        let mut builder = TreeBuilder::new(true);
        builder.on_text("\n  ", 1).unwrap();
        builder.on_open("a", no_attrs(), 2).unwrap();
        builder.on_close("a").unwrap();
        builder.on_text("\n", 2).unwrap();
        assert!(builder.finish().is_ok());
    }

    #[test]
    fn test_text_outside_root_rejected() {
        let mut builder = TreeBuilder::new(true);
        let err = builder.on_text("junk", 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "XML syntax error: text data outside of root element (line 1)"
        );

        let mut builder = TreeBuilder::new(true);
        builder.on_open("a", no_attrs(), 1).unwrap();
        builder.on_close("a").unwrap();
        let err = builder.on_text("trailing", 3).unwrap_err();
        assert!(matches!(err, Error::Tokenizer { line: Some(3), .. }), "Got: {:?}", err);
    }

    #[test]
    fn test_close_without_open() {
        let mut builder = TreeBuilder::new(true);
        let err = builder.on_close("a").unwrap_err();
        assert!(matches!(err, Error::Structure { .. }));
    }

    #[test]
    fn test_second_root_rejected() {
        let mut builder = TreeBuilder::new(true);
        builder.on_open("a", no_attrs(), 1).unwrap();
        builder.on_close("a").unwrap();
        let err = builder.on_open("b", no_attrs(), 2).unwrap_err();
        assert!(matches!(err, Error::Structure { .. }));
    }

    #[test]
    fn test_unclosed_element_at_end() {
        let mut builder = TreeBuilder::new(true);
        builder.on_open("a", no_attrs(), 1).unwrap();
        builder.on_open("b", no_attrs(), 2).unwrap();
        let err = builder.finish().unwrap_err();
        assert_eq!(
            err.to_string(),
            "XML syntax error: unexpected end of input, expected </b> (line 2)"
        );
    }

    #[test]
    fn test_empty_document() {
        let builder = TreeBuilder::new(true);
        assert!(matches!(
            builder.finish().unwrap_err(),
            Error::Structure { .. }
        ));
    }
}
