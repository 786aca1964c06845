//! Writes a structured tree back out as XML.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::keys::is_xml_name;
use crate::metadata::Metadata;
use crate::options::EncodeOptions;
use crate::order::arrange;
use crate::{Document, Error, Node, Result, Scalar, Value};

/// A child to be written, borrowed from its parent.
#[derive(Debug, Clone, Copy)]
enum Child<'a> {
    Scalar(&'a Scalar),
    Node(&'a Node),
}

impl Child<'_> {
    fn order(&self) -> Option<u64> {
        match self {
            Child::Scalar(_) => None,
            Child::Node(node) => node.order,
        }
    }
}

/// Render a whole document: declaration, doctype and root element.
pub fn emit_document(document: &Document, options: &EncodeOptions) -> Result<String> {
    let mut emitter = Emitter::new(options)?;
    emitter.prolog(&document.metadata)?;
    emitter.element(&document.root_name, Child::Node(&document.root))?;
    emitter.finish()
}

/// Render a single element and its descendants without a prolog.
///
/// # Example
///
/// ```rust
/// use quarto_xml_json::{emit_element, EncodeOptions, Node};
///
/// let note = Node::new().with_attribute("dur", "4");
/// let xml = emit_element("note", &note, &EncodeOptions::compact()).unwrap();
/// assert_eq!(xml, r#"<note dur="4"/>"#);
/// ```
pub fn emit_element(name: &str, node: &Node, options: &EncodeOptions) -> Result<String> {
    let mut emitter = Emitter::new(options)?;
    emitter.element(name, Child::Node(node))?;
    emitter.finish()
}

struct Emitter<'a> {
    writer: Writer<Vec<u8>>,

    /// Indent byte and width per level, when pretty-printing.
    indent: Option<(u8, usize)>,

    /// Names of the elements currently being written, for error paths.
    path: Vec<&'a str>,
}

impl<'a> Emitter<'a> {
    fn new(options: &EncodeOptions) -> Result<Self> {
        let indent = match options.indent {
            Some(indent) => {
                let indent_char = u8::try_from(indent.char)
                    .ok()
                    .filter(u8::is_ascii)
                    .ok_or_else(|| {
                        Error::invalid_value(&["indent"], "indent character must be ASCII")
                    })?;
                Some((indent_char, indent.size))
            }
            None => None,
        };
        let writer = match indent {
            Some((indent_char, size)) => Writer::new_with_indent(Vec::new(), indent_char, size),
            None => Writer::new(Vec::new()),
        };
        Ok(Self {
            writer,
            indent,
            path: Vec::new(),
        })
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(Error::serializer)
    }

    fn prolog(&mut self, metadata: &Metadata) -> Result<()> {
        let declaration = &metadata.declaration;
        let standalone = if declaration.standalone { "yes" } else { "no" };
        self.write(Event::Decl(BytesDecl::new(
            &declaration.version,
            Some(declaration.encoding.as_str()),
            Some(standalone),
        )))?;

        let doctype = &metadata.doctype;
        let content = format!(
            "{} PUBLIC \"{}\" \"{}\"",
            doctype.root_type_name, doctype.public_id, doctype.system_id
        );
        self.write(Event::DocType(BytesText::from_escaped(content)))
    }

    fn element(&mut self, name: &'a str, child: Child<'a>) -> Result<()> {
        self.path.push(name);
        if !is_xml_name(name) {
            return Err(Error::invalid_value(&self.path, "not a valid XML element name"));
        }

        match child {
            Child::Scalar(scalar) => {
                let text = scalar.to_string();
                self.write(Event::Start(BytesStart::new(name)))?;
                self.write(Event::Text(BytesText::new(&text)))?;
                self.write(Event::End(BytesEnd::new(name)))?;
            }
            Child::Node(node) if node.text.is_some() && self.indent.is_some() => {
                self.inline(name, node)?;
            }
            Child::Node(node) => self.node(name, node)?,
        }

        self.path.pop();
        Ok(())
    }

    /// Write an element that has text, and everything inside it, without
    /// indentation, so that no line breaks end up in its text.
    fn inline(&mut self, name: &'a str, node: &'a Node) -> Result<()> {
        let mut inner = Emitter {
            writer: Writer::new(Vec::new()),
            indent: None,
            path: self.path.clone(),
        };
        inner.node(name, node)?;
        let rendered = inner.writer.into_inner();

        let depth = self.path.len().saturating_sub(1);
        let out = self.writer.get_mut();
        if let Some((indent_char, size)) = self.indent {
            if !out.is_empty() {
                out.push(b'\n');
                out.extend(std::iter::repeat_n(indent_char, size * depth));
            }
        }
        out.extend_from_slice(&rendered);
        Ok(())
    }

    fn node(&mut self, name: &'a str, node: &'a Node) -> Result<()> {
        let mut start = BytesStart::new(name);
        for (attr, value) in &node.attributes {
            if !is_xml_name(attr) {
                return Err(Error::invalid_value(
                    &self.path,
                    format!("'{}' is not a valid XML attribute name", attr),
                ));
            }
            start.push_attribute((attr.as_str(), value.as_str()));
        }

        let children = arrange(children_of(node), |(_, child)| child.order());

        if node.text.is_none() && children.is_empty() {
            return self.write(Event::Empty(start));
        }

        self.write(Event::Start(start))?;
        if let Some(text) = &node.text {
            self.write(Event::Text(BytesText::new(text)))?;
        }
        for (child_name, child) in children {
            self.element(child_name, child)?;
        }
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(Error::serializer)
    }
}

/// Flatten a node's children in storage order: sequences expand in place.
fn children_of(node: &Node) -> Vec<(&str, Child<'_>)> {
    let mut children = Vec::new();
    for (name, value) in &node.children {
        match value {
            Value::Scalar(scalar) => children.push((name.as_str(), Child::Scalar(scalar))),
            Value::Node(child) => children.push((name.as_str(), Child::Node(child))),
            Value::Sequence(nodes) => {
                children.extend(nodes.iter().map(|child| (name.as_str(), Child::Node(child))));
            }
        }
    }
    children
}
