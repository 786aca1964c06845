//! Drives quick-xml's reader and feeds its events into a [`TreeBuilder`].

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::builder::TreeBuilder;
use crate::{Error, Node, Result};

/// Parse the element tree of `content`.
///
/// Returns the lowercased root element name and its node. The declaration,
/// doctype, comments and processing instructions are skipped here; see
/// [`crate::metadata`] for the prolog.
///
/// # Example
///
/// ```rust
/// use quarto_xml_json::parse_tree;
///
/// let (name, root) = parse_tree("<measure number=\"1\"><note/></measure>", true).unwrap();
/// assert_eq!(name, "measure");
/// assert_eq!(root.get_attribute("number"), Some("1"));
/// assert_eq!(root.get_children("note")[0].order, Some(1));
/// ```
///
/// # Errors
///
/// Returns [`Error::Tokenizer`] for malformed markup and [`Error::Structure`]
/// when the events don't form exactly one root element.
pub fn parse_tree(content: &str, preserve_order: bool) -> Result<(String, Node)> {
    let mut parser = XmlParser::new(content, preserve_order);
    parser.parse()?;
    parser.builder.finish()
}

/// Internal parser state.
struct XmlParser<'a> {
    /// The source content being parsed.
    source: &'a [u8],

    /// The quick-xml reader.
    reader: Reader<&'a [u8]>,

    /// Receives open / text / close events.
    builder: TreeBuilder,

    /// Incremental line tracking.
    lines: LineCounter,
}

/// Counts newlines up to a byte offset, resuming from the previous offset.
///
/// Offsets only move forward while reading, so counting stays linear overall.
#[derive(Debug)]
struct LineCounter {
    offset: usize,
    line: usize,
}

impl LineCounter {
    fn new() -> Self {
        Self { offset: 0, line: 1 }
    }

    fn line_at(&mut self, source: &[u8], offset: usize) -> usize {
        let offset = offset.min(source.len());
        if offset > self.offset {
            self.line += memchr::memchr_iter(b'\n', &source[self.offset..offset]).count();
            self.offset = offset;
        }
        self.line
    }
}

impl<'a> XmlParser<'a> {
    fn new(source: &'a str, preserve_order: bool) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            source: source.as_bytes(),
            reader,
            builder: TreeBuilder::new(preserve_order),
            lines: LineCounter::new(),
        }
    }

    fn parse(&mut self) -> Result<()> {
        loop {
            // Capture position before reading the event
            let event_start = self.reader.buffer_position() as usize;

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let line = self.lines.line_at(self.source, event_start);
                    let (name, attributes) = read_tag(&e, line)?;
                    self.builder.on_open(&name, attributes, line)?;
                }
                Ok(Event::Empty(e)) => {
                    let line = self.lines.line_at(self.source, event_start);
                    let (name, attributes) = read_tag(&e, line)?;
                    self.builder.on_open(&name, attributes, line)?;
                    self.close(&name)?;
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    self.close(&name)?;
                }
                Ok(Event::Text(e)) => {
                    // Point at the first non-whitespace byte of the run
                    let leading = e.iter().take_while(|b| b.is_ascii_whitespace()).count();
                    let line = self.lines.line_at(self.source, event_start + leading);
                    let text = e.unescape().map_err(|err| Error::Tokenizer {
                        message: format!("Invalid text content: {}", err),
                        line: Some(line),
                    })?;
                    self.builder.on_text(&text, line)?;
                }
                Ok(Event::CData(e)) => {
                    let line = self.lines.line_at(self.source, event_start);
                    let text = String::from_utf8_lossy(e.as_ref());
                    self.builder.on_text(&text, line)?;
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    let position = self.reader.error_position() as usize;
                    return Err(Error::Tokenizer {
                        message: e.to_string(),
                        line: Some(self.lines.line_at(self.source, position)),
                    });
                }
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        if self.builder.on_close(name)? {
            tracing::debug!(root = name, "document ready");
        }
        Ok(())
    }
}

/// Read the element name and unescaped attributes of a start or empty tag.
fn read_tag(e: &BytesStart<'_>, line: usize) -> Result<(String, Vec<(String, String)>)> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| Error::Tokenizer {
            message: format!("Attribute error: {}", err),
            line: Some(line),
        })?;

        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|err| Error::Tokenizer {
            message: format!("Invalid attribute value: {}", err),
            line: Some(line),
        })?;

        attributes.push((key, value.into_owned()));
    }

    Ok((name, attributes))
}
