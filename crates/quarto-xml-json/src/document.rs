//! Document-level decode and encode.
//!
//! [`Decoder`] and [`Encoder`] each handle exactly one document. Create a new
//! one per run; a used instance refuses to start again.

use crate::emitter::emit_document;
use crate::metadata::{Metadata, extract_metadata};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::parser::parse_tree;
use crate::{Document, Error, Result};

/// Progress of a [`Decoder`] or [`Encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, not started.
    Idle,
    /// Reading the declaration and doctype.
    Extracting,
    /// Building the element tree.
    Building,
    /// Writing XML.
    Emitting,
    /// Finished with a result.
    Done,
    /// Stopped at the first error. No result was produced.
    Failed,
}

/// Decodes one XML document into a [`Document`].
#[derive(Debug)]
pub struct Decoder {
    options: DecodeOptions,
    phase: Phase,
}

impl Decoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Decode `source`: extract the prolog, then build the element tree.
    ///
    /// # Errors
    ///
    /// Fails with the first error from metadata extraction or tree building, or
    /// with [`Error::Structure`] if this decoder was already used.
    pub fn decode(&mut self, source: &str) -> Result<Document> {
        if self.phase != Phase::Idle {
            return Err(Error::structure(
                "decoder already used; create a new one for each document",
            ));
        }

        let result = self.run(source);
        match &result {
            Ok(document) => {
                tracing::debug!(root = %document.root_name, "decoded document");
                self.enter(Phase::Done);
            }
            Err(err) => {
                tracing::debug!(code = err.code(), error = %err, "decode failed");
                self.enter(Phase::Failed);
            }
        }
        result
    }

    fn run(&mut self, source: &str) -> Result<Document> {
        self.enter(Phase::Extracting);
        let metadata = extract_metadata(source)?;

        self.enter(Phase::Building);
        let (root_name, root) = parse_tree(source, self.options.preserve_order)?;

        Ok(Document::new(metadata, root_name, root))
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "decoder phase");
        self.phase = phase;
    }
}

/// Encodes one [`Document`] as XML text.
#[derive(Debug)]
pub struct Encoder {
    options: EncodeOptions,
    phase: Phase,
}

impl Encoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            options,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Write `document` with its declaration and doctype.
    pub fn encode(&mut self, document: &Document) -> Result<String> {
        self.start()?;
        let result = emit_document(document, &self.options);
        self.complete(result)
    }

    /// Write a `{root_name: root}` JSON tree, using `metadata` for the prolog.
    pub fn encode_json(&mut self, value: &serde_json::Value, metadata: &Metadata) -> Result<String> {
        self.start()?;
        let result = self
            .options
            .keys
            .validate()
            .and_then(|()| Document::from_json(value, metadata.clone(), &self.options.keys))
            .and_then(|document| emit_document(&document, &self.options));
        self.complete(result)
    }

    fn start(&mut self) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(Error::structure(
                "encoder already used; create a new one for each document",
            ));
        }
        self.enter(Phase::Emitting);
        Ok(())
    }

    fn complete(&mut self, result: Result<String>) -> Result<String> {
        match &result {
            Ok(xml) => {
                tracing::debug!(bytes = xml.len(), "encoded document");
                self.enter(Phase::Done);
            }
            Err(err) => {
                tracing::debug!(code = err.code(), error = %err, "encode failed");
                self.enter(Phase::Failed);
            }
        }
        result
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "encoder phase");
        self.phase = phase;
    }
}

/// Decode an XML document.
///
/// # Example
///
/// ```rust
/// use quarto_xml_json::{decode, DecodeOptions};
///
/// let source = r#"<?xml version="1.0" encoding="UTF-8"?>
/// <!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
/// <score-partwise version="3.1"><part id="P1"/></score-partwise>"#;
///
/// let document = decode(source, &DecodeOptions::default()).unwrap();
/// assert_eq!(document.root_name, "score-partwise");
/// assert_eq!(document.root.get_children("part")[0].get_attribute("id"), Some("P1"));
/// assert_eq!(document.metadata.declaration.version, "1.0");
/// ```
pub fn decode(source: &str, options: &DecodeOptions) -> Result<Document> {
    Decoder::new(options.clone()).decode(source)
}

/// Encode a document as XML text.
pub fn encode(document: &Document, options: &EncodeOptions) -> Result<String> {
    Encoder::new(options.clone()).encode(document)
}

/// Decode an XML document straight to its `{root_name: root}` JSON form.
pub fn decode_to_json(source: &str, options: &DecodeOptions) -> Result<serde_json::Value> {
    options.keys.validate()?;
    let document = decode(source, options)?;
    Ok(document.to_json(&options.keys))
}

/// Encode a `{root_name: root}` JSON tree as XML text.
///
/// Pass [`Metadata::default()`] to write the default declaration and doctype.
pub fn encode_json(
    value: &serde_json::Value,
    metadata: &Metadata,
    options: &EncodeOptions,
) -> Result<String> {
    Encoder::new(options.clone()).encode_json(value, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise><part id="P1"/></score-partwise>"#;

    #[test]
    fn test_decoder_phases() {
        let mut decoder = Decoder::new(DecodeOptions::default());
        assert_eq!(decoder.phase(), Phase::Idle);
        decoder.decode(SOURCE).unwrap();
        assert_eq!(decoder.phase(), Phase::Done);
    }

    #[test]
    fn test_decoder_is_single_use() {
        let mut decoder = Decoder::new(DecodeOptions::default());
        decoder.decode(SOURCE).unwrap();
        let err = decoder.decode(SOURCE).unwrap_err();
        assert!(matches!(err, Error::Structure { .. }));
        assert_eq!(decoder.phase(), Phase::Done);
    }

    #[test]
    fn test_decoder_fails_on_metadata() {
        let mut decoder = Decoder::new(DecodeOptions::default());
        let err = decoder.decode("<score-partwise/>").unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration { .. }));
        assert_eq!(decoder.phase(), Phase::Failed);
    }

    #[test]
    fn test_failed_decoder_stays_failed() {
        let mut decoder = Decoder::new(DecodeOptions::default());
        decoder.decode("<a/>").unwrap_err();
        assert!(decoder.decode(SOURCE).is_err());
        assert_eq!(decoder.phase(), Phase::Failed);
    }

    #[test]
    fn test_encoder_is_single_use() {
        let document = decode(SOURCE, &DecodeOptions::default()).unwrap();
        let mut encoder = Encoder::new(EncodeOptions::default());
        encoder.encode(&document).unwrap();
        assert_eq!(encoder.phase(), Phase::Done);
        assert!(encoder.encode(&document).is_err());
    }

    #[test]
    fn test_encode_json_with_invalid_keys_fails() {
        let options = EncodeOptions::default().with_keys(crate::ReservedKeys {
            text: "text".to_string(),
            ..Default::default()
        });
        let mut encoder = Encoder::new(options);
        let err = encoder
            .encode_json(&serde_json::json!({"a": {}}), &Metadata::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKeys { .. }));
        assert_eq!(encoder.phase(), Phase::Failed);
    }
}
