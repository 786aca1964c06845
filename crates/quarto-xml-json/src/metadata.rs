//! Extraction of the XML declaration and DOCTYPE from raw document text.
//!
//! This is plain pattern matching over the source and never looks at the
//! element tree. The extracted values travel with the decoded
//! [`Document`](crate::Document) so the encoder can write the same prolog back.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

static DECLARATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<\?xml ([a-z0-9=.\-\s"'/:]+)\?>"#).unwrap());
static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)version=["']([0-9.]+)["']"#).unwrap());
static ENCODING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)encoding=["']([a-z0-9\-]+)["']"#).unwrap());
static STANDALONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)standalone=["']([a-z0-9\-]+)["']"#).unwrap());

static DOCTYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<!DOCTYPE ([a-z0-9.\-\s"'/:]+)>"#).unwrap());
static ROOT_TYPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[a-z\-]+").unwrap());
static PUBLIC_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)["'](-[a-z0-9\s/.]+)["']"#).unwrap());
static SYSTEM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)["']([a-z0-9:/.]+)["']"#).unwrap());

/// Fields of the leading `<?xml ...?>` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Declaration {
    pub version: String,
    pub encoding: String,
    pub standalone: bool,
}

/// Fields of the `<!DOCTYPE root PUBLIC "..." "...">` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Doctype {
    pub root_type_name: String,
    pub public_id: String,
    pub system_id: String,
}

/// Everything outside the root element that is needed to write a document back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub declaration: Declaration,
    pub doctype: Doctype,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: "UTF-8".to_string(),
            standalone: false,
        }
    }
}

/// Defaults to the MusicXML 2.0 partwise DTD.
impl Default for Doctype {
    fn default() -> Self {
        Self {
            root_type_name: "score-partwise".to_string(),
            public_id: "-//Recordare//DTD MusicXML 2.0 Partwise//EN".to_string(),
            system_id: "http://www.musicxml.org/dtds/partwise.dtd".to_string(),
        }
    }
}

/// Extract both the declaration and the doctype from `source`.
///
/// The declaration is checked first, so a document missing both reports
/// [`Error::InvalidDeclaration`].
pub fn extract_metadata(source: &str) -> Result<Metadata> {
    let declaration = extract_declaration(source)?;
    let doctype = extract_doctype(source)?;
    Ok(Metadata {
        declaration,
        doctype,
    })
}

/// Extract the `<?xml ...?>` declaration.
///
/// `version` and `encoding` are required. `standalone` is optional; it is
/// false when absent or exactly `no`, and true for any other value.
pub fn extract_declaration(source: &str) -> Result<Declaration> {
    let body = DECLARATION_RE
        .captures(source)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| Error::declaration("no <?xml ...?> declaration found"))?
        .as_str();

    let version = first_group(&VERSION_RE, body).ok_or_else(|| Error::declaration("missing version"))?;
    let encoding =
        first_group(&ENCODING_RE, body).ok_or_else(|| Error::declaration("missing encoding"))?;
    let standalone = first_group(&STANDALONE_RE, body).is_some_and(|value| value != "no");

    Ok(Declaration {
        version: version.to_string(),
        encoding: encoding.to_string(),
        standalone,
    })
}

/// Extract the `<!DOCTYPE ...>` root type name, public id and system id.
pub fn extract_doctype(source: &str) -> Result<Doctype> {
    let body = DOCTYPE_RE
        .captures(source)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| Error::doctype("no <!DOCTYPE ...> declaration found"))?
        .as_str();

    let root_type_name = ROOT_TYPE_RE
        .find(body)
        .ok_or_else(|| Error::doctype("missing root element name"))?
        .as_str();
    let public_id =
        first_group(&PUBLIC_ID_RE, body).ok_or_else(|| Error::doctype("missing public identifier"))?;
    let system_id =
        first_group(&SYSTEM_ID_RE, body).ok_or_else(|| Error::doctype("missing system identifier"))?;

    Ok(Doctype {
        root_type_name: root_type_name.to_string(),
        public_id: public_id.to_string(),
        system_id: system_id.to_string(),
    })
}

fn first_group<'h>(re: &Regex, haystack: &'h str) -> Option<&'h str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTWISE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="3.1"/>"#;

    #[test]
    fn test_extract_partwise() {
        let metadata = extract_metadata(PARTWISE).unwrap();
        assert_eq!(metadata.declaration.version, "1.0");
        assert_eq!(metadata.declaration.encoding, "UTF-8");
        assert!(!metadata.declaration.standalone);
        assert_eq!(metadata.doctype.root_type_name, "score-partwise");
        assert_eq!(
            metadata.doctype.public_id,
            "-//Recordare//DTD MusicXML 3.1 Partwise//EN"
        );
        assert_eq!(
            metadata.doctype.system_id,
            "http://www.musicxml.org/dtds/partwise.dtd"
        );
    }

    #[test]
    fn test_single_quotes() {
        let decl = extract_declaration("<?xml version='1.1' encoding='ISO-8859-1'?>").unwrap();
        assert_eq!(decl.version, "1.1");
        assert_eq!(decl.encoding, "ISO-8859-1");
    }

    #[test]
    fn test_standalone_values() {
        let absent = extract_declaration(r#"<?xml version="1.0" encoding="UTF-8"?>"#).unwrap();
        assert!(!absent.standalone);

        let yes =
            extract_declaration(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#)
                .unwrap();
        assert!(yes.standalone);

        // Anything other than exactly "no" counts as true.
        let upper =
            extract_declaration(r#"<?xml version="1.0" encoding="UTF-8" standalone="NO"?>"#)
                .unwrap();
        assert!(upper.standalone);
    }

    #[test]
    fn test_missing_declaration() {
        let err = extract_declaration("<root/>").unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration { .. }));
    }

    #[test]
    fn test_missing_version() {
        let err = extract_declaration(r#"<?xml encoding="UTF-8"?>"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid XML declaration: missing version");
    }

    #[test]
    fn test_missing_encoding() {
        let err = extract_declaration(r#"<?xml version="1.0"?>"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid XML declaration: missing encoding");
    }

    #[test]
    fn test_missing_doctype() {
        let err = extract_metadata(r#"<?xml version="1.0" encoding="UTF-8"?><a/>"#).unwrap_err();
        assert!(matches!(err, Error::InvalidDoctype { .. }));
    }

    #[test]
    fn test_doctype_without_public_id() {
        let err =
            extract_doctype(r#"<!DOCTYPE score-partwise SYSTEM "partwise.dtd">"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid DOCTYPE: missing public identifier"
        );
    }

    #[test]
    fn test_declaration_checked_before_doctype() {
        let err = extract_metadata("<a/>").unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration { .. }));
    }

    #[test]
    fn test_defaults() {
        let metadata = Metadata::default();
        assert_eq!(metadata.declaration.version, "1.0");
        assert_eq!(metadata.doctype.root_type_name, "score-partwise");
    }
}
