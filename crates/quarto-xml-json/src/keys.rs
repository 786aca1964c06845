//! Reserved keys used by the JSON form of the structured tree.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reserved keys that carry XML semantics inside a JSON object.
///
/// Every key must contain at least one character that can't appear in an XML
/// name, which keeps them disjoint from element and attribute names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservedKeys {
    /// Object holding the element's attributes.
    pub attributes: String,
    /// Concatenated text content.
    pub text: String,
    /// Position of the element among its parent's children.
    pub order: String,
    /// Parent-side order counter. Never present in finished output.
    pub order_counter: String,
    /// Element name. Never present in finished output.
    pub name: String,
    /// Source line of the start tag.
    pub line: String,
}

impl Default for ReservedKeys {
    fn default() -> Self {
        Self {
            attributes: "$".to_string(),
            text: "#text".to_string(),
            order: "%".to_string(),
            order_counter: "&".to_string(),
            name: "#name".to_string(),
            line: "#l".to_string(),
        }
    }
}

impl ReservedKeys {
    fn all(&self) -> [(&'static str, &str); 6] {
        [
            ("attributes", self.attributes.as_str()),
            ("text", self.text.as_str()),
            ("order", self.order.as_str()),
            ("order_counter", self.order_counter.as_str()),
            ("name", self.name.as_str()),
            ("line", self.line.as_str()),
        ]
    }

    /// Check that no key could be mistaken for an XML name and that no two keys are equal.
    pub fn validate(&self) -> Result<()> {
        let all = self.all();
        for (i, (field, key)) in all.iter().enumerate() {
            if key.is_empty() {
                return Err(Error::InvalidKeys {
                    message: format!("'{}' key is empty", field),
                });
            }
            if key.chars().all(is_name_char) {
                return Err(Error::InvalidKeys {
                    message: format!(
                        "'{}' key '{}' is a valid XML name and could collide with markup",
                        field, key
                    ),
                });
            }
            if let Some((other, _)) = all[..i].iter().find(|(_, k)| k == key) {
                return Err(Error::InvalidKeys {
                    message: format!("'{}' and '{}' both use '{}'", other, field, key),
                });
            }
        }
        Ok(())
    }
}

/// Whether `name` is a well-formed XML name.
pub(crate) fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_char(first) && !matches!(first, '-' | '.' | '0'..='9' | '\u{B7}') => {
            chars.all(is_name_char)
        }
        _ => false,
    }
}

/// Characters allowed anywhere in an XML name (XML 1.0, 5th edition, NameChar).
fn is_name_char(c: char) -> bool {
    matches!(c,
        ':' | '_' | '-' | '.' | 'A'..='Z' | 'a'..='z' | '0'..='9'
        | '\u{B7}'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{203F}'..='\u{2040}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys_are_valid() {
        ReservedKeys::default().validate().unwrap();
    }

    #[test]
    fn test_name_like_key_rejected() {
        let keys = ReservedKeys {
            text: "_".to_string(),
            ..Default::default()
        };
        let err = keys.validate().unwrap_err();
        assert!(err.to_string().contains("'text' key '_'"), "Got: {}", err);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let keys = ReservedKeys {
            line: "$".to_string(),
            ..Default::default()
        };
        let err = keys.validate().unwrap_err();
        assert!(
            err.to_string().contains("'attributes' and 'line' both use '$'"),
            "Got: {}",
            err
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        let keys = ReservedKeys {
            order: String::new(),
            ..Default::default()
        };
        assert!(keys.validate().is_err());
    }

    #[test]
    fn test_is_xml_name() {
        assert!(is_xml_name("score-partwise"));
        assert!(is_xml_name("_private"));
        assert!(is_xml_name("xlink:href"));
        assert!(!is_xml_name(""));
        assert!(!is_xml_name("1st"));
        assert!(!is_xml_name("-dash"));
        assert!(!is_xml_name("has space"));
        assert!(!is_xml_name("$"));
    }
}
