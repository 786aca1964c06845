//! Conversion between the typed tree and its JSON form.
//!
//! In JSON an element is an object. Attributes, text, order index and line
//! live under the [`ReservedKeys`]; every other key is a child element. A
//! child is an object, an array of objects (same-named siblings) or a
//! primitive (a text-only element).

use serde_json::{Map, Number};

use crate::metadata::Metadata;
use crate::{Document, Error, Node, ReservedKeys, Result, Scalar, Value};

impl Node {
    /// Convert to a JSON object using `keys` for the reserved entries.
    ///
    /// Child names are written as-is; a child name equal to a reserved key is
    /// not representable and is rejected when the tree is encoded to XML.
    pub fn to_json(&self, keys: &ReservedKeys) -> serde_json::Value {
        let mut map = Map::new();

        if !self.attributes.is_empty() {
            let attributes = self
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
                .collect();
            map.insert(keys.attributes.clone(), serde_json::Value::Object(attributes));
        }
        if let Some(text) = &self.text {
            map.insert(keys.text.clone(), serde_json::Value::String(text.clone()));
        }
        if let Some(line) = self.line {
            map.insert(keys.line.clone(), serde_json::Value::from(line));
        }

        for (name, value) in &self.children {
            let json = match value {
                Value::Scalar(scalar) => scalar.to_json(),
                Value::Node(node) => node.to_json(keys),
                Value::Sequence(nodes) => {
                    serde_json::Value::Array(nodes.iter().map(|n| n.to_json(keys)).collect())
                }
            };
            map.insert(name.clone(), json);
        }

        if let Some(order) = self.order {
            map.insert(keys.order.clone(), serde_json::Value::from(order));
        }

        serde_json::Value::Object(map)
    }

    /// Build a node from a JSON object.
    ///
    /// The transient order-counter and element-name keys are ignored if present.
    pub fn from_json(value: &serde_json::Value, keys: &ReservedKeys) -> Result<Self> {
        let mut path = Vec::new();
        node_from_json(value, keys, &mut path)
    }
}

impl Scalar {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Text(text) => serde_json::Value::String(text.clone()),
            Scalar::Number(number) => serde_json::Value::Number(number.clone()),
            Scalar::Bool(value) => serde_json::Value::Bool(*value),
        }
    }
}

impl Document {
    /// The single-entry `{root_name: root}` JSON object.
    pub fn to_json(&self, keys: &ReservedKeys) -> serde_json::Value {
        let mut map = Map::new();
        map.insert(self.root_name.clone(), self.root.to_json(keys));
        serde_json::Value::Object(map)
    }

    /// Build a document from a `{root_name: root}` JSON object and the metadata to write with it.
    pub fn from_json(
        value: &serde_json::Value,
        metadata: Metadata,
        keys: &ReservedKeys,
    ) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::invalid_value(&[], "expected an object holding the root element"))?;

        let mut entries = object.iter();
        let (root_name, root) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(Error::invalid_value(
                    &[],
                    format!(
                        "expected exactly one root element, found {} keys",
                        object.len()
                    ),
                ));
            }
        };

        // A primitive root is a text-only element.
        let root = match primitive_string(root) {
            Some(text) => Node::new().with_text(text),
            None => node_from_json(root, keys, &mut vec![root_name.as_str()])?,
        };
        Ok(Document::new(metadata, root_name.clone(), root))
    }
}

fn node_from_json<'a>(
    value: &'a serde_json::Value,
    keys: &ReservedKeys,
    path: &mut Vec<&'a str>,
) -> Result<Node> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::invalid_value(path, format!("expected an object, found {}", kind(value))))?;

    let mut node = Node::new();
    for (key, value) in object {
        if *key == keys.attributes {
            let attributes = value.as_object().ok_or_else(|| {
                Error::invalid_value(path, format!("'{}' must be an object", key))
            })?;
            for (name, value) in attributes {
                let value = primitive_string(value).ok_or_else(|| {
                    Error::invalid_value(
                        path,
                        format!("attribute '{}' must be a string, number or boolean", name),
                    )
                })?;
                node.attributes.insert(name.clone(), value);
            }
        } else if *key == keys.text {
            let text = primitive_string(value).ok_or_else(|| {
                Error::invalid_value(path, format!("'{}' must be a string", key))
            })?;
            node.text = Some(text);
        } else if *key == keys.order {
            node.order = Some(order_index(value).ok_or_else(|| {
                Error::invalid_value(path, format!("'{}' must be a positive integer", key))
            })?);
        } else if *key == keys.line {
            let line = value.as_u64().and_then(|l| usize::try_from(l).ok());
            node.line = Some(line.ok_or_else(|| {
                Error::invalid_value(path, format!("'{}' must be a positive integer", key))
            })?);
        } else if *key == keys.order_counter || *key == keys.name {
            continue;
        } else {
            path.push(key.as_str());
            let child = value_from_json(value, keys, path)?;
            path.pop();
            node.children.insert(key.clone(), child);
        }
    }
    Ok(node)
}

fn value_from_json<'a>(
    value: &'a serde_json::Value,
    keys: &ReservedKeys,
    path: &mut Vec<&'a str>,
) -> Result<Value> {
    match value {
        serde_json::Value::Object(_) => Ok(Value::Node(node_from_json(value, keys, path)?)),
        serde_json::Value::Array(items) => {
            let nodes = items
                .iter()
                .map(|item| node_from_json(item, keys, path))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Sequence(nodes))
        }
        serde_json::Value::String(text) => Ok(Value::Scalar(Scalar::Text(text.clone()))),
        serde_json::Value::Number(number) => Ok(Value::Scalar(Scalar::Number(number.clone()))),
        serde_json::Value::Bool(flag) => Ok(Value::Scalar(Scalar::Bool(*flag))),
        serde_json::Value::Null => Err(Error::invalid_value(path, "null has no XML form")),
    }
}

fn primitive_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}

/// Order indices are numbers, but numeric strings are accepted for hand-written input.
fn order_index(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(number) => number.as_u64().or_else(|| float_index(number)),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn float_index(number: &Number) -> Option<u64> {
    number
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
        .map(|f| f as u64)
}

fn kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
