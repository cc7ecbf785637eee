//! Configuration documents
//!
//! A document is a tree of elements with string attributes. Any parser that can
//! produce [`ConfigElement`]s drives [`apply`]; [`ConfigNode`] is the owned
//! implementation read from JSON by [`load`].
//!
//! ```json
//! {
//!   "tag": "logging",
//!   "attributes": { "pad_multi_line_messages": true },
//!   "children": [
//!     {
//!       "tag": "domain",
//!       "attributes": { "name": ".net", "max_level": "warning", "prints_name": true },
//!       "children": [
//!         { "tag": "sink", "children": [
//!           { "tag": "stream", "attributes": { "id": "stderr" } },
//!           { "tag": "file" }
//!         ] },
//!         { "tag": "domain", "attributes": { "name": "tcp", "max_level": "debug" } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Settings are applied as they are read. A failing element stops the load
//! but leaves earlier settings in place; a domain's sink list is only replaced
//! when every sink of that domain could be built.

use super::configuration::DomainFlag;
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::registry::{Domain, DomainRegistry};
use super::sink::Sink;
use crate::sinks::create_sink;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Element of a parsed configuration document
pub trait ConfigElement {
    fn tag(&self) -> &str;
    fn attribute(&self, key: &str) -> Option<&str>;
    fn attribute_names(&self) -> Vec<&str>;
    fn children(&self) -> Vec<&Self>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigNode {
    pub tag: String,
    #[serde(
        default,
        deserialize_with = "scalar_attributes",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ConfigNode) -> Self {
        self.children.push(child);
        self
    }
}

impl ConfigElement for ConfigNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }

    fn children(&self) -> Vec<&Self> {
        self.children.iter().collect()
    }
}

/// Accept booleans and numbers as attribute values next to strings
fn scalar_attributes<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(text) => text,
                serde_json::Value::Bool(flag) => flag.to_string(),
                serde_json::Value::Number(number) => number.to_string(),
                other => {
                    return Err(D::Error::custom(format!(
                        "attribute '{}' must be a scalar, got {}",
                        key, other
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}

/// Parse a boolean attribute value
pub fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(LoggerError::config(
            format!("attribute '{}'", key),
            format!("'{}' is not a boolean", value),
        )),
    }
}

fn flag_for_attribute(key: &str) -> Option<DomainFlag> {
    DomainFlag::ALL
        .into_iter()
        .find(|flag| flag.attribute_name() == key)
}

/// Apply a parsed document to `registry`, reporting failures on stderr
pub fn apply<E: ConfigElement>(registry: &DomainRegistry, root: &E) -> Result<()> {
    report(apply_root(registry, root))
}

/// Read a JSON document from `path` and apply it
pub fn load(registry: &DomainRegistry, path: &Path) -> Result<()> {
    report(read_document(path).and_then(|document| apply_root(registry, &document)))
}

pub fn read_document(path: &Path) -> Result<ConfigNode> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        LoggerError::io_operation(
            "reading configuration",
            format!("cannot read '{}'", path.display()),
            e,
        )
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn report(result: Result<()>) -> Result<()> {
    if let Err(ref e) = result {
        eprintln!("[DOMAIN LOGGER ERROR] Configuration failed: {}", e);
    }
    result
}

fn apply_root<E: ConfigElement>(registry: &DomainRegistry, root: &E) -> Result<()> {
    for key in root.attribute_names() {
        let value = root.attribute(key).unwrap_or_default();
        match key {
            "pad_prefix_columns" => registry.set_pad_prefix_columns(parse_bool(key, value)?),
            "pad_multi_line_messages" => {
                registry.set_pad_multi_line_messages(parse_bool(key, value)?)
            }
            _ => {
                return Err(LoggerError::config(
                    format!("element '{}'", root.tag()),
                    format!("unknown attribute '{}'", key),
                ))
            }
        }
    }

    for child in root.children() {
        match child.tag() {
            "domain" => apply_domain(registry.root(), child)?,
            other => {
                return Err(LoggerError::config(
                    format!("element '{}'", root.tag()),
                    format!("unexpected child element '{}'", other),
                ))
            }
        }
    }
    Ok(())
}

fn apply_domain<E: ConfigElement>(parent: Domain<'_>, element: &E) -> Result<()> {
    let name = element.attribute("name").ok_or_else(|| {
        LoggerError::config("element 'domain'", "missing attribute 'name'")
    })?;
    let domain = if name.starts_with('.') {
        parent.registry().domain(name)?
    } else {
        parent.child(name)?
    };

    for key in element.attribute_names() {
        let value = element.attribute(key).unwrap_or_default();
        if key == "name" {
            continue;
        }
        if key == "max_level" {
            let level: LogLevel = value.parse().map_err(|e: String| {
                LoggerError::config(format!("domain '{}'", name), e)
            })?;
            domain.set_max_level(level);
        } else if let Some(flag) = flag_for_attribute(key) {
            domain.set_flag(flag, parse_bool(key, value)?);
        } else {
            return Err(LoggerError::config(
                format!("domain '{}'", name),
                format!("unknown attribute '{}'", key),
            ));
        }
    }

    let children = element.children();
    let sink_elements: Vec<&E> = children
        .iter()
        .copied()
        .filter(|child| child.tag() == "sink")
        .collect();
    if !sink_elements.is_empty() {
        let full_name = domain.full_name();
        let mut sinks: Vec<Arc<dyn Sink>> = Vec::new();
        for sink_element in sink_elements {
            for sink in sink_element.children() {
                sinks.push(create_sink(sink, &full_name)?);
            }
        }
        domain.set_sinks(sinks);
    }

    for child in children {
        match child.tag() {
            "sink" => {}
            "domain" => apply_domain(domain, child)?,
            other => {
                return Err(LoggerError::config(
                    format!("domain '{}'", name),
                    format!("unexpected child element '{}'", other),
                ))
            }
        }
    }
    Ok(())
}
