//! Attribute sources for emitter descriptions.
//!
//! An emitter description is a flat set of `element.attribute` pairs, e.g.
//! `speed.value` or `startColor.red`. The configuration model only needs a
//! lookup with a fallback; where the pairs come from is up to the caller.
//!
//! Two sources are provided:
//! - [`AttributeMap`]: an in-memory map for callers that already parsed
//!   their markup
//! - [`TomlAttributes`]: a TOML document with one table per element

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use pex_common::{ConfigError, ConfigResult};
use tracing::trace;

/// Name of the optional root table wrapping all elements.
pub const ROOT_ELEMENT: &str = "particleEmitterConfig";

/// A raw attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue<'a> {
    /// A typed number.
    Number(f64),
    /// Text to be parsed on demand.
    Text(&'a str),
}

impl AttributeValue<'_> {
    /// Interprets the value as a float.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Lookup of `element.attribute` pairs with per-call defaults.
///
/// A missing or unparseable attribute falls back to its default instead of
/// failing the whole load.
pub trait AttributeSource {
    /// Returns the raw value of `element.attribute`, if present.
    fn attribute(&self, element: &str, attribute: &str) -> Option<AttributeValue<'_>>;

    /// Reads a float attribute.
    fn get_f32(&self, element: &str, attribute: &str, default: f32) -> f32 {
        match self.attribute(element, attribute) {
            Some(value) => value.as_f64().map_or_else(
                || {
                    trace!("Unparseable {element}.{attribute}, using default {default}");
                    default
                },
                |v| v as f32,
            ),
            None => default,
        }
    }

    /// Reads an integer attribute. Fractional values are truncated.
    fn get_i32(&self, element: &str, attribute: &str, default: i32) -> i32 {
        match self.attribute(element, attribute) {
            Some(value) => value.as_f64().map_or_else(
                || {
                    trace!("Unparseable {element}.{attribute}, using default {default}");
                    default
                },
                |v| v as i32,
            ),
            None => default,
        }
    }

    /// Reads a text attribute. Numbers are formatted back to text.
    fn get_string(&self, element: &str, attribute: &str, default: &str) -> String {
        match self.attribute(element, attribute) {
            Some(AttributeValue::Text(s)) => s.to_string(),
            Some(AttributeValue::Number(n)) => n.to_string(),
            None => default.to_string(),
        }
    }
}

/// In-memory attribute source.
///
/// # Example
///
/// ```
/// use pex_kernel::attributes::{AttributeMap, AttributeSource};
///
/// let attrs = AttributeMap::new()
///     .with("maxParticles", "value", 200)
///     .with("texture", "name", "spark.png");
///
/// assert_eq!(attrs.get_i32("maxParticles", "value", 0), 200);
/// assert!((attrs.get_f32("speed", "value", 5.0) - 5.0).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    values: HashMap<(String, String), String>,
}

impl AttributeMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `element.attribute` and returns the map.
    #[must_use]
    pub fn with(mut self, element: &str, attribute: &str, value: impl ToString) -> Self {
        self.set(element, attribute, value);
        self
    }

    /// Sets `element.attribute`.
    pub fn set(&mut self, element: &str, attribute: &str, value: impl ToString) {
        self.values.insert(
            (element.to_string(), attribute.to_string()),
            value.to_string(),
        );
    }

    /// Removes `element.attribute`, returning the previous text.
    pub fn remove(&mut self, element: &str, attribute: &str) -> Option<String> {
        self.values
            .remove(&(element.to_string(), attribute.to_string()))
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no attributes are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl AttributeSource for AttributeMap {
    fn attribute(&self, element: &str, attribute: &str) -> Option<AttributeValue<'_>> {
        self.values
            .get(&(element.to_string(), attribute.to_string()))
            .map(|s| AttributeValue::Text(s.as_str()))
    }
}

/// TOML-backed attribute source.
///
/// Each element is a table and each attribute a key:
///
/// ```toml
/// [texture]
/// name = "circle.png"
///
/// [sourcePosition]
/// x = 160.0
/// y = 240.0
///
/// [maxParticles]
/// value = 500
/// ```
///
/// The elements may also be nested under a `[particleEmitterConfig]` table.
#[derive(Debug, Clone, PartialEq)]
pub struct TomlAttributes {
    root: toml::Table,
}

impl TomlAttributes {
    /// Parses a TOML document.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let mut root: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| ConfigError::MalformedSource(e.to_string()))?;

        if let Some(toml::Value::Table(inner)) = root.remove(ROOT_ELEMENT) {
            root = inner;
        }

        Ok(Self { root })
    }

    /// Reads and parses a TOML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Returns the names of all elements.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }
}

impl AttributeSource for TomlAttributes {
    fn attribute(&self, element: &str, attribute: &str) -> Option<AttributeValue<'_>> {
        let value = self.root.get(element)?.as_table()?.get(attribute)?;

        match value {
            toml::Value::Integer(i) => Some(AttributeValue::Number(*i as f64)),
            toml::Value::Float(f) => Some(AttributeValue::Number(*f)),
            toml::Value::Boolean(b) => Some(AttributeValue::Number(f64::from(u8::from(*b)))),
            toml::Value::String(s) => Some(AttributeValue::Text(s.as_str())),
            _ => None,
        }
    }
}
