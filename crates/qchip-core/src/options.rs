//! Declarative option tables.
//!
//! Components publish their defaults as an [`Options`] table; users override
//! individual entries. Values stay as written (usually unit strings) until a
//! build pass reads them through the typed accessors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::layer::LayerId;
use crate::units::{parse_angle, Variables};

/// Key holding the per-coupler sub-tables of a qubit.
pub const CONNECTION_PADS: &str = "connection_pads";
/// Key holding the defaults merged under every connection pad.
pub const DEFAULT_CONNECTION_PADS: &str = "_default_connection_pads";

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Number(f64),
    Text(String),
    Table(Options),
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Flag(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Number(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

impl From<Options> for OptionValue {
    fn from(v: Options) -> Self {
        OptionValue::Table(v)
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Flag(v) => write!(f, "{v}"),
            OptionValue::Number(v) => write!(f, "{v}"),
            OptionValue::Text(v) => f.write_str(v),
            OptionValue::Table(_) => f.write_str("<table>"),
        }
    }
}

/// An ordered, nestable table of named option values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, OptionValue>);

impl Options {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deep-merge `overrides` on top of `self`. Nested tables merge key by key;
    /// every other value is replaced.
    pub fn merge(&mut self, overrides: &Options) {
        for (key, value) in &overrides.0 {
            if let OptionValue::Table(over) = value {
                if let Some(OptionValue::Table(base)) = self.0.get_mut(key) {
                    base.merge(over);
                    continue;
                }
            }
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn merged(&self, overrides: &Options) -> Options {
        let mut out = self.clone();
        out.merge(overrides);
        out
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn require(&self, key: &str) -> Result<&OptionValue> {
        self.get(key).ok_or_else(|| CoreError::missing_option(key))
    }

    /// A length in millimetres. Numbers are taken as millimetres; strings go
    /// through unit and variable resolution.
    pub fn length(&self, key: &str, variables: &Variables) -> Result<f64> {
        match self.require(key)? {
            OptionValue::Number(v) => Ok(*v),
            OptionValue::Text(text) => variables.resolve_length(text).map_err(|err| match err {
                CoreError::InvalidOption { value, reason, .. } => {
                    CoreError::invalid_option(key, value, reason)
                }
                other => other,
            }),
            other => Err(CoreError::invalid_option(key, other.to_string(), "expected a length")),
        }
    }

    /// An angle in degrees.
    pub fn angle(&self, key: &str) -> Result<f64> {
        match self.require(key)? {
            OptionValue::Number(v) => Ok(*v),
            OptionValue::Text(text) => parse_angle(text)
                .map_err(|_| CoreError::invalid_option(key, text.as_str(), "expected an angle")),
            other => Err(CoreError::invalid_option(key, other.to_string(), "expected an angle")),
        }
    }

    /// A boolean flag. Accepts `true`/`false` as booleans or strings.
    pub fn flag(&self, key: &str) -> Result<bool> {
        match self.require(key)? {
            OptionValue::Flag(v) => Ok(*v),
            OptionValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(CoreError::invalid_option(key, text.as_str(), "expected a flag")),
            },
            other => Err(CoreError::invalid_option(key, other.to_string(), "expected a flag")),
        }
    }

    pub fn layer(&self, key: &str) -> Result<LayerId> {
        let invalid = |value: String| CoreError::invalid_option(key, value, "expected a layer number");
        match self.require(key)? {
            OptionValue::Number(v) if *v >= 0.0 && v.fract() == 0.0 => Ok(*v as LayerId),
            OptionValue::Text(text) => text.trim().parse().map_err(|_| invalid(text.clone())),
            other => Err(invalid(other.to_string())),
        }
    }

    pub fn text(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            OptionValue::Text(text) => Ok(text.as_str()),
            other => Err(CoreError::invalid_option(key, other.to_string(), "expected text")),
        }
    }

    pub fn table(&self, key: &str) -> Result<&Options> {
        match self.require(key)? {
            OptionValue::Table(table) => Ok(table),
            other => Err(CoreError::invalid_option(key, other.to_string(), "expected a table")),
        }
    }

    /// Each named connection pad with the pad defaults merged underneath.
    /// A missing `connection_pads` table means no pads.
    pub fn connection_pads(&self) -> Result<Vec<(String, Options)>> {
        let pads = match self.get(CONNECTION_PADS) {
            None => return Ok(Vec::new()),
            Some(_) => self.table(CONNECTION_PADS)?,
        };
        let defaults = match self.get(DEFAULT_CONNECTION_PADS) {
            None => Options::new(),
            Some(_) => self.table(DEFAULT_CONNECTION_PADS)?.clone(),
        };
        pads.0
            .iter()
            .map(|(name, value)| match value {
                OptionValue::Table(pad) => Ok((name.clone(), defaults.merged(pad))),
                other => Err(CoreError::invalid_option(
                    format!("{CONNECTION_PADS}.{name}"),
                    other.to_string(),
                    "expected a table",
                )),
            })
            .collect()
    }
}
