//! Length and angle parsing for option strings.
//!
//! Lengths resolve to millimetres. A value is either a number with an optional
//! unit suffix (`"125um"`, `"1 mm"`, `"0.2"`) or the name of a design variable
//! (`"cpw_width"`) whose own value is resolved the same way.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Unit assumed when a length carries no suffix.
pub const DEFAULT_LENGTH_UNIT: &str = "mm";

const MAX_VARIABLE_DEPTH: usize = 16;

/// Millimetres per unit, or `None` for an unsupported unit.
pub fn length_scale(unit: &str) -> Option<f64> {
    match unit {
        "" | "mm" => Some(1.0),
        "um" | "µm" => Some(1e-3),
        "nm" => Some(1e-6),
        "cm" => Some(10.0),
        "m" => Some(1e3),
        "mil" => Some(0.0254),
        _ => None,
    }
}

/// Named design-wide lengths that option strings can reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The coplanar-waveguide defaults every design starts with.
    pub fn with_defaults() -> Self {
        let mut vars = Self::new();
        vars.set("cpw_width", "10 um");
        vars.set("cpw_gap", "6 um");
        vars
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Resolve a length string to millimetres.
    pub fn resolve_length(&self, text: &str) -> Result<f64> {
        self.resolve_length_at(text, text, 0)
    }

    fn resolve_length_at(&self, origin: &str, text: &str, depth: usize) -> Result<f64> {
        let text = text.trim();
        if let Some(value) = self.get(text) {
            if depth >= MAX_VARIABLE_DEPTH {
                return Err(CoreError::CyclicVariable(origin.to_string()));
            }
            return self.resolve_length_at(origin, value, depth + 1);
        }
        match split_quantity(text) {
            Some((number, unit)) => {
                let scale = length_scale(unit).ok_or_else(|| {
                    CoreError::invalid_option(origin, text, format!("unsupported unit '{unit}'"))
                })?;
                Ok(number * scale)
            }
            None if is_identifier(text) => Err(CoreError::UnknownVariable(text.to_string())),
            None => Err(CoreError::invalid_option(origin, text, "not a length")),
        }
    }
}

/// Parse an angle in degrees. Accepts a bare number, a `deg` suffix, or a
/// `rad` suffix which is converted to degrees.
pub fn parse_angle(text: &str) -> Result<f64> {
    let text = text.trim();
    let (number, unit) = split_quantity(text)
        .ok_or_else(|| CoreError::invalid_option(text, text, "not an angle"))?;
    match unit {
        "" | "deg" | "°" => Ok(number),
        "rad" => Ok(number.to_degrees()),
        other => Err(CoreError::invalid_option(
            text,
            text,
            format!("unsupported angle unit '{other}'"),
        )),
    }
}

/// Split `"12.5 um"` into `(12.5, "um")`. Returns `None` when the text does not
/// start with a finite number.
fn split_quantity(text: &str) -> Option<(f64, &str)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut end = text.len();
    for (i, &(idx, c)) in chars.iter().enumerate() {
        let numeric = c.is_ascii_digit() || matches!(c, '.' | '+' | '-');
        let exponent = matches!(c, 'e' | 'E')
            && i > 0
            && chars
                .get(i + 1)
                .is_some_and(|&(_, n)| n.is_ascii_digit() || n == '+' || n == '-');
        if !(numeric || exponent) {
            end = idx;
            break;
        }
    }
    let number: f64 = text[..end].trim().parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    Some((number, text[end..].trim()))
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
