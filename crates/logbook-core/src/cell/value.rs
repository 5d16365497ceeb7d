//! Cell value types

use std::fmt;

/// Sentinel returned by soft lookups when no value is available
pub const NOT_AVAILABLE: &str = "n/a";

/// Represents the value stored in a logbook cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Boolean value
    Boolean(bool),

    /// Numeric value (integers are stored as f64 too)
    Number(f64),

    /// Text value
    Text(String),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// The `"n/a"` sentinel
    pub fn not_available() -> Self {
        CellValue::Text(NOT_AVAILABLE.to_string())
    }

    /// Interpret a raw cell string the way spreadsheet clients do.
    ///
    /// Blank strings become [`CellValue::Empty`], numeric strings become
    /// numbers and everything else is kept as text. Booleans are not
    /// detected, a cell reading `TRUE` stays text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }

        CellValue::Text(raw.to_string())
    }

    /// Check if the cell is empty
    ///
    /// Text holding only whitespace counts as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Check if this is the `"n/a"` sentinel
    pub fn is_not_available(&self) -> bool {
        matches!(self, CellValue::Text(s) if s == NOT_AVAILABLE)
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as an integer
    ///
    /// Numbers with a fractional part and text that is not an integer literal
    /// yield `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Some(*n as i64)
            }
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Boolean(_) => "boolean",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Result of reading one field from one row
///
/// Keeps "the column does not exist" apart from "the column exists but the
/// cell is blank", so callers decide how to treat each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    /// Non-empty value
    Value(&'a CellValue),
    /// Column exists, cell is blank
    Empty,
    /// Column or row does not exist
    Absent,
}

impl<'a> Field<'a> {
    /// Classify a cell reference
    pub fn of(value: Option<&'a CellValue>) -> Self {
        match value {
            Some(v) if v.is_empty() => Field::Empty,
            Some(v) => Field::Value(v),
            None => Field::Absent,
        }
    }

    /// The value, if present and non-empty
    pub fn value(&self) -> Option<&'a CellValue> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Check if the field holds a non-empty value
    pub fn is_set(&self) -> bool {
        matches!(self, Field::Value(_))
    }
}
