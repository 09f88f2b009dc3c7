//! Best-effort extraction of metadata embedded in inline scripts
//!
//! Pages often assign product data to JavaScript variables. A
//! [`SidebandPattern`] is compiled once, when its adapter is built, and then
//! matched against raw page text. A missing or malformed assignment is an
//! ordinary empty result, never an error.

use super::{ParsingError, ParsingResult};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Compiled matcher for one variable assignment
#[derive(Debug, Clone)]
pub struct SidebandPattern {
    variable: String,
    regex: Regex,
}

impl SidebandPattern {
    /// `var <variable> = {...};`
    ///
    /// Matches the first assignment and stops at the first `};`, so objects
    /// whose own text contains `};` are cut short and fall back to `{}`.
    pub fn script_object(variable: &str) -> ParsingResult<Self> {
        let pattern = format!(r"var\s+{}\s*=\s*(\{{.*?\}});", regex::escape(variable));
        Self::compile(variable, &pattern)
    }

    /// `<variable> = '<value>';`
    pub fn string_assignment(variable: &str) -> ParsingResult<Self> {
        let pattern = format!(r"{}\s*=\s*'([^']*)'\s*;", regex::escape(variable));
        Self::compile(variable, &pattern)
    }

    fn compile(variable: &str, pattern: &str) -> ParsingResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| ParsingError::invalid_selector(pattern, e))?;
        Ok(Self {
            variable: variable.to_string(),
            regex,
        })
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    fn first_capture<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.regex
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }
}

/// The object assigned by a `script_object` pattern, or `{}` when absent or malformed.
pub fn script_json(page: &str, pattern: &SidebandPattern) -> Value {
    let variable = pattern.variable();
    let Some(raw) = pattern.first_capture(page) else {
        debug!("No inline assignment found for var {}", variable);
        return empty_object();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            warn!("Inline var {} is not a JSON object, ignoring it", variable);
            empty_object()
        }
        Err(e) => {
            warn!("Inline var {} is not valid JSON, ignoring it: {}", variable, e);
            empty_object()
        }
    }
}

/// The quoted value matched by a `string_assignment` pattern, if present.
pub fn inline_string_assignment(page: &str, pattern: &SidebandPattern) -> Option<String> {
    let value = pattern.first_capture(page).map(ToString::to_string);
    if value.is_none() {
        debug!("No inline string assignment found for {}", pattern.variable());
    }
    value
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
