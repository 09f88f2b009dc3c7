//! Queryable HTML tree over `scraper`
//!
//! `scraper::Html` is not `Send`, so a document must be built and dropped
//! between awaits; adapters parse inside synchronous helpers.

use super::config::FieldSelector;
use super::{ParsingError, ParsingResult};
use scraper::{Html, Selector};
use tracing::debug;

/// A `FieldSelector` with its CSS compiled once.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    field: FieldSelector,
    selector: Selector,
}

impl CompiledSelector {
    pub fn compile(field: &FieldSelector) -> ParsingResult<Self> {
        let selector = Selector::parse(&field.css)
            .map_err(|e| ParsingError::invalid_selector(&field.css, e))?;
        Ok(Self {
            field: field.clone(),
            selector,
        })
    }
}

/// Parsed HTML page
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// Every match in document order; empty when nothing matches.
    pub fn select(&self, selector: &CompiledSelector) -> Vec<String> {
        let values: Vec<String> = self
            .html
            .select(&selector.selector)
            .filter_map(|element| match &selector.field.attr {
                Some(attr) => element.value().attr(attr).map(|v| v.trim().to_string()),
                None => Some(element.text().collect::<String>().trim().to_string()),
            })
            .collect();
        debug!("Selector {} matched {} value(s)", selector.field, values.len());
        values
    }

    /// First match, if any.
    pub fn first(&self, selector: &CompiledSelector) -> Option<String> {
        self.select(selector).into_iter().next()
    }

    /// First non-empty match, or a named `RequiredFieldMissing` error.
    pub fn require(&self, selector: &CompiledSelector, field: &str) -> ParsingResult<String> {
        self.select(selector)
            .into_iter()
            .find(|value| !value.is_empty())
            .ok_or_else(|| {
                ParsingError::required_field_missing(field, Some(&selector.field.to_string()))
            })
    }
}
