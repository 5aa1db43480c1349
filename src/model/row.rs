//! Typed accessors over read-port rows
//!
//! Every accessor supplies a default for absent fields so that consumers
//! can treat list and string fields as always present.

use crate::graph::Row;
use crate::locale::Locale;
use crate::localize::{self, LocalizedTag, RawField};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Borrowed view of a row, bound to the locale it was projected for
pub struct RowView<'a> {
    row: &'a Row,
    locale: &'a Locale,
}

impl<'a> RowView<'a> {
    pub fn new(row: &'a Row, locale: &'a Locale) -> Self {
        Self { row, locale }
    }

    pub fn locale(&self) -> &Locale {
        self.locale
    }

    pub fn raw(&self, key: &str) -> RawField {
        RawField::from_value(self.row.get(key))
    }

    /// Scalar as string: strings verbatim, numbers and booleans rendered
    pub fn string(&self, key: &str) -> String {
        self.opt_string(key).unwrap_or_default()
    }

    pub fn opt_string(&self, key: &str) -> Option<String> {
        match self.row.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Free text that may be stored as a locale map
    pub fn text(&self, key: &str) -> String {
        localize::localize_text(self.raw(key), self.locale)
    }

    pub fn strings(&self, key: &str) -> Vec<String> {
        localize::rehydrate_strings(self.raw(key))
    }

    pub fn list(&self, key: &str) -> Vec<Value> {
        localize::rehydrate_list(self.raw(key))
    }

    /// Structured object; empty object when absent or malformed
    pub fn object(&self, key: &str) -> Value {
        match self.raw(key).rehydrate() {
            Some(value @ Value::Object(_)) => value,
            _ => Value::Object(serde_json::Map::new()),
        }
    }

    /// Localized tags, ordered by `tagOrder` when one is present
    pub fn tags(&self) -> Vec<LocalizedTag> {
        let tags = localize::resolve_tags(self.raw("tags"), self.locale).unwrap_or_default();
        localize::apply_tag_order(tags, &self.strings("tagOrder"))
    }

    /// Slugs of the `tags` field without resolving labels
    pub fn tag_slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = localize::resolve_tags(self.raw("tags"), self.locale)
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.slug)
            .collect();
        slugs.sort();
        slugs
    }

    /// RFC 3339 string or Unix milliseconds
    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        parse_timestamp(self.row.get(key)?)
    }

    pub fn count(&self, key: &str) -> Option<usize> {
        match self.row.get(key)? {
            Value::Number(n) => n.as_u64().map(|c| c as usize),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        _ => None,
    }
}
