//! Localization rehydrator
//!
//! Tag and free-text fields reach this layer in three shapes: JSON-encoded
//! strings, object maps keyed by locale, or arrays that are already
//! localized. [`RawField`] classifies a field once at the ingestion boundary;
//! everything downstream works on the parsed value.
//!
//! Label resolution order is always: requested locale, then English, then
//! the slug itself. Empty labels count as missing.

use crate::locale::{Locale, FALLBACK_LOCALE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Wire/storage tag representation: slug -> locale -> label
pub type TagMap = BTreeMap<String, BTreeMap<String, String>>;

/// A tag resolved to one display label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalizedTag {
    pub slug: String,
    pub label: String,
}

impl LocalizedTag {
    pub fn new(slug: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            label: label.into(),
        }
    }
}

/// A row field before rehydration
#[derive(Debug, Clone, PartialEq)]
pub enum RawField {
    /// Missing or null
    Absent,
    /// A string that may hold JSON
    Encoded(String),
    /// Any non-string JSON value
    Structured(Value),
}

impl RawField {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawField::Absent,
            Some(Value::String(s)) => RawField::Encoded(s.clone()),
            Some(other) => RawField::Structured(other.clone()),
        }
    }

    /// Resolve to a parsed object or array.
    ///
    /// Strings are parsed strictly; a parse failure yields `None` and is
    /// never an error. Scalars other than strings yield `None`.
    pub fn rehydrate(self) -> Option<Value> {
        match self {
            RawField::Absent => None,
            RawField::Structured(value) => match value {
                Value::Object(_) | Value::Array(_) => Some(value),
                _ => None,
            },
            RawField::Encoded(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Null) => None,
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    debug!("Ignoring malformed JSON field: {}", e);
                    None
                }
            },
        }
    }
}

/// Parse a possibly JSON-encoded value
pub fn rehydrate_json(value: Option<&Value>) -> Option<Value> {
    RawField::from_value(value).rehydrate()
}

/// Interpret a rehydrated value as a [`TagMap`].
///
/// Only objects qualify. Arrays are rejected: they carry tags that are
/// already localized and must bypass this path. Entries whose value is not
/// a locale map are skipped, as are non-string labels.
pub fn to_tag_map(value: &Value) -> Option<TagMap> {
    let object = value.as_object()?;
    let mut map = TagMap::new();
    for (slug, labels) in object {
        let Some(labels) = labels.as_object() else {
            continue;
        };
        let labels: BTreeMap<String, String> = labels
            .iter()
            .filter_map(|(locale, label)| Some((locale.clone(), label.as_str()?.to_string())))
            .collect();
        map.insert(slug.clone(), labels);
    }
    Some(map)
}

/// Resolve one label: requested locale, then English, then the slug
pub fn resolve_label(labels: &BTreeMap<String, String>, slug: &str, locale: &Locale) -> String {
    [locale.as_str(), FALLBACK_LOCALE]
        .iter()
        .filter_map(|code| labels.get(*code))
        .find(|label| !label.is_empty())
        .cloned()
        .unwrap_or_else(|| slug.to_string())
}

/// Localize a tag map, sorted by label collation.
///
/// Returns `None` when nothing renders (empty map, or only empty slugs with
/// no labels).
pub fn localize(tags: &TagMap, locale: &Locale) -> Option<Vec<LocalizedTag>> {
    let mut localized: Vec<LocalizedTag> = tags
        .iter()
        .map(|(slug, labels)| LocalizedTag::new(slug.clone(), resolve_label(labels, slug, locale)))
        .filter(|tag| !tag.label.is_empty())
        .collect();
    if localized.is_empty() {
        return None;
    }
    localized.sort_by(compare_tags);
    Some(localized)
}

/// Resolve a raw tag field of any shape into localized tags
pub fn resolve_tags(raw: RawField, locale: &Locale) -> Option<Vec<LocalizedTag>> {
    match raw.rehydrate()? {
        Value::Array(items) => localized_from_array(&items),
        object => localize(&to_tag_map(&object)?, locale),
    }
}

/// Accept already-localized tags: `{slug, label}` objects or plain strings
fn localized_from_array(items: &[Value]) -> Option<Vec<LocalizedTag>> {
    let tags: Vec<LocalizedTag> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.is_empty() => Some(LocalizedTag::new(s.clone(), s.clone())),
            Value::Object(obj) => {
                let slug = obj.get("slug")?.as_str()?;
                let label = obj
                    .get("label")
                    .and_then(Value::as_str)
                    .filter(|l| !l.is_empty())
                    .unwrap_or(slug);
                (!slug.is_empty()).then(|| LocalizedTag::new(slug, label))
            }
            _ => None,
        })
        .collect();
    (!tags.is_empty()).then_some(tags)
}

/// Reorder tags so that slugs named in `order` come first, in that order.
/// Remaining tags keep their relative (alphabetical) order.
pub fn apply_tag_order(mut tags: Vec<LocalizedTag>, order: &[String]) -> Vec<LocalizedTag> {
    if order.is_empty() {
        return tags;
    }
    let rank = |tag: &LocalizedTag| order.iter().position(|s| *s == tag.slug).unwrap_or(order.len());
    tags.sort_by_key(rank);
    tags
}

/// Resolve a free-text field that may be a plain string or a locale map
pub fn localize_text(raw: RawField, locale: &Locale) -> String {
    let pick = |map: &serde_json::Map<String, Value>| {
        [locale.as_str(), FALLBACK_LOCALE]
            .iter()
            .filter_map(|code| map.get(*code).and_then(Value::as_str))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
            .to_string()
    };
    match raw {
        RawField::Absent => String::new(),
        RawField::Structured(Value::Object(map)) => pick(&map),
        RawField::Structured(other) => other.to_string(),
        RawField::Encoded(text) => {
            // Only an object is treated as a locale map; anything else is literal text
            if text.trim_start().starts_with('{') {
                if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text) {
                    return pick(&map);
                }
            }
            text
        }
    }
}

/// Rehydrate a list-valued field; anything that isn't an array is empty
pub fn rehydrate_list(raw: RawField) -> Vec<Value> {
    match raw.rehydrate() {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Rehydrate a list of strings. A plain non-JSON string counts as a
/// single-element list.
pub fn rehydrate_strings(raw: RawField) -> Vec<String> {
    let plain = match &raw {
        RawField::Encoded(text) if !text.trim_start().starts_with('[') && !text.is_empty() => {
            Some(text.clone())
        }
        _ => None,
    };
    if let Some(text) = plain {
        return vec![text];
    }
    rehydrate_list(raw)
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect()
}

/// Case- and diacritic-insensitive collation key
pub fn collation_key(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => key.push('a'),
            'æ' => key.push_str("ae"),
            'ç' => key.push('c'),
            'è' | 'é' | 'ê' | 'ë' => key.push('e'),
            'ì' | 'í' | 'î' | 'ï' => key.push('i'),
            'ñ' => key.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => key.push('o'),
            'œ' => key.push_str("oe"),
            'ß' => key.push_str("ss"),
            'ù' | 'ú' | 'û' | 'ü' => key.push('u'),
            'ý' | 'ÿ' => key.push('y'),
            other => key.push(other),
        }
    }
    key
}

/// Locale-aware label comparison with a deterministic tie-break
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn compare_tags(a: &LocalizedTag, b: &LocalizedTag) -> Ordering {
    compare_labels(&a.label, &b.label).then_with(|| a.slug.cmp(&b.slug))
}
