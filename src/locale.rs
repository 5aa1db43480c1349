//! Locale codes and request-locale resolution
//!
//! Every endpoint takes a `lang` (single) or `langs`/`languages` (list)
//! parameter. Absent or invalid values never fail a request; they fall back
//! to the configured defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fallback language for labels and localized properties
pub const FALLBACK_LOCALE: &str = "en";

#[derive(Error, Debug, PartialEq)]
#[error("Invalid locale code: '{0}'")]
pub struct InvalidLocale(pub String);

/// A lowercase 2-3 letter language code (e.g. "de", "en")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn parse(raw: &str) -> Option<Locale> {
        let code = raw.trim().to_ascii_lowercase();
        let valid = (2..=3).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_lowercase());
        valid.then_some(Locale(code))
    }

    pub fn english() -> Locale {
        Locale(FALLBACK_LOCALE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_LOCALE
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = InvalidLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s).ok_or_else(|| InvalidLocale(s.to_string()))
    }
}

impl TryFrom<String> for Locale {
    type Error = InvalidLocale;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

/// Supported and default locales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSettings {
    /// Locales a request may select
    pub supported: Vec<Locale>,
    /// Locales used when a request names none; the first one is the
    /// default for single-locale endpoints
    pub defaults: Vec<Locale>,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        let de = Locale("de".to_string());
        let en = Locale::english();
        Self {
            supported: vec![de.clone(), en.clone()],
            defaults: vec![de, en],
        }
    }
}

impl LocaleSettings {
    fn accept(&self, raw: &str) -> Option<Locale> {
        Locale::parse(raw).filter(|l| self.supported.contains(l))
    }

    pub fn primary(&self) -> Locale {
        self.defaults.first().cloned().unwrap_or_else(Locale::english)
    }

    /// Resolve a single `lang` parameter
    pub fn resolve_one(&self, raw: Option<&str>) -> Locale {
        raw.and_then(|r| self.accept(r))
            .unwrap_or_else(|| self.primary())
    }

    /// Resolve a comma-separated locale list, keeping request order and
    /// dropping duplicates and unsupported entries
    pub fn resolve_many(&self, raw: Option<&str>) -> Vec<Locale> {
        let mut locales: Vec<Locale> = Vec::new();
        for part in raw.unwrap_or_default().split(',') {
            if let Some(locale) = self.accept(part) {
                if !locales.contains(&locale) {
                    locales.push(locale);
                }
            }
        }
        if locales.is_empty() {
            self.defaults.clone()
        } else {
            locales
        }
    }
}
