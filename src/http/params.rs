//! Query-string extraction shared by the read endpoints

use crate::locale::{Locale, LocaleSettings};
use crate::views::{ViewError, ViewResult};
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Query-string extractor. A repeated key keeps its first value, and a
/// malformed query string is rejected as a [`ViewError::BadRequest`].
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ViewError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ViewError::bad_request(rejection.body_text()))?;
        first_values(pairs).map(QueryParams)
    }
}

/// Deserialize query pairs, keeping the first value of each key
pub fn first_values<T: DeserializeOwned>(pairs: Vec<(String, String)>) -> ViewResult<T> {
    let mut map = Map::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(Value::String(value));
    }
    serde_json::from_value(Value::Object(map))
        .map_err(|e| ViewError::bad_request(format!("Invalid query string: {}", e)))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

impl LangQuery {
    /// Absent or unsupported values resolve to the primary default locale
    pub fn locale(&self, settings: &LocaleSettings) -> Locale {
        settings.resolve_one(self.lang.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_fallback() {
        let settings = LocaleSettings::default();
        let q = |lang: Option<&str>| LangQuery {
            lang: lang.map(str::to_string),
        };
        assert_eq!(q(None).locale(&settings).as_str(), "de");
        assert_eq!(q(Some("EN")).locale(&settings).as_str(), "en");
        assert_eq!(q(Some("fr")).locale(&settings).as_str(), "de");
        assert_eq!(q(Some("??")).locale(&settings).as_str(), "de");
    }

    #[test]
    fn test_repeated_keys_keep_first_value() {
        let pairs = vec![
            ("lang".to_string(), "en".to_string()),
            ("lang".to_string(), "de".to_string()),
            ("unrelated".to_string(), "x".to_string()),
        ];
        let q: LangQuery = first_values(pairs).unwrap();
        assert_eq!(q.lang.as_deref(), Some("en"));

        let empty: LangQuery = first_values(Vec::new()).unwrap();
        assert!(empty.lang.is_none());
    }
}
