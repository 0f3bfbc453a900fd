//! URI template substitution and query construction
//!
//! Operation paths are templates with `{name}`/`{namespace}` style
//! placeholders. Substitution is literal string replacement; a
//! placeholder left unresolved after substitution is an error naming
//! the parameter, never a silently broken path.

use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::errors::{KubewireError, Result};

/// Characters left unescaped in query components
const QUERY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Ordered query parameters.
///
/// A key may hold a single value or a list; list values expand to
/// repeated `key=v1&key=v2` pairs (the form the API server expects for
/// e.g. exec `command` arguments), never a comma-joined value.
#[derive(Debug, Clone, Default)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

#[derive(Debug, Clone)]
pub enum QueryValue {
    Single(String),
    Many(Vec<String>),
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    /// Append a single-valued parameter
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.params
            .push((key.into(), QueryValue::Single(value.to_string())));
        self
    }

    /// Append a list-valued parameter (serialized as repeated keys)
    pub fn push_many<I, V>(&mut self, key: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.params.push((
            key.into(),
            QueryValue::Many(values.into_iter().map(|v| v.to_string()).collect()),
        ));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    /// Value of a single-valued parameter, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.iter().find_map(|(k, v)| match v {
            QueryValue::Single(value) if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Expanded `(key, value)` pairs in insertion order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().flat_map(|(key, value)| {
            let values: Box<dyn Iterator<Item = &str>> = match value {
                QueryValue::Single(v) => Box::new(std::iter::once(v.as_str())),
                QueryValue::Many(vs) => Box::new(vs.iter().map(String::as_str)),
            };
            values.map(move |v| (key.as_str(), v))
        })
    }

    /// Percent-encoded query string without the leading `?`
    pub fn encode(&self) -> String {
        self.pairs()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY_SAFE),
                    utf8_percent_encode(value, QUERY_SAFE)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Substitute template placeholders and append the query string.
///
/// Substitution keys are the literal placeholder spelling, e.g.
/// `"{name}"`. Any `{param}` remaining afterwards fails with
/// [`KubewireError::UnresolvedParameter`] naming that parameter.
pub fn build_uri(
    template: &str,
    substitutions: &IndexMap<&str, String>,
    query: &Query,
) -> Result<String> {
    let mut path = template.to_string();
    for (placeholder, value) in substitutions {
        path = path.replace(placeholder, value);
    }

    if let Some(start) = path.find('{') {
        let end = path[start..]
            .find('}')
            .map(|i| start + i + 1)
            .unwrap_or(path.len());
        return Err(KubewireError::UnresolvedParameter(
            path[start..end].to_string(),
        ));
    }

    if query.is_empty() {
        Ok(path)
    } else {
        Ok(format!("{}?{}", path, query.encode()))
    }
}
