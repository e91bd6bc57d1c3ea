//! Media types with wildcard-aware matching

use crate::error::AcceptFormatError;

pub const DEFAULT_CHARSET: &str = "utf-8";

/// A parsed `category/type; charset=x` value
///
/// The category may be absent (`json`), in which case matching only looks at
/// the type. Either part may be the wildcard `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    category: Option<String>,
    subtype: String,
    charset: Option<String>,
}

impl ContentType {
    pub fn parse(raw: &str) -> Result<Self, AcceptFormatError> {
        let mut parts = raw.split(';');
        let essence = parts.next().unwrap_or_default().trim();
        if essence.is_empty() {
            return Err(AcceptFormatError::new(raw, "empty media type"));
        }

        let (category, subtype) = match essence.split_once('/') {
            Some((category, subtype)) => (Some(category.trim()), subtype.trim()),
            None if essence == "*" => (Some("*"), "*"),
            None => (None, essence),
        };

        if let Some(category) = category {
            if !is_token(category) {
                return Err(AcceptFormatError::new(raw, "invalid media category"));
            }
        }
        if !is_token(subtype) {
            return Err(AcceptFormatError::new(raw, "invalid media subtype"));
        }

        let charset = parts.find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"').to_string())
        });

        Ok(Self {
            category: category.map(|c| c.to_ascii_lowercase()),
            subtype: subtype.to_ascii_lowercase(),
            charset,
        })
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Declared charset, falling back to utf-8
    pub fn charset(&self) -> &str {
        self.charset.as_deref().unwrap_or(DEFAULT_CHARSET)
    }

    pub fn has_charset(&self) -> bool {
        self.charset.is_some()
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// `category/type` (or just `type` when no category was given)
    pub fn essence(&self) -> String {
        match &self.category {
            Some(category) => format!("{}/{}", category, self.subtype),
            None => self.subtype.clone(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.subtype == "*"
    }

    /// Mime-style match, symmetric in its wildcards
    ///
    /// `*/*`, `type/*` and `type/subtype` all match a concrete candidate, and
    /// a concrete value is matched by a wildcard on the other side. A value
    /// without a category matches any category with the same type.
    pub fn matches(&self, other: &ContentType) -> bool {
        let subtype_ok = |a: &str, b: &str| a == b || a == "*" || b == "*";

        match (&self.category, &other.category) {
            (Some(a), Some(b)) => {
                (a == b || a == "*" || b == "*") && subtype_ok(&self.subtype, &other.subtype)
            }
            _ => subtype_ok(&self.subtype, &other.subtype),
        }
    }

    /// Parse `candidate` and match it; unparsable candidates never match
    pub fn matches_str(&self, candidate: &str) -> bool {
        ContentType::parse(candidate).map(|c| self.matches(&c)).unwrap_or(false)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.essence())?;
        if let Some(charset) = &self.charset {
            write!(f, "; charset={}", charset)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ContentType {
    type Err = AcceptFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::parse(s)
    }
}

fn is_token(s: &str) -> bool {
    s == "*"
        || (!s.is_empty()
            && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ct(s: &str) -> ContentType {
        ContentType::parse(s).unwrap()
    }

    #[test]
    fn test_parse_full() {
        let value = ct("text/html; charset=ISO-8859-1");
        assert_eq!(value.category(), Some("text"));
        assert_eq!(value.subtype(), "html");
        assert_eq!(value.charset(), "ISO-8859-1");
        assert_eq!(value.to_string(), "text/html; charset=ISO-8859-1");
    }

    #[test]
    fn test_parse_bare_type() {
        let value = ct("json");
        assert_eq!(value.category(), None);
        assert_eq!(value.charset(), "utf-8");
        assert_eq!(value.to_string(), "json");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ContentType::parse("").is_err());
        assert!(ContentType::parse("text/ht ml").is_err());
        assert!(ContentType::parse("te(xt/html").is_err());
    }

    #[test]
    fn test_matching() {
        assert!(ct("*/*").matches(&ct("application/json")));
        assert!(ct("text/*").matches(&ct("text/plain")));
        assert!(!ct("text/*").matches(&ct("application/json")));
        assert!(ct("text/html").matches(&ct("text/*")));
        assert!(ct("application/json").matches(&ct("json")));
        assert!(!ct("application/json").matches(&ct("html")));
        assert!(ct("*").matches(&ct("image/png")));
    }
}
