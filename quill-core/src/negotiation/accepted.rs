//! Weighted candidate lists from Accept-style headers

use super::content_type::ContentType;
use crate::error::AcceptFormatError;

/// How entries are compared against producible values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Exact token or `*` (Accept-Language, Accept-Charset, Accept-Encoding)
    Token,
    /// Media types with `*/*` and `type/*` wildcards (Accept)
    Mime,
}

/// One parsed candidate with its weight
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptEntry {
    value: String,
    priority: f32,
    media: Option<ContentType>,
}

impl AcceptEntry {
    /// Parse `value[;q=weight]`; other parameters are ignored
    pub fn parse(raw: &str, strategy: MatchStrategy) -> Result<Self, AcceptFormatError> {
        let mut parts = raw.split(';');
        let value = parts.next().unwrap_or_default().trim();
        if value.is_empty() {
            return Err(AcceptFormatError::new(raw, "empty value"));
        }

        let mut priority = 1.0;
        for param in parts {
            let Some((key, weight)) = param.split_once('=') else {
                return Err(AcceptFormatError::new(raw, "parameter without value"));
            };
            if !key.trim().eq_ignore_ascii_case("q") {
                continue;
            }
            priority = weight
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|q| (0.0..=1.0).contains(q))
                .ok_or_else(|| AcceptFormatError::new(raw, "weight must be within 0..=1"))?;
        }

        let media = match strategy {
            MatchStrategy::Mime => Some(ContentType::parse(value)?),
            MatchStrategy::Token => {
                if value.contains(char::is_whitespace) {
                    return Err(AcceptFormatError::new(raw, "whitespace inside token"));
                }
                None
            }
        };

        let value = match &media {
            Some(media) => media.essence(),
            None => value.to_string(),
        };

        Ok(Self { value, priority, media })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn priority(&self) -> f32 {
        self.priority
    }

    /// Whether this entry admits `candidate`
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.media {
            Some(media) => media.matches_str(candidate),
            None => self.value == "*" || self.value.eq_ignore_ascii_case(candidate.trim()),
        }
    }
}

impl std::fmt::Display for AcceptEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Parsed negotiation header, kept in header order
///
/// # Example
///
/// ```rust
/// use quill_core::negotiation::AcceptedList;
///
/// let accept = AcceptedList::mime("text/html;q=0.8,application/json;q=0.5,text/plain;q=1");
/// assert_eq!(accept.get_highest_priority_for(&["application/json", "text/html"]), Some("text/html"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedList {
    entries: Vec<AcceptEntry>,
    strategy: MatchStrategy,
}

impl AcceptedList {
    /// Parse a comma-separated header; entries that fail to parse are dropped
    pub fn parse(header: &str, strategy: MatchStrategy) -> Self {
        let entries = header
            .split(',')
            .filter(|raw| !raw.trim().is_empty())
            .filter_map(|raw| match AcceptEntry::parse(raw, strategy) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::debug!("Dropping accept entry: {}", err);
                    None
                }
            })
            .collect();

        Self { entries, strategy }
    }

    pub fn mime(header: &str) -> Self {
        Self::parse(header, MatchStrategy::Mime)
    }

    pub fn tokens(header: &str) -> Self {
        Self::parse(header, MatchStrategy::Token)
    }

    pub fn empty(strategy: MatchStrategy) -> Self {
        Self { entries: Vec::new(), strategy }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Entries in header order
    pub fn entries(&self) -> &[AcceptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by descending weight; equal weights keep header order
    pub fn get_by_priority(&self) -> Vec<&AcceptEntry> {
        let mut sorted: Vec<&AcceptEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        sorted
    }

    /// Entries that admit `candidate`, in header order
    pub fn filter(&self, candidate: &str) -> Vec<&AcceptEntry> {
        self.entries.iter().filter(|entry| entry.matches(candidate)).collect()
    }

    pub fn get_highest_priority(&self) -> Option<&AcceptEntry> {
        self.get_by_priority().into_iter().next()
    }

    /// Whether any entry with a non-zero weight admits `candidate`
    pub fn contains(&self, candidate: &str) -> bool {
        !self.refuses(candidate)
            && self.entries.iter().any(|entry| entry.priority > 0.0 && entry.matches(candidate))
    }

    /// A `q=0` entry without wildcards names `candidate` as not acceptable
    fn refuses(&self, candidate: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.priority == 0.0 && !entry.value.contains('*') && entry.matches(candidate))
    }

    /// Pick the producible value the client prefers
    ///
    /// Entries are visited by descending weight and each one is tested against
    /// the candidates in the order given, so header weight decides first and
    /// candidate order breaks ties. Entries with `q=0` never select anything,
    /// and a candidate they name explicitly is skipped even under a wildcard.
    pub fn get_highest_priority_for<'c, S: AsRef<str>>(&self, candidates: &'c [S]) -> Option<&'c str> {
        self.get_by_priority()
            .into_iter()
            .filter(|entry| entry.priority > 0.0)
            .find_map(|entry| {
                candidates
                    .iter()
                    .map(|c| c.as_ref())
                    .find(|candidate| entry.matches(candidate) && !self.refuses(candidate))
            })
    }
}
