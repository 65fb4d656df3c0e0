use serde::Serialize;
use std::fmt;

/// One query-string parameter. Duplicated keys are legal and all of them are
/// sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamPair {
    pub key: String,
    pub value: String,
}

impl ParamPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ParamPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for ParamPair {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Parser for the user-supplied `key=value&flag` overlay string.
pub struct QueryParamOverlay;

impl QueryParamOverlay {
    /// Split `raw` on `&` and each segment on its first `=`.
    ///
    /// A segment without `=` becomes a flag with an empty value. Blank segments
    /// are skipped. Nothing is encoded or validated here.
    pub fn parse(raw: &str) -> Vec<ParamPair> {
        raw.split('&')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => ParamPair::new(key.trim(), value.trim()),
                None => ParamPair::new(segment, ""),
            })
            .collect()
    }
}
