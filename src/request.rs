use reqwest::Method;
use std::fmt::Write as _;

use crate::overlay::ParamPair;

/// A fully described GET against the collection's select handler. Built per
/// dispatch and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<ParamPair>,
}

impl RequestSpec {
    /// Encoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        let mut out = String::new();
        for (i, pair) in self.query.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            let _ = write!(
                out,
                "{}={}",
                urlencoding::encode(&pair.key),
                urlencoding::encode(&pair.value)
            );
        }
        out
    }

    /// Absolute URL ready for dispatch.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string())
        }
    }
}

pub struct RequestBuilder;

impl RequestBuilder {
    /// `{endpoint}/solr/{collection}/select?q={term}&wt=json` followed by
    /// every overlay pair in order.
    pub fn build(endpoint: &str, collection: &str, term: &str, overlay: &[ParamPair]) -> RequestSpec {
        let path = format!(
            "{}/solr/{}/select",
            endpoint.trim_end_matches('/'),
            collection
        );

        let mut query = Vec::with_capacity(2 + overlay.len());
        query.push(ParamPair::new("q", term));
        query.push(ParamPair::new("wt", "json"));
        query.extend_from_slice(overlay);

        RequestSpec {
            method: Method::GET,
            path,
            query,
        }
    }
}
