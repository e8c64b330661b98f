//! Request identity and content-addressed cache key generation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The tuple a cached entry is addressed by.
///
/// Two requests are the same resource iff their identities are equal. No URL
/// normalization happens here beyond what the caller already did when building
/// the absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestIdentity {
    pub method: String,
    pub url: String,
    /// Relevant request headers as (lower-cased name, value), in configured order.
    #[serde(default)]
    pub vary: Vec<(String, String)>,
}

impl RequestIdentity {
    pub fn new(method: &str, url: &str) -> Self {
        Self { method: method.to_ascii_uppercase(), url: url.to_string(), vary: Vec::new() }
    }

    /// Build an identity for a GET of `url`.
    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    /// Attach the relevant request headers.
    ///
    /// `names` is the configured list of headers that take part in the identity;
    /// `headers` are the request's headers. A missing header is recorded with an
    /// empty value, so an absent header and one sent empty share a key.
    pub fn with_vary(mut self, names: &[String], headers: &[(String, String)]) -> Self {
        self.vary = names
            .iter()
            .map(|name| {
                let name = name.to_ascii_lowercase();
                let value = headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(&name))
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default();
                (name, value)
            })
            .collect();
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Persistent primary key for this identity.
    pub fn cache_key(&self) -> String {
        let vary = self
            .vary
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join("\n");
        compute_cache_key(&self.method, &self.url, &vary)
    }
}

impl std::fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Compute a content-addressed cache key for a request.
pub fn compute_cache_key(method: &str, url: &str, vary_headers: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    hasher.update(vary_headers.as_bytes());
    hex::encode(hasher.finalize())
}
