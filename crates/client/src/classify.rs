//! Request classification.
//!
//! Every request gets exactly one [`Category`], computed from its declared
//! destination and its URL path alone. Whether the request actually carries a
//! credential is irrelevant: the credentialed/uncredentialed split is textual.

use lantern_core::{AppConfig, Error};
use regex::Regex;
use std::fmt;

use crate::request::{Destination, InterceptedRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Navigation to an HTML document.
    Document,
    /// Bundle, script, stylesheet, icon and anything else not matched as API.
    StaticAsset,
    /// API route that requires authentication.
    ApiCredentialed,
    /// Any other API route.
    ApiUncredentialed,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Document => "document",
            Category::StaticAsset => "static-asset",
            Category::ApiCredentialed => "api-credentialed",
            Category::ApiUncredentialed => "api-uncredentialed",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered pattern lists. Deterministic and side-effect free.
#[derive(Debug, Clone)]
pub struct Classifier {
    credentialed: Vec<Regex>,
    api: Vec<Regex>,
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, Error> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| Error::InvalidPattern(format!("{p}: {e}"))))
        .collect()
}

impl Classifier {
    /// Build from path regexes. `api` may be empty.
    pub fn new(credentialed: &[String], api: &[String]) -> Result<Self, Error> {
        Ok(Self { credentialed: compile(credentialed)?, api: compile(api)? })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(&config.credentialed_patterns, &config.api_patterns)
    }

    pub fn classify(&self, request: &InterceptedRequest) -> Category {
        let path = request.url.path();

        if request.destination == Destination::Document || is_html_path(path) {
            return Category::Document;
        }
        if self.credentialed.iter().any(|re| re.is_match(path)) {
            return Category::ApiCredentialed;
        }
        if self.api.iter().any(|re| re.is_match(path)) {
            return Category::ApiUncredentialed;
        }
        Category::StaticAsset
    }
}

fn is_html_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}
