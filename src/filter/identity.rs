//! Client identity extraction from forwarded-address headers
//!
//! Proxy chains stack addresses into a single header value separated by
//! commas (and occasionally semicolons); the first entry is the address
//! of the original client.

use hyper::HeaderMap;

/// Standard forwarded-address header, used when none is configured.
pub const DEFAULT_IDENTITY_HEADER: &str = "x-forwarded-for";

/// Derives a stable client identity from request headers.
#[derive(Debug, Clone)]
pub struct IdentityExtractor {
    header_name: String,
}

impl IdentityExtractor {
    pub fn new(header_name: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
        }
    }

    /// Returns the first address of the proxy chain, trimmed.
    ///
    /// `None` means "no identity available": the header is absent, not
    /// valid ASCII, or carries no token before the first delimiter.
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        let raw = headers.get(self.header_name.as_str())?.to_str().ok()?;
        let first = raw.split([',', ';']).next().unwrap_or("").trim();
        if first.is_empty() {
            None
        } else {
            Some(first.to_string())
        }
    }
}

impl Default for IdentityExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_HEADER)
    }
}
