//! Filter chain for request inspection
//!
//! Provides async trait-based filtering with composable filter chain.
//! Filters can Allow or Deny requests based on inspection.

pub mod banlist;
pub mod identity;
pub mod probe_guard;
pub mod signature;

pub use banlist::BanList;
pub use identity::IdentityExtractor;
pub use probe_guard::{ProbeGuardConfig, ProbeGuardFilter};
pub use signature::{SignaturePredicate, SignatureSet};

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::{Request, Response, StatusCode};
use hyper::body::Incoming;
use http_body_util::Full;
use hyper::body::Bytes;

/// Action to take after filter inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Allow request to proceed
    Allow,
    /// Deny request with HTTP status and reason
    Deny { status: u16, reason: String },
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterAction::Allow => write!(f, "Allow"),
            FilterAction::Deny { status, reason } => {
                write!(f, "Deny(status={}, reason={})", status, reason)
            }
        }
    }
}

/// Trait for request filters
///
/// Filters inspect incoming requests and return actions.
/// They are async and can perform I/O (e.g., banlist persistence).
#[async_trait::async_trait]
pub trait Filter: Send + Sync {
    /// Inspect request and return action
    ///
    /// Note: Takes &Request to allow inspection without consuming body
    async fn filter(
        &self,
        req: &Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> FilterAction;

    /// Filter name for logging
    fn name(&self) -> &str;
}

/// Chain of filters executed sequentially
///
/// First non-Allow action short-circuits the chain.
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub async fn execute(
        &self,
        req: &Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> FilterAction {
        for filter in &self.filters {
            let action = filter.filter(req, remote_addr).await;
            if action != FilterAction::Allow {
                tracing::info!(
                    filter = filter.name(),
                    action = %action,
                    "Filter blocked request"
                );
                return action;
            }
        }
        FilterAction::Allow
    }

    pub fn action_to_response(&self, action: FilterAction) -> Response<Full<Bytes>> {
        match action {
            FilterAction::Allow => {
                Response::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from("OK")))
                    .unwrap()
            }
            FilterAction::Deny { status, reason } => {
                let status_code = StatusCode::from_u16(status)
                    .unwrap_or(StatusCode::FORBIDDEN);
                Response::builder()
                    .status(status_code)
                    .header("Content-Type", "text/plain")
                    .body(Full::new(Bytes::from(reason)))
                    .unwrap()
            }
        }
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Passthrough filter that allows all requests (for testing)
pub struct PassthroughFilter;

#[async_trait::async_trait]
impl Filter for PassthroughFilter {
    async fn filter(
        &self,
        _req: &Request<Incoming>,
        _remote_addr: SocketAddr,
    ) -> FilterAction {
        FilterAction::Allow
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}
