//! Exploit-probe banning filter
//!
//! Orchestrates identity extraction, whitelist exemption, banlist
//! membership and signature matching for each request:
//!
//! 1. No extractable identity: allow; nothing else can apply to an
//!    unidentified client.
//! 2. Whitelisted identity: allow unconditionally.
//! 3. Banned identity: deny with 403 "Banned".
//! 4. Request matches a probe signature: ban the identity, then still
//!    forward this request. Classification happens while the revealing
//!    request is being served, so the ban takes effect from the next
//!    request on.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::{HeaderMap, Method, Request, Uri};
use tracing::{error, warn};

use super::banlist::BanList;
use super::identity::{IdentityExtractor, DEFAULT_IDENTITY_HEADER};
use super::signature::SignatureSet;
use super::{Filter, FilterAction};

/// Configuration for the probe-guard filter
#[derive(Debug, Clone)]
pub struct ProbeGuardConfig {
    /// Header the client identity is extracted from
    pub identity_header: String,
    /// Identities exempt from all blocking and banning
    pub whitelist: Vec<String>,
}

impl ProbeGuardConfig {
    pub fn new(identity_header: impl Into<String>, whitelist: Vec<String>) -> Self {
        Self {
            identity_header: identity_header.into(),
            whitelist,
        }
    }
}

impl Default for ProbeGuardConfig {
    fn default() -> Self {
        Self {
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
            whitelist: Vec::new(),
        }
    }
}

/// Filter that bans clients observed probing for known exploits
pub struct ProbeGuardFilter {
    extractor: IdentityExtractor,
    whitelist: HashSet<String>,
    signatures: SignatureSet,
    banlist: Arc<BanList>,
}

impl ProbeGuardFilter {
    pub fn new(config: ProbeGuardConfig, banlist: Arc<BanList>) -> Self {
        Self {
            extractor: IdentityExtractor::new(config.identity_header),
            whitelist: config.whitelist.into_iter().collect(),
            signatures: SignatureSet::builtin(),
            banlist,
        }
    }

    /// Replaces the built-in predicate set.
    pub fn with_signatures(mut self, signatures: SignatureSet) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn banlist(&self) -> &Arc<BanList> {
        &self.banlist
    }

    async fn decide(&self, headers: &HeaderMap, method: &Method, uri: &Uri) -> FilterAction {
        let Some(identity) = self.extractor.extract(headers) else {
            return FilterAction::Allow;
        };

        if self.whitelist.contains(&identity) {
            return FilterAction::Allow;
        }

        if self.banlist.contains(&identity).await {
            return FilterAction::Deny {
                status: 403,
                reason: "Banned".to_string(),
            };
        }

        if let Some(rule) = self.signatures.first_match(method, uri) {
            warn!(%identity, rule, path = uri.path(), "Exploit probe detected, banning identity");
            self.banlist.add(&identity).await;
            if let Err(e) = self.banlist.save().await {
                // In-memory state keeps serving; only persistence degraded.
                error!(error = %e, "Failed to persist banlist");
            }
        }

        // The probing request itself is still forwarded; the ban applies
        // from the next request on.
        FilterAction::Allow
    }
}

#[async_trait::async_trait]
impl Filter for ProbeGuardFilter {
    async fn filter(&self, req: &Request<Incoming>, _remote_addr: SocketAddr) -> FilterAction {
        self.decide(req.headers(), req.method(), req.uri()).await
    }

    fn name(&self) -> &str {
        "probe_guard"
    }
}
