//! Exploit-probe signature matching
//!
//! A fixed collection of predicates, each classifying a request as probe
//! traffic. A request is malicious if any predicate matches. Predicates
//! are registered explicitly; nothing is discovered at runtime, so the
//! matcher set stays auditable and testable in isolation.

use hyper::{Method, Uri};

/// A rule classifying a request as an exploit probe.
///
/// Implementations are pure: they read the request line only and never
/// fail on malformed input. An absent query string or empty path simply
/// does not match.
pub trait SignaturePredicate: Send + Sync {
    fn matches(&self, method: &Method, uri: &Uri) -> bool;

    /// Predicate name for logging
    fn name(&self) -> &'static str;
}

/// Probe for environment files. Nothing legitimate fetches `.env` over
/// HTTP; those files hold credentials and are a standard first probe.
pub struct DotenvProbe;

impl SignaturePredicate for DotenvProbe {
    fn matches(&self, _method: &Method, uri: &Uri) -> bool {
        uri.path().ends_with(".env")
    }

    fn name(&self) -> &'static str {
        "dotenv"
    }
}

/// Probe for scripting-language endpoints on a stack that serves none.
///
/// Ships with `.php` and can carry further extensions as data.
pub struct ScriptProbe {
    extensions: Vec<&'static str>,
}

impl ScriptProbe {
    pub fn new() -> Self {
        Self {
            extensions: vec![".php"],
        }
    }

    pub fn with_extensions(extensions: Vec<&'static str>) -> Self {
        Self { extensions }
    }
}

impl Default for ScriptProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SignaturePredicate for ScriptProbe {
    fn matches(&self, _method: &Method, uri: &Uri) -> bool {
        let path = uri.path();
        self.extensions.iter().any(|ext| path.contains(ext))
    }

    fn name(&self) -> &'static str {
        "script_probe"
    }
}

/// One historically-exploited endpoint. Method, path and query must all
/// match exactly; an empty query stands for "no query string".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSignature {
    pub method: Method,
    pub path: &'static str,
    pub query: &'static str,
}

/// Curated table of endpoints seen in mass exploitation campaigns.
fn vulnerable_endpoints() -> Vec<EndpointSignature> {
    [
        (Method::GET, "/.git/config", ""),
        (Method::GET, "/.aws/credentials", ""),
        (Method::GET, "/actuator/env", ""),
        (Method::GET, "/server-status", "auto"),
        (Method::GET, "/solr/admin/info/system", "wt=json"),
        (Method::GET, "/owa/auth/x.js", ""),
        (Method::GET, "/console/login/LoginForm.jsp", ""),
        (Method::GET, "/manager/html", ""),
        (Method::GET, "/HNAP1/", ""),
        (Method::GET, "/cgi-bin/luci", ""),
        (Method::GET, "/telescope/requests", ""),
        (Method::GET, "/", "XDEBUG_SESSION_START=phpstorm"),
        (Method::POST, "/api/jsonws/invoke", ""),
        (Method::POST, "/boaform/admin/formLogin", ""),
        (Method::POST, "/_ignition/execute-solution", ""),
        (Method::POST, "/vendor/phpunit/phpunit/src/Util/PHP/eval-stdin.php", ""),
    ]
    .into_iter()
    .map(|(method, path, query)| EndpointSignature {
        method,
        path,
        query,
    })
    .collect()
}

/// Exact-match predicate over a static table of known-exploited endpoints.
pub struct KnownVulnerableEndpoint {
    table: Vec<EndpointSignature>,
}

impl KnownVulnerableEndpoint {
    pub fn new() -> Self {
        Self {
            table: vulnerable_endpoints(),
        }
    }

    pub fn with_table(table: Vec<EndpointSignature>) -> Self {
        Self { table }
    }
}

impl Default for KnownVulnerableEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl SignaturePredicate for KnownVulnerableEndpoint {
    fn matches(&self, method: &Method, uri: &Uri) -> bool {
        let query = uri.query().unwrap_or("");
        self.table
            .iter()
            .any(|sig| sig.method == *method && sig.path == uri.path() && sig.query == query)
    }

    fn name(&self) -> &'static str {
        "known_vulnerable_endpoint"
    }
}

/// The full predicate collection evaluated per request.
pub struct SignatureSet {
    predicates: Vec<Box<dyn SignaturePredicate>>,
}

impl SignatureSet {
    /// Built-in predicates: dotenv, script probe, known endpoint table.
    pub fn builtin() -> Self {
        Self {
            predicates: vec![
                Box::new(DotenvProbe),
                Box::new(ScriptProbe::new()),
                Box::new(KnownVulnerableEndpoint::new()),
            ],
        }
    }

    /// An empty set; combine with `add_predicate` for custom matchers.
    pub fn empty() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    pub fn add_predicate(mut self, predicate: Box<dyn SignaturePredicate>) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Name of the first matching predicate, if any.
    pub fn first_match(&self, method: &Method, uri: &Uri) -> Option<&'static str> {
        self.predicates
            .iter()
            .find(|p| p.matches(method, uri))
            .map(|p| p.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_dotenv_matches_env_suffix() {
        assert!(DotenvProbe.matches(&Method::GET, &uri("/.env")));
        assert!(DotenvProbe.matches(&Method::GET, &uri("/app/prod.env")));
    }

    #[test]
    fn test_dotenv_ignores_other_paths() {
        assert!(!DotenvProbe.matches(&Method::GET, &uri("/")));
        assert!(!DotenvProbe.matches(&Method::GET, &uri("/env")));
        assert!(!DotenvProbe.matches(&Method::GET, &uri("/environment")));
    }

    #[test]
    fn test_script_probe_matches_php_substring() {
        let probe = ScriptProbe::new();

        assert!(probe.matches(&Method::GET, &uri("/index.php")));
        assert!(probe.matches(&Method::GET, &uri("/index.php/extra")));
        assert!(!probe.matches(&Method::GET, &uri("/healthz")));
    }

    #[test]
    fn test_script_probe_custom_extensions() {
        let probe = ScriptProbe::with_extensions(vec![".asp", ".jsp"]);

        assert!(probe.matches(&Method::GET, &uri("/login.asp")));
        assert!(probe.matches(&Method::GET, &uri("/admin.jsp")));
        assert!(!probe.matches(&Method::GET, &uri("/index.php")));
    }

    #[test]
    fn test_known_endpoint_exact_match() {
        let known = KnownVulnerableEndpoint::new();

        assert!(known.matches(&Method::GET, &uri("/solr/admin/info/system?wt=json")));
        assert!(known.matches(&Method::GET, &uri("/.git/config")));
        assert!(known.matches(&Method::POST, &uri("/api/jsonws/invoke")));
    }

    #[test]
    fn test_known_endpoint_requires_exact_query() {
        let known = KnownVulnerableEndpoint::new();

        assert!(!known.matches(&Method::GET, &uri("/solr/admin/info/system")));
        assert!(!known.matches(&Method::GET, &uri("/solr/admin/info/system?wt=xml")));
    }

    #[test]
    fn test_known_endpoint_requires_exact_method() {
        let known = KnownVulnerableEndpoint::new();

        assert!(!known.matches(&Method::POST, &uri("/.git/config")));
        assert!(!known.matches(&Method::GET, &uri("/api/jsonws/invoke")));
    }

    #[test]
    fn test_known_endpoint_absent_query_does_not_match_query_entry() {
        let known = KnownVulnerableEndpoint::new();

        assert!(!known.matches(&Method::GET, &uri("/server-status")));
        assert!(known.matches(&Method::GET, &uri("/server-status?auto")));
    }

    #[test]
    fn test_with_table_replaces_builtin_entries() {
        let known = KnownVulnerableEndpoint::with_table(vec![EndpointSignature {
            method: Method::GET,
            path: "/internal-probe",
            query: "",
        }]);

        assert!(known.matches(&Method::GET, &uri("/internal-probe")));
        assert!(!known.matches(&Method::GET, &uri("/.git/config")));
    }

    #[test]
    fn test_builtin_set_reports_first_match() {
        let set = SignatureSet::builtin();

        assert_eq!(set.first_match(&Method::GET, &uri("/.env")), Some("dotenv"));
        assert_eq!(
            set.first_match(&Method::GET, &uri("/wp-login.php")),
            Some("script_probe")
        );
        assert_eq!(
            set.first_match(&Method::GET, &uri("/.git/config")),
            Some("known_vulnerable_endpoint")
        );
        assert_eq!(set.first_match(&Method::GET, &uri("/")), None);
    }

    #[test]
    fn test_custom_predicate_extends_set() {
        struct TraversalProbe;

        impl SignaturePredicate for TraversalProbe {
            fn matches(&self, _method: &Method, uri: &Uri) -> bool {
                uri.path().contains("..")
            }

            fn name(&self) -> &'static str {
                "traversal"
            }
        }

        let set = SignatureSet::empty().add_predicate(Box::new(TraversalProbe));

        assert_eq!(
            set.first_match(&Method::GET, &uri("/a/../etc/passwd")),
            Some("traversal")
        );
        assert_eq!(set.first_match(&Method::GET, &uri("/.env")), None);
    }
}
