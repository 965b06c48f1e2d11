//! Route pattern declarations and their compiled matchers.
//!
//! A route is declared with a [`PatternSpec`]: a plain path (`"/users/:userId"`), a structured
//! [`UrlTemplate`] with separate protocol, hostname and pathname parts, or a prebuilt
//! [`Matcher`]. Every declaration is compiled once, at registration time, into a matcher which
//! the dispatcher asks for [`Captures`](crate::Captures) on each request.

use crate::helpers;
use crate::regex_generator::{generate_exact_match_regex, TemplateKind};
use crate::types::{Captures, RouteParams};
use crate::Error;
use http::uri::Authority;
use hyper::header;
use hyper::Request;
use regex::Regex;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// The parts of a request URL a pattern is tested against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    scheme: String,
    host: Option<String>,
    path: String,
    query: Option<String>,
    href: String,
}

impl RequestUrl {
    /// Creates a URL from raw parts. The host is lower-cased and stripped of its port, the path
    /// is percent-decoded.
    pub fn new(scheme: &str, host: Option<&str>, raw_path: &str, query: Option<&str>) -> RequestUrl {
        let scheme = scheme.to_ascii_lowercase();
        let host = host.and_then(host_without_port);
        let raw_path = if raw_path.is_empty() { "/" } else { raw_path };

        let mut href = format!("{}://{}{}", scheme, host.as_deref().unwrap_or(""), raw_path);
        if let Some(q) = query {
            href.push('?');
            href.push_str(q);
        }

        RequestUrl {
            scheme,
            host,
            path: helpers::percent_decode_request_path(raw_path),
            query: query.map(str::to_owned),
            href,
        }
    }

    /// Reads the URL of a request. The host comes from the request target when it is in
    /// absolute form, otherwise from the `Host` header.
    pub fn from_request<B>(req: &Request<B>) -> RequestUrl {
        let uri = req.uri();
        let host = uri
            .authority()
            .map(|a| a.as_str())
            .or_else(|| req.headers().get(header::HOST).and_then(|h| h.to_str().ok()));

        RequestUrl::new(uri.scheme_str().unwrap_or("http"), host, uri.path(), uri.query())
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The percent-decoded path.
    ///
    /// Decoding happens before matching, so an encoded slash (`%2F`) separates segments like a
    /// literal one: `/users/a%2Fb` does not match `/users/:name`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The full URL, e.g. `http://example.com/users/1?page=2`.
    pub fn href(&self) -> &str {
        &self.href
    }
}

fn host_without_port(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let host = match raw.parse::<Authority>() {
        Ok(authority) => authority.host().to_owned(),
        Err(_) => raw.to_owned(),
    };

    Some(host.to_ascii_lowercase())
}

/// Tests a request URL against a route pattern.
///
/// Implement it to plug a custom matching strategy into the router via
/// [`PatternSpec::Matcher`].
pub trait Matcher: Send + Sync + Debug + 'static {
    /// Returns the captures of a successful match or `None` if the URL does not match.
    fn matches(&self, url: &RequestUrl) -> Option<Captures>;
}

/// A structured route template with separate URL parts. Unset parts match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlTemplate {
    protocol: Option<String>,
    hostname: Option<String>,
    pathname: String,
}

impl UrlTemplate {
    pub fn new<P: Into<String>>(pathname: P) -> UrlTemplate {
        UrlTemplate {
            pathname: pathname.into(),
            ..UrlTemplate::default()
        }
    }

    /// Restricts the template to a scheme, e.g. `"https"`.
    pub fn protocol<P: Into<String>>(mut self, protocol: P) -> UrlTemplate {
        self.protocol = Some(protocol.into());
        self
    }

    /// Restricts the template to a hostname template, e.g. `"api.example.com"` or
    /// `":tenant.example.com"`.
    pub fn hostname<H: Into<String>>(mut self, hostname: H) -> UrlTemplate {
        self.hostname = Some(hostname.into());
        self
    }
}

/// A route pattern declaration, compiled when the route is registered.
#[derive(Debug, Clone)]
pub enum PatternSpec {
    /// A path template such as `"/users/:userId"`, matching any host.
    Path(String),
    /// A template with separate protocol, hostname and pathname parts.
    Template(UrlTemplate),
    /// A prebuilt matcher, registered verbatim.
    Matcher(Arc<dyn Matcher>),
}

impl From<&str> for PatternSpec {
    fn from(path: &str) -> PatternSpec {
        PatternSpec::Path(path.to_owned())
    }
}

impl From<String> for PatternSpec {
    fn from(path: String) -> PatternSpec {
        PatternSpec::Path(path)
    }
}

impl From<UrlTemplate> for PatternSpec {
    fn from(template: UrlTemplate) -> PatternSpec {
        PatternSpec::Template(template)
    }
}

impl From<Arc<dyn Matcher>> for PatternSpec {
    fn from(matcher: Arc<dyn Matcher>) -> PatternSpec {
        PatternSpec::Matcher(matcher)
    }
}

impl PatternSpec {
    /// Compiles the declaration under a scope prefix and the scope's hostnames, one pattern per
    /// hostname or a single any-host pattern when there are none.
    ///
    /// A template carrying its own hostname keeps it and ignores the scope's hostnames. A
    /// prebuilt matcher is opaque and is returned as is.
    pub(crate) fn compile(&self, prefix: &str, hostnames: &[String]) -> Result<Vec<Pattern>, Error> {
        let (protocol, hostname, pathname) = match self {
            PatternSpec::Path(path) => (None, None, path.as_str()),
            PatternSpec::Template(t) => (t.protocol.as_deref(), t.hostname.as_deref(), t.pathname.as_str()),
            PatternSpec::Matcher(m) => return Ok(vec![Pattern::Custom(Arc::clone(m))]),
        };

        let pathname = helpers::join_paths(prefix, pathname);

        let patterns = match hostname {
            Some(host) => vec![Pattern::compile(protocol, Some(host), &pathname)?],
            None if hostnames.is_empty() => vec![Pattern::compile(protocol, None, &pathname)?],
            None => hostnames
                .iter()
                .map(|host| Pattern::compile(protocol, Some(host), &pathname))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(patterns)
    }
}

/// A compiled route pattern.
#[derive(Clone)]
pub(crate) enum Pattern {
    Template(Arc<CompiledTemplate>),
    Custom(Arc<dyn Matcher>),
}

pub(crate) struct CompiledTemplate {
    source: String,
    protocol: Option<String>,
    hostname: Option<(Regex, Vec<String>)>,
    path: Regex,
    path_params: Vec<String>,
}

impl Pattern {
    fn compile(protocol: Option<&str>, hostname: Option<&str>, pathname: &str) -> Result<Pattern, Error> {
        let hostname = hostname.map(|h| h.trim().to_ascii_lowercase());

        let source = match hostname {
            Some(ref h) => format!("{}{}", h, pathname),
            None => pathname.to_owned(),
        };

        let host = match hostname {
            Some(ref h) if helpers::has_port(h) => {
                return Err(Error::invalid_pattern(source.as_str(), "hostname must not carry a port"));
            }
            Some(ref h) => Some(
                generate_exact_match_regex(h, TemplateKind::Hostname)
                    .map_err(|e| Error::invalid_pattern(source.as_str(), e))?,
            ),
            None => None,
        };

        let (path, path_params) = generate_exact_match_regex(pathname, TemplateKind::Path)
            .map_err(|e| Error::invalid_pattern(source.as_str(), e))?;

        Ok(Pattern::Template(Arc::new(CompiledTemplate {
            source,
            protocol: protocol.map(|p| p.trim_end_matches(':').to_ascii_lowercase()),
            hostname: host,
            path,
            path_params,
        })))
    }

    pub(crate) fn matches(&self, url: &RequestUrl) -> Option<Captures> {
        match self {
            Pattern::Template(t) => t.matches(url),
            Pattern::Custom(m) => m.matches(url),
        }
    }
}

impl Matcher for CompiledTemplate {
    fn matches(&self, url: &RequestUrl) -> Option<Captures> {
        if let Some(ref protocol) = self.protocol {
            if protocol != url.scheme() {
                return None;
            }
        }

        let mut params = RouteParams::with_capacity(self.path_params.len());

        if let Some((ref re, ref names)) = self.hostname {
            let caps = re.captures(url.host()?)?;
            collect_params(&caps, names, &mut params);
        }

        let caps = self.path.captures(url.path())?;
        collect_params(&caps, &self.path_params, &mut params);

        Some(Captures::new(url.href(), params))
    }
}

fn collect_params(caps: &regex::Captures<'_>, names: &[String], params: &mut RouteParams) {
    // Skip the first match because it's the whole input.
    for (name, group) in names.iter().zip(caps.iter().skip(1)) {
        if let Some(g) = group {
            params.set(name.as_str(), g.as_str());
        }
    }
}

impl Debug for CompiledTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ source: {:?}, protocol: {:?}, path_regex: {:?}, params: {:?} }}",
            self.source, self.protocol, self.path, self.path_params
        )
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Template(t) => f.write_str(&t.source),
            Pattern::Custom(m) => write!(f, "{:?}", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(host: &str, path: &str) -> RequestUrl {
        RequestUrl::new("http", Some(host), path, None)
    }

    #[test]
    fn reads_host_from_header_or_target() {
        let req = Request::builder()
            .uri("/a%20b?x=1")
            .header("Host", "Example.COM:8080")
            .body(())
            .unwrap();
        let u = RequestUrl::from_request(&req);
        assert_eq!(u.host(), Some("example.com"));
        assert_eq!(u.path(), "/a b");
        assert_eq!(u.query(), Some("x=1"));
        assert_eq!(u.href(), "http://example.com/a%20b?x=1");

        let req = Request::builder().uri("https://api.test/v1").body(()).unwrap();
        let u = RequestUrl::from_request(&req);
        assert_eq!(u.scheme(), "https");
        assert_eq!(u.host(), Some("api.test"));
    }

    #[test]
    fn path_spec_compiles_under_prefix() {
        let patterns = PatternSpec::from("users/:id/").compile("/api//v1/", &[]).unwrap();
        assert_eq!(patterns.len(), 1);

        let caps = patterns[0].matches(&url("any.test", "/api/v1/users/7")).unwrap();
        assert_eq!(caps.get("id"), Some("7"));
        assert_eq!(caps.url(), "http://any.test/api/v1/users/7");
        assert!(patterns[0].matches(&url("any.test", "/users/7")).is_none());
    }

    #[test]
    fn fans_out_per_scope_hostname() {
        let hosts = vec![String::from("a.test"), String::from("B.test")];
        let patterns = PatternSpec::from("/").compile("", &hosts).unwrap();
        assert_eq!(patterns.len(), 2);

        assert!(patterns[1].matches(&url("b.test", "/")).is_some());
        assert!(patterns.iter().all(|p| p.matches(&url("c.test", "/")).is_none()));
    }

    #[test]
    fn template_hostname_wins_over_scope() {
        let spec = PatternSpec::from(UrlTemplate::new("/").hostname(":tenant.example.com"));
        let patterns = spec.compile("", &[String::from("other.test")]).unwrap();
        assert_eq!(patterns.len(), 1);

        let caps = patterns[0].matches(&url("acme.example.com", "/")).unwrap();
        assert_eq!(caps.get("tenant"), Some("acme"));
    }

    #[test]
    fn template_protocol_is_checked() {
        let spec = PatternSpec::from(UrlTemplate::new("/secure").protocol("https:"));
        let patterns = spec.compile("", &[]).unwrap();
        assert!(patterns[0].matches(&url("x.test", "/secure")).is_none());
        assert!(patterns[0]
            .matches(&RequestUrl::new("https", Some("x.test"), "/secure", None))
            .is_some());
    }

    #[test]
    fn template_hostname_with_a_port_is_rejected() {
        let err = PatternSpec::from(UrlTemplate::new("/").hostname("localhost:3000"))
            .compile("", &[])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn hostname_pattern_requires_a_host() {
        let patterns = PatternSpec::from("/").compile("", &[String::from("a.test")]).unwrap();
        assert!(patterns[0].matches(&RequestUrl::new("http", None, "/", None)).is_none());
    }
}
