use crate::Error;
use http::uri::Authority;
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::Method;
use percent_encoding::percent_decode_str;
use std::any::Any;

/// Collapses duplicate slashes, trims the leading and trailing ones and re-prefixes a single
/// leading slash: `"users/"` becomes `"/users"` and `""` becomes `"/"`.
pub(crate) fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }

    if normalized.is_empty() {
        normalized.push('/');
    }

    normalized
}

/// Joins a scope prefix and a route path with exactly one separating slash.
pub(crate) fn join_paths(prefix: &str, path: &str) -> String {
    normalize_path(&format!("{}/{}", prefix, path))
}

/// Turns a registration method token into the canonical upper case `Method`.
pub(crate) fn normalize_method(token: &str) -> Result<Method, Error> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::InvalidMethod(token.to_owned()));
    }

    Method::from_bytes(token.to_ascii_uppercase().as_bytes()).map_err(|_| Error::InvalidMethod(token.to_owned()))
}

/// The canonical form of a request method, so `get`, `Get` and `GET` dispatch identically.
pub(crate) fn normalize_request_method(method: &Method) -> Method {
    let raw = method.as_str();
    if !raw.bytes().any(|b| b.is_ascii_lowercase()) {
        return method.clone();
    }

    Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).unwrap_or_else(|_| method.clone())
}

/// Whether a hostname template names a port. Request hosts are matched without theirs, so such a
/// template never matches.
pub(crate) fn has_port(host: &str) -> bool {
    host.parse::<Authority>().map_or(false, |a| a.port().is_some())
}

pub(crate) fn percent_decode_request_path(val: &str) -> String {
    percent_decode_str(val).decode_utf8_lossy().into_owned()
}

/// Adds `field` to the `Vary` header unless it is already listed or the header is `*`.
pub(crate) fn append_vary(headers: &mut HeaderMap, field: &str) {
    let existing = headers
        .get(header::VARY)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let value = match existing {
        None => field.to_owned(),
        Some(ref v) if v.trim() == "*" => return,
        Some(v) => {
            if v.split(',').any(|f| f.trim().eq_ignore_ascii_case(field)) {
                return;
            }
            format!("{}, {}", v, field)
        }
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(header::VARY, value);
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic payload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_paths() {
        assert_eq!(normalize_path("users/"), "/users");
        assert_eq!(normalize_path("//users///:id/"), "/users/:id");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn joins_with_a_single_slash() {
        assert_eq!(join_paths("/api/", "/users"), "/api/users");
        assert_eq!(join_paths("api", "users/"), "/api/users");
        assert_eq!(join_paths("/api", "/"), "/api");
        assert_eq!(join_paths("", ""), "/");
    }

    #[test]
    fn normalizes_method_tokens() {
        assert_eq!(normalize_method(" get ").unwrap(), Method::GET);
        assert_eq!(normalize_method("Patch").unwrap(), Method::PATCH);
        assert_eq!(normalize_method("purge").unwrap().as_str(), "PURGE");
        assert!(normalize_method("  ").is_err());
        assert!(normalize_method("GE T").is_err());
    }

    #[test]
    fn detects_hostnames_with_a_port() {
        assert!(has_port("localhost:3000"));
        assert!(has_port("[::1]:8080"));
        assert!(!has_port("api.example.com"));
        assert!(!has_port(":tenant.example.com"));
        assert!(!has_port("[::1]"));
    }

    #[test]
    fn appends_vary_fields_once() {
        let mut headers = HeaderMap::new();
        append_vary(&mut headers, "Origin");
        append_vary(&mut headers, "origin");
        append_vary(&mut headers, "Access-Control-Request-Headers");
        assert_eq!(headers[header::VARY], "Origin, Access-Control-Request-Headers");

        let mut headers = HeaderMap::new();
        headers.insert(header::VARY, HeaderValue::from_static("*"));
        append_vary(&mut headers, "Origin");
        assert_eq!(headers[header::VARY], "*");
    }
}
