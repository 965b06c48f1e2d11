use crate::constants::{ACCESS_CONTROL_ALLOW_PRIVATE_NETWORK, ACCESS_CONTROL_REQUEST_PRIVATE_NETWORK, CORS_DEFAULT_METHODS};
use crate::helpers;
use crate::middleware::{Middleware, Next};
use crate::types::{BoxFuture, Context, HandlerResult};
use crate::Error;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::{Method, Response, StatusCode};
use std::sync::Arc;
use tracing::trace;

/// Which origins may read responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowOrigin {
    /// Any origin, answered with `*`.
    Any,
    /// Only the listed origins; the request's `Origin` is echoed back when it is listed.
    List(Vec<String>),
}

/// Which request headers a preflight allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowHeaders {
    /// Echo the preflight's `Access-Control-Request-Headers`.
    Mirror,
    List(Vec<String>),
}

/// Configuration of the [`CorsMiddleware`].
///
/// The defaults allow any origin, the methods `GET,HEAD,PUT,PATCH,POST,DELETE` and any
/// requested header, without credentials.
#[derive(Debug, Clone)]
pub struct CorsOptions {
    preflight_continue: bool,
    allow_origin: AllowOrigin,
    allow_methods: Vec<Method>,
    allow_credentials: bool,
    allow_headers: AllowHeaders,
    expose_headers: Vec<String>,
    max_age: Option<u64>,
    allow_private_network: bool,
}

impl Default for CorsOptions {
    fn default() -> Self {
        CorsOptions {
            preflight_continue: false,
            allow_origin: AllowOrigin::Any,
            allow_methods: CORS_DEFAULT_METHODS.to_vec(),
            allow_credentials: false,
            allow_headers: AllowHeaders::Mirror,
            expose_headers: Vec::new(),
            max_age: None,
            allow_private_network: false,
        }
    }
}

impl CorsOptions {
    pub fn new() -> CorsOptions {
        CorsOptions::default()
    }

    /// Pass preflight requests on to the route instead of answering them with `204`.
    pub fn preflight_continue(mut self, enabled: bool) -> Self {
        self.preflight_continue = enabled;
        self
    }

    pub fn allow_origin(mut self, allow_origin: AllowOrigin) -> Self {
        self.allow_origin = allow_origin;
        self
    }

    /// Shorthand for `allow_origin(AllowOrigin::List(..))`.
    pub fn allow_origins<I, S>(self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_origin(AllowOrigin::List(origins.into_iter().map(Into::into).collect()))
    }

    pub fn allow_methods<I: IntoIterator<Item = Method>>(mut self, methods: I) -> Self {
        self.allow_methods = methods.into_iter().collect();
        self
    }

    pub fn allow_credentials(mut self, enabled: bool) -> Self {
        self.allow_credentials = enabled;
        self
    }

    pub fn allow_headers(mut self, allow_headers: AllowHeaders) -> Self {
        self.allow_headers = allow_headers;
        self
    }

    pub fn expose_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expose_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// How long, in seconds, a preflight result may be cached.
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn allow_private_network(mut self, enabled: bool) -> Self {
        self.allow_private_network = enabled;
        self
    }
}

/// Cross-Origin Resource Sharing for the routes it wraps.
///
/// An `OPTIONS` request carrying `Access-Control-Request-Method` is a preflight: it is answered
/// with `204 No Content` and the full set of CORS headers, without running the rest of the chain
/// (unless `preflight_continue` is set, in which case the route's response is decorated instead).
/// Any other request runs the chain and its response gets the origin, credentials and exposed
/// headers.
///
/// Register it globally, or on a group or route together with an `options` route so that
/// preflights find a match.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::body::Bytes;
/// use routeweave::middleware::{CorsMiddleware, CorsOptions};
/// use routeweave::Router;
///
/// # fn run() -> Router<Full<Bytes>> {
/// let cors = CorsMiddleware::new(
///     CorsOptions::new()
///         .allow_origins(["https://app.example.com"])
///         .allow_credentials(true)
///         .max_age(600),
/// )
/// .unwrap();
///
/// let router = Router::builder().middleware(cors).build().unwrap();
/// # router
/// # }
/// # run();
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    inner: Arc<CorsHeaders>,
}

#[derive(Debug)]
struct CorsHeaders {
    preflight_continue: bool,
    allow_origin: AllowOrigin,
    allow_credentials: bool,
    allow_methods: HeaderValue,
    allow_headers: Option<HeaderValue>,
    mirror_headers: bool,
    expose_headers: Option<HeaderValue>,
    max_age: Option<HeaderValue>,
    allow_private_network: bool,
}

struct RequestCors {
    origin: Option<HeaderValue>,
    preflight: bool,
    request_headers: Option<HeaderValue>,
    private_network: bool,
}

impl CorsMiddleware {
    /// Validates the options and prepares the header values. Fails when a header name or an
    /// origin can not be sent as a header value.
    pub fn new(options: CorsOptions) -> Result<CorsMiddleware, Error> {
        let methods = options
            .allow_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let (allow_headers, mirror_headers) = match options.allow_headers {
            AllowHeaders::Mirror => (None, true),
            AllowHeaders::List(ref list) => (joined_header_value(list)?, false),
        };

        if let AllowOrigin::List(ref origins) = options.allow_origin {
            for origin in origins {
                HeaderValue::from_str(origin).map_err(|_| Error::InvalidCorsConfig(format!("origin {:?}", origin)))?;
            }
        }

        let inner = CorsHeaders {
            preflight_continue: options.preflight_continue,
            allow_origin: options.allow_origin,
            allow_credentials: options.allow_credentials,
            allow_methods: HeaderValue::from_str(&methods)
                .map_err(|_| Error::InvalidCorsConfig(format!("methods {:?}", methods)))?,
            allow_headers,
            mirror_headers,
            expose_headers: joined_header_value(&options.expose_headers)?,
            max_age: options.max_age.map(HeaderValue::from),
            allow_private_network: options.allow_private_network,
        };

        Ok(CorsMiddleware { inner: Arc::new(inner) })
    }
}

fn joined_header_value(list: &[String]) -> Result<Option<HeaderValue>, Error> {
    if list.is_empty() {
        return Ok(None);
    }

    let joined = list.join(",");
    HeaderValue::from_str(&joined)
        .map(Some)
        .map_err(|_| Error::InvalidCorsConfig(format!("header list {:?}", joined)))
}

impl RequestCors {
    fn from_context<B>(ctx: &Context<B>) -> RequestCors {
        let headers = ctx.headers();

        RequestCors {
            origin: headers.get(header::ORIGIN).cloned(),
            preflight: helpers::normalize_request_method(ctx.method()) == Method::OPTIONS
                && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD),
            request_headers: headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS).cloned(),
            private_network: headers
                .get(ACCESS_CONTROL_REQUEST_PRIVATE_NETWORK)
                .map(|v| v.as_bytes().eq_ignore_ascii_case(b"true"))
                .unwrap_or(false),
        }
    }
}

impl CorsHeaders {
    fn apply_origin(&self, headers: &mut HeaderMap, req: &RequestCors) {
        let mut vary_origin = false;

        let mut allow_origin = match self.allow_origin {
            AllowOrigin::Any => Some(HeaderValue::from_static("*")),
            AllowOrigin::List(ref origins) => {
                vary_origin = true;
                req.origin
                    .as_ref()
                    .filter(|o| o.to_str().map(|o| origins.iter().any(|a| a == o)).unwrap_or(false))
                    .cloned()
            }
        };

        // The wildcard is not valid together with credentials.
        if self.allow_credentials && allow_origin.as_ref().map(|v| v == "*").unwrap_or(false) {
            if let Some(ref origin) = req.origin {
                allow_origin = Some(origin.clone());
                vary_origin = true;
            }
        }

        if vary_origin {
            helpers::append_vary(headers, "Origin");
        }

        if let Some(value) = allow_origin {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
    }

    fn apply_credentials(&self, headers: &mut HeaderMap) {
        if self.allow_credentials {
            headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
    }

    fn apply_exposed_headers(&self, headers: &mut HeaderMap) {
        if let Some(ref value) = self.expose_headers {
            headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, value.clone());
        }
    }

    fn apply_preflight(&self, headers: &mut HeaderMap, req: &RequestCors) {
        self.apply_origin(headers, req);
        self.apply_credentials(headers);

        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());

        if self.mirror_headers {
            helpers::append_vary(headers, "Access-Control-Request-Headers");
            if let Some(ref requested) = req.request_headers {
                headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            }
        } else if let Some(ref value) = self.allow_headers {
            headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value.clone());
        }

        if let Some(ref value) = self.max_age {
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, value.clone());
        }

        self.apply_exposed_headers(headers);

        if self.allow_private_network && req.private_network {
            headers.insert(ACCESS_CONTROL_ALLOW_PRIVATE_NETWORK, HeaderValue::from_static("true"));
        }
    }

    fn apply_actual(&self, headers: &mut HeaderMap, req: &RequestCors) {
        self.apply_origin(headers, req);
        self.apply_credentials(headers);
        self.apply_exposed_headers(headers);
    }
}

impl<B: Send + 'static> Middleware<B> for CorsMiddleware {
    fn call(&self, ctx: Context<B>, next: Next<B>) -> BoxFuture<HandlerResult> {
        let req = RequestCors::from_context(&ctx);
        let cors = Arc::clone(&self.inner);

        Box::pin(async move {
            if !req.preflight {
                let mut res = next.run(ctx).await?;
                cors.apply_actual(res.headers_mut(), &req);
                return Ok(res);
            }

            trace!(origin = ?req.origin, "Answering CORS preflight");

            let mut res = if cors.preflight_continue {
                next.run(ctx).await?
            } else {
                let mut res = Response::new(Full::new(Bytes::new()));
                *res.status_mut() = StatusCode::NO_CONTENT;
                res.headers_mut()
                    .insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
                res
            };

            cors.apply_preflight(res.headers_mut(), &req);
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, headers: &[(&str, &str)]) -> RequestCors {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.insert(header::HeaderName::from_bytes(k.as_bytes()).unwrap(), HeaderValue::from_str(v).unwrap());
        }

        RequestCors {
            origin: map.get(header::ORIGIN).cloned(),
            preflight: method == Method::OPTIONS && map.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD),
            request_headers: map.get(header::ACCESS_CONTROL_REQUEST_HEADERS).cloned(),
            private_network: map.contains_key(ACCESS_CONTROL_REQUEST_PRIVATE_NETWORK),
        }
    }

    fn headers_for(options: CorsOptions, req: &RequestCors) -> HeaderMap {
        let cors = CorsMiddleware::new(options).unwrap();
        let mut headers = HeaderMap::new();
        if req.preflight {
            cors.inner.apply_preflight(&mut headers, req);
        } else {
            cors.inner.apply_actual(&mut headers, req);
        }
        headers
    }

    #[test]
    fn default_preflight_headers() {
        let req = request(
            Method::OPTIONS,
            &[
                ("access-control-request-method", "POST"),
                ("access-control-request-headers", "x-token"),
            ],
        );
        let headers = headers_for(CorsOptions::default(), &req);

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,HEAD,PUT,PATCH,POST,DELETE");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "x-token");
        assert_eq!(headers[header::VARY], "Access-Control-Request-Headers");
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_CREDENTIALS));
        assert!(!headers.contains_key(header::ACCESS_CONTROL_MAX_AGE));
    }

    #[test]
    fn allow_list_echoes_listed_origins_only() {
        let options = CorsOptions::new().allow_origins(["https://a.test"]);

        let listed = request(Method::GET, &[("origin", "https://a.test")]);
        let headers = headers_for(options.clone(), &listed);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://a.test");
        assert_eq!(headers[header::VARY], "Origin");

        let unlisted = request(Method::GET, &[("origin", "https://evil.test")]);
        let headers = headers_for(options, &unlisted);
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(headers[header::VARY], "Origin");
    }

    #[test]
    fn credentials_downgrade_the_wildcard() {
        let req = request(Method::GET, &[("origin", "https://example.com")]);
        let headers = headers_for(CorsOptions::new().allow_credentials(true), &req);

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://example.com");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn configured_preflight_extras() {
        let req = request(
            Method::OPTIONS,
            &[
                ("access-control-request-method", "PUT"),
                ("access-control-request-private-network", "true"),
            ],
        );
        let options = CorsOptions::new()
            .allow_methods([Method::GET, Method::PUT])
            .allow_headers(AllowHeaders::List(vec![String::from("content-type"), String::from("x-token")]))
            .expose_headers(["x-total-count"])
            .max_age(600)
            .allow_private_network(true);
        let headers = headers_for(options, &req);

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,PUT");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type,x-token");
        assert_eq!(headers[header::ACCESS_CONTROL_EXPOSE_HEADERS], "x-total-count");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "600");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_PRIVATE_NETWORK], "true");
        assert!(!headers.contains_key(header::VARY));
    }

    #[test]
    fn actual_requests_only_get_origin_credentials_and_exposed_headers() {
        let req = request(Method::GET, &[("origin", "https://a.test")]);
        let options = CorsOptions::new().expose_headers(["x-total-count"]).max_age(10);
        let headers = headers_for(options, &req);

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_EXPOSE_HEADERS], "x-total-count");
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
        assert!(!headers.contains_key(header::ACCESS_CONTROL_MAX_AGE));
    }

    #[test]
    fn rejects_unsendable_header_values() {
        let options = CorsOptions::new().expose_headers(["bad\nheader"]);
        assert!(matches!(CorsMiddleware::new(options), Err(Error::InvalidCorsConfig(_))));
    }
}
