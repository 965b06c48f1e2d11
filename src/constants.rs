use hyper::header::HeaderName;
use hyper::Method;

pub(crate) const NOT_FOUND_BODY: &str = "Not Found";
pub(crate) const INTERNAL_SERVER_ERROR_BODY: &str = "Internal Server Error";

// Private Network Access headers are not part of `http::header` yet.
pub(crate) const ACCESS_CONTROL_REQUEST_PRIVATE_NETWORK: HeaderName =
    HeaderName::from_static("access-control-request-private-network");
pub(crate) const ACCESS_CONTROL_ALLOW_PRIVATE_NETWORK: HeaderName =
    HeaderName::from_static("access-control-allow-private-network");

/// Methods registered by [`RouterBuilder::all`](crate::RouterBuilder::all).
pub(crate) const ALL_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::CONNECT,
    Method::TRACE,
];

/// Default `Access-Control-Allow-Methods` set of the CORS middleware.
pub(crate) const CORS_DEFAULT_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::PUT,
    Method::PATCH,
    Method::POST,
    Method::DELETE,
];
