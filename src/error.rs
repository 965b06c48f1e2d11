use hyper::{Method, StatusCode};

/// The error type used by route handlers, middleware and the error handler.
///
/// Handlers and middleware may fail with any error type; it is boxed into a `RouteError`
/// and can be recovered by downcasting, for example to [`Error`](enum.Error.html).
pub type RouteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The errors raised by the router itself.
///
/// `RouteNotFound` and `Http` reach the error handler at request time, the remaining
/// variants are returned from [`RouterBuilder::build`](./struct.RouterBuilder.html#method.build)
/// when a registration was rejected.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No registered route matched the request method and URL.
    #[error("No route found for {method} {path}")]
    RouteNotFound { method: Method, path: String },

    /// A structured error carrying the intended response status and message.
    #[error("{status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("Could not compile the route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid HTTP method token: {0:?}")]
    InvalidMethod(String),

    #[error("Invalid domain {0:?}")]
    InvalidDomain(String),

    #[error("Invalid CORS configuration: {0}")]
    InvalidCorsConfig(String),

    /// A route handler or a middleware panicked while processing the request.
    #[error("Request processing panicked: {0}")]
    Panicked(String),
}

impl Error {
    /// Creates a structured server error which the default error handler turns into a response
    /// with the given status and message.
    ///
    /// # Examples
    ///
    /// ```
    /// use hyper::StatusCode;
    /// use routeweave::Error;
    ///
    /// let err = Error::http(StatusCode::UNAUTHORIZED, "Missing token");
    /// assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    /// ```
    pub fn http<M: Into<String>>(status: StatusCode, message: M) -> Error {
        Error::Http {
            status,
            message: message.into(),
        }
    }

    /// The response status the default error handler uses for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Error::Http { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn invalid_pattern<P: Into<String>, R: ToString>(pattern: P, reason: R) -> Error {
        Error::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}
