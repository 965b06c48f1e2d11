use crate::data_map::DataMap;
use hyper::{HeaderMap, Method, Request, Uri, Version};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// A snapshot of the request head, taken before dispatch, for the
/// [error handler with info](./struct.RouterBuilder.html#method.err_handler_with_info).
#[derive(Clone)]
pub struct RequestInfo {
    inner: Arc<RequestInfoInner>,
    data: Arc<DataMap>,
}

struct RequestInfoInner {
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    version: Version,
}

impl RequestInfo {
    pub(crate) fn new_from_req<B>(req: &Request<B>, data: Arc<DataMap>) -> Self {
        let inner = RequestInfoInner {
            headers: req.headers().clone(),
            method: req.method().clone(),
            uri: req.uri().clone(),
            version: req.version(),
        };

        RequestInfo {
            inner: Arc::new(inner),
            data,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    pub fn version(&self) -> Version {
        self.inner.version
    }

    /// Access data which was shared by the [`RouterBuilder::data`](./struct.RouterBuilder.html#method.data) method.
    pub fn data<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.data.get::<T>()
    }
}

impl Debug for RequestInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ method: {:?}, uri: {:?}, version: {:?}, headers: {:?} }}",
            self.method(),
            self.uri(),
            self.version(),
            self.headers()
        )
    }
}
