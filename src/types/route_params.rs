use std::collections::HashMap;

/// The named parameters captured by a route pattern, e.g. `:userId` in `/users/:userId`.
///
/// Values are percent-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    pub fn new() -> RouteParams {
        RouteParams::default()
    }

    pub fn with_capacity(capacity: usize) -> RouteParams {
        RouteParams(HashMap::with_capacity(capacity))
    }

    pub fn set<N: Into<String>, V: Into<String>>(&mut self, param_name: N, param_val: V) {
        self.0.insert(param_name.into(), param_val.into());
    }

    pub fn get<N: AsRef<str>>(&self, param_name: N) -> Option<&str> {
        self.0.get(param_name.as_ref()).map(String::as_str)
    }

    pub fn has<N: AsRef<str>>(&self, param_name: N) -> bool {
        self.0.contains_key(param_name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn params_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The result of a successful pattern match: the captured parameters plus the full matched URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    url: String,
    params: RouteParams,
}

impl Captures {
    pub fn new<U: Into<String>>(url: U, params: RouteParams) -> Captures {
        Captures {
            url: url.into(),
            params,
        }
    }

    /// The full URL the pattern matched against, e.g. `http://example.com/users/1?page=2`.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn get(&self, param_name: &str) -> Option<&str> {
        self.params.get(param_name)
    }
}
