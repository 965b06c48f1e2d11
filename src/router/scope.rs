use crate::helpers;
use crate::middleware::Middleware;
use crate::Error;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// The scope a [`group`](crate::RouterBuilder::group) registers its routes under: a path prefix,
/// virtual-host domains and group middleware. Every part is optional and is combined with the
/// enclosing groups.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::Response;
/// use hyper::body::Bytes;
/// use routeweave::{GroupOptions, RouteError, Router};
///
/// # fn run() -> Router<Full<Bytes>> {
/// let router = Router::builder()
///     .group(GroupOptions::new().prefix("/api").domains(["a.test", "b.test"]), |api| {
///         api.get("/users", |_| async move { Ok::<_, RouteError>(Response::new(Full::from("users"))) });
///     })
///     .build()
///     .unwrap();
/// # router
/// # }
/// # run();
/// ```
pub struct GroupOptions<B> {
    prefix: String,
    domains: Vec<String>,
    middlewares: Vec<Arc<dyn Middleware<B>>>,
}

impl<B> GroupOptions<B> {
    pub fn new() -> GroupOptions<B> {
        GroupOptions {
            prefix: String::new(),
            domains: Vec::new(),
            middlewares: Vec::new(),
        }
    }

    pub fn prefix<P: Into<String>>(mut self, prefix: P) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Restricts the group to a hostname, e.g. `"api.example.com"` or `":tenant.example.com"`.
    ///
    /// Requests are matched on their host without the port, so a domain carrying a port is a
    /// registration error.
    pub fn domain<D: Into<String>>(mut self, domain: D) -> Self {
        self.domains.push(domain.into());
        self
    }

    pub fn domains<I, D>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.domains.extend(domains.into_iter().map(Into::into));
        self
    }

    pub fn middleware<M: Middleware<B>>(mut self, m: M) -> Self {
        self.middlewares.push(Arc::new(m));
        self
    }
}

impl<B> Default for GroupOptions<B> {
    fn default() -> Self {
        GroupOptions::new()
    }
}

impl<B> Debug for GroupOptions<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ prefix: {:?}, domains: {:?}, middlewares: {} }}",
            self.prefix,
            self.domains,
            self.middlewares.len()
        )
    }
}

/// The effective scope of one nesting level: everything inherited from the enclosing frames plus
/// the level's own values, outer first.
pub(crate) struct ScopeFrame<B> {
    pub(crate) prefix: String,
    pub(crate) hostnames: Vec<String>,
    pub(crate) middlewares: Vec<Arc<dyn Middleware<B>>>,
}

impl<B> ScopeFrame<B> {
    fn root() -> ScopeFrame<B> {
        ScopeFrame {
            prefix: String::from("/"),
            hostnames: Vec::new(),
            middlewares: Vec::new(),
        }
    }
}

impl<B> Clone for ScopeFrame<B> {
    fn clone(&self) -> Self {
        ScopeFrame {
            prefix: self.prefix.clone(),
            hostnames: self.hostnames.clone(),
            middlewares: self.middlewares.clone(),
        }
    }
}

pub(crate) struct ScopeStack<B> {
    root: ScopeFrame<B>,
    frames: Vec<ScopeFrame<B>>,
}

impl<B> ScopeStack<B> {
    pub(crate) fn new() -> ScopeStack<B> {
        ScopeStack {
            root: ScopeFrame::root(),
            frames: Vec::new(),
        }
    }

    /// Pushes the combination of the current frame and `options`.
    pub(crate) fn enter(&mut self, options: GroupOptions<B>) -> Result<(), Error> {
        let current = self.current();

        let mut hostnames = current.hostnames.clone();
        for domain in options.domains {
            let domain = normalize_domain(&domain)?;
            if !hostnames.iter().any(|h| h.eq_ignore_ascii_case(&domain)) {
                hostnames.push(domain);
            }
        }

        let mut middlewares = current.middlewares.clone();
        middlewares.extend(options.middlewares);

        let frame = ScopeFrame {
            prefix: helpers::join_paths(&current.prefix, &options.prefix),
            hostnames,
            middlewares,
        };

        self.frames.push(frame);
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn current(&self) -> &ScopeFrame<B> {
        self.frames.last().unwrap_or(&self.root)
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }
}

fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim();
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.chars().any(char::is_whitespace)
        || helpers::has_port(trimmed)
    {
        return Err(Error::InvalidDomain(domain.to_owned()));
    }

    Ok(trimmed.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::from_fn;
    use crate::types::Context;
    use crate::middleware::Next;

    fn noop() -> impl Middleware<()> {
        from_fn(|ctx: Context<()>, next: Next<()>| next.run(ctx))
    }

    #[test]
    fn empty_stack_is_the_root_frame() {
        let stack = ScopeStack::<()>::new();
        assert_eq!(stack.current().prefix, "/");
        assert!(stack.current().hostnames.is_empty());
        assert!(stack.current().middlewares.is_empty());
    }

    #[test]
    fn frames_accumulate_outer_first() {
        let mut stack = ScopeStack::<()>::new();
        stack
            .enter(GroupOptions::new().prefix("api/").domain("A.test").middleware(noop()))
            .unwrap();
        stack
            .enter(GroupOptions::new().prefix("//v1").domains(["a.test", "b.test"]).middleware(noop()))
            .unwrap();

        let frame = stack.current();
        assert_eq!(frame.prefix, "/api/v1");
        assert_eq!(frame.hostnames, vec!["a.test", "b.test"]);
        assert_eq!(frame.middlewares.len(), 2);

        stack.exit();
        assert_eq!(stack.current().prefix, "/api");
        stack.exit();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn rejects_malformed_domains() {
        let mut stack = ScopeStack::<()>::new();
        assert!(matches!(
            stack.enter(GroupOptions::new().domain("  ")),
            Err(Error::InvalidDomain(_))
        ));
        assert!(matches!(
            stack.enter(GroupOptions::new().domain("a.test/api")),
            Err(Error::InvalidDomain(_))
        ));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn rejects_domains_with_a_port() {
        let mut stack = ScopeStack::<()>::new();
        assert!(matches!(
            stack.enter(GroupOptions::new().domain("localhost:3000")),
            Err(Error::InvalidDomain(_))
        ));
        assert!(matches!(
            stack.enter(GroupOptions::new().domain("[::1]:8080")),
            Err(Error::InvalidDomain(_))
        ));

        stack.enter(GroupOptions::new().domain(":tenant.example.com")).unwrap();
        assert_eq!(stack.current().hostnames, vec![":tenant.example.com"]);
    }
}
