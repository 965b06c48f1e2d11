//! Brings the traits needed to implement middleware and custom matchers into scope.
//!
//! ```
//! use routeweave::prelude::*;
//! ```

pub use crate::middleware::Middleware;
pub use crate::pattern::Matcher;
