//! Origin allow-listing for browser callers.

use regex::Regex;
use tracing::warn;

use cirrus_core::{HttpError, InvocationResult, Reply};

use crate::context::{HandlerContext, keys};
use crate::decorator::{Decorator, DecoratorLayer};

/// Response header echoing the allowed origin.
pub const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";
/// Response header allowing credentials.
pub const ALLOW_CREDENTIALS_HEADER: &str = "Access-Control-Allow-Credentials";

/// Admits requests whose `Origin` header fully matches a pattern.
#[derive(Debug, Clone)]
pub struct AllowOrigin {
    pattern: Regex,
}

impl AllowOrigin {
    /// Compiles `pattern`, anchored so that it must match the whole origin.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }

    /// Whether `origin` is allowed.
    pub fn allows(&self, origin: &str) -> bool {
        self.pattern.is_match(origin)
    }
}

impl Decorator for AllowOrigin {
    type State = String;

    fn before(&self, ctx: &HandlerContext) -> InvocationResult<String> {
        let origin = ctx
            .event()
            .header("origin")
            .filter(|origin| !origin.is_empty());
        let Some(origin) = origin.filter(|origin| self.allows(origin)) else {
            warn!(origin, "Origin not allowed");
            return Err(HttpError::forbidden("Origin not allowed").into());
        };

        ctx.insert_extra(keys::REQUEST_ORIGIN, origin);
        Ok(origin.to_string())
    }

    fn after(&self, origin: String, reply: Reply) -> Reply {
        reply
            .with_header(ALLOW_ORIGIN_HEADER, origin)
            .with_header(ALLOW_CREDENTIALS_HEADER, "true")
    }
}

/// Layer type returned by [`allow_origin_response`].
pub type AllowOriginLayer = DecoratorLayer<AllowOrigin>;

/// Admits only origins fully matching `pattern` and adds the CORS response
/// headers to successful replies.
///
/// The `Origin` header is looked up case-insensitively and injected as
/// `request_origin`. A missing or non-matching origin fails with 403.
///
/// ```rust,ignore
/// let svc = ServiceBuilder::new()
///     .layer(http_response())
///     .layer(allow_origin_response(r".*\.example\.com")?)
///     .handler(handler);
/// ```
pub fn allow_origin_response(pattern: &str) -> Result<AllowOriginLayer, regex::Error> {
    AllowOrigin::new(pattern).map(DecoratorLayer::new)
}
