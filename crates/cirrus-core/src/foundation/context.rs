//! Invocation metadata.

use serde::{Deserialize, Serialize};

/// Read-only metadata about the current function invocation.
///
/// The invoked function ARN has the form
/// `arn:<partition>:lambda:<region>:<account>:function:<name>[:<qualifier>]`;
/// region, account and function name are parsed from it on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationContext {
    request_id: String,
    invoked_function_arn: String,
    function_name: Option<String>,
}

impl InvocationContext {
    /// Creates a context for one invocation.
    pub fn new(request_id: impl Into<String>, invoked_function_arn: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            invoked_function_arn: invoked_function_arn.into(),
            function_name: None,
        }
    }

    /// Overrides the function name instead of deriving it from the ARN.
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    /// The platform-assigned request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The full ARN the function was invoked through.
    pub fn invoked_function_arn(&self) -> &str {
        &self.invoked_function_arn
    }

    /// The function name, explicit or taken from the ARN.
    pub fn function_name(&self) -> Option<&str> {
        self.function_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.arn_segment(6))
    }

    /// The region segment of the ARN.
    pub fn region(&self) -> Option<&str> {
        self.arn_segment(3)
    }

    /// The account segment of the ARN.
    pub fn account_id(&self) -> Option<&str> {
        self.arn_segment(4)
    }

    /// A human-readable rendering of the function name.
    ///
    /// Only the last `.`-separated segment is kept, and `_` / `-` become
    /// spaces: `handlers.get_user` reads as `get user`.
    pub fn readable_function_name(&self) -> Option<String> {
        let name = self.function_name()?;
        let last = name.rsplit('.').next().unwrap_or(name);
        let readable = last.replace(['_', '-'], " ");
        let readable = readable.trim();
        (!readable.is_empty()).then(|| readable.to_string())
    }

    fn arn_segment(&self, index: usize) -> Option<&str> {
        self.invoked_function_arn
            .split(':')
            .nth(index)
            .filter(|segment| !segment.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:test-ns-get_user:live";

    #[test]
    fn test_arn_segments() {
        let ctx = InvocationContext::new("req-1", ARN);
        assert_eq!(ctx.request_id(), "req-1");
        assert_eq!(ctx.region(), Some("us-east-1"));
        assert_eq!(ctx.account_id(), Some("123456789012"));
        assert_eq!(ctx.function_name(), Some("test-ns-get_user"));
    }

    #[test]
    fn test_explicit_function_name_wins() {
        let ctx = InvocationContext::new("req-1", ARN).with_function_name("foo.my_func");
        assert_eq!(ctx.function_name(), Some("foo.my_func"));
        assert_eq!(ctx.readable_function_name().as_deref(), Some("my func"));
    }

    #[test]
    fn test_missing_metadata() {
        let ctx = InvocationContext::default();
        assert_eq!(ctx.function_name(), None);
        assert_eq!(ctx.region(), None);
        assert_eq!(ctx.readable_function_name(), None);
    }
}
