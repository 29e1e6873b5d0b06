//! Decorators that read claims placed on the request by the upstream authorizer.
//!
//! A missing claim means the authorizer is misconfigured rather than that the
//! client misbehaved, so these decorators fail with 500.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use cirrus_core::{HttpError, InvocationResult};

use crate::context::{HandlerContext, keys};
use crate::decorator::{Decorator, DecoratorLayer};

fn required_claim(ctx: &HandlerContext, claim: &str) -> InvocationResult<Value> {
    ctx.event()
        .authorizer_claim(claim)
        .cloned()
        .ok_or_else(|| {
            warn!(claim, "Authorizer claim missing");
            HttpError::internal(format!("missing {claim}")).into()
        })
}

// ============================================================================
// Single-claim injection
// ============================================================================

/// Injects one authorizer claim under a fixed name.
#[derive(Debug, Clone, Copy)]
pub struct ClaimAware {
    claim: &'static str,
}

impl Decorator for ClaimAware {
    type State = ();

    fn before(&self, ctx: &HandlerContext) -> InvocationResult<()> {
        let value = required_claim(ctx, self.claim)?;
        ctx.insert_extra(self.claim, value);
        Ok(())
    }
}

/// Layer type returned by [`domain_aware`] and [`sub_aware`].
pub type ClaimAwareLayer = DecoratorLayer<ClaimAware>;

/// Injects `requestContext.authorizer.domain` as `domain`.
pub fn domain_aware() -> ClaimAwareLayer {
    DecoratorLayer::new(ClaimAware { claim: keys::DOMAIN })
}

/// Injects `requestContext.authorizer.sub` as `sub`.
pub fn sub_aware() -> ClaimAwareLayer {
    DecoratorLayer::new(ClaimAware { claim: keys::SUB })
}

// ============================================================================
// Scopes
// ============================================================================

/// Requires the caller to hold every listed scope.
#[derive(Debug, Clone)]
pub struct Scopes {
    required: Arc<[String]>,
}

impl Decorator for Scopes {
    type State = ();

    fn before(&self, ctx: &HandlerContext) -> InvocationResult<()> {
        let Some(claim) = ctx
            .event()
            .authorizer_claim("scopes")
            .and_then(Value::as_str)
        else {
            warn!("Authorizer scopes claim missing");
            return Err(HttpError::internal("missing scopes").into());
        };

        let granted: HashSet<&str> = claim.split_whitespace().collect();
        if let Some(scope) = self
            .required
            .iter()
            .find(|scope| !granted.contains(scope.as_str()))
        {
            warn!(scope = %scope, granted = claim, "Insufficient scopes");
            return Err(HttpError::forbidden("insufficient scopes").into());
        }
        Ok(())
    }
}

/// Layer type returned by [`scopes`].
pub type ScopesLayer = DecoratorLayer<Scopes>;

/// Requires the space-delimited `requestContext.authorizer.scopes` claim to
/// contain every scope in `required`.
///
/// Fails with 500 "missing scopes" when the claim is absent and with 403
/// "insufficient scopes" when any scope is not granted.
pub fn scopes<I>(required: I) -> ScopesLayer
where
    I: IntoIterator,
    I::Item: ToString,
{
    DecoratorLayer::new(Scopes {
        required: required.into_iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;
    use crate::layers::test_support::{context, run_echo};
    use cirrus_core::{InvocationError, Reply};
    use serde_json::json;

    fn run<D: Decorator>(layer: DecoratorLayer<D>, event: Value) -> Result<Reply, InvocationError> {
        run_echo(layer, context(event))
    }

    fn authorizer(claims: Value) -> Value {
        json!({"requestContext": {"authorizer": claims}})
    }

    fn status_and_body(err: InvocationError) -> (u16, String) {
        let (code, body) = err.status_parts().unwrap();
        (code, body.as_str().unwrap_or_default().to_string())
    }

    #[test]
    fn test_domain_aware() {
        let reply = run(domain_aware(), authorizer(json!({"domain": "test.com"}))).unwrap();
        assert_eq!(reply.body()["domain"], json!("test.com"));

        let err = run(domain_aware(), json!({})).unwrap_err();
        assert_eq!(status_and_body(err).0, 500);
    }

    #[test]
    fn test_sub_aware() {
        let reply = run(sub_aware(), authorizer(json!({"sub": "uuid"}))).unwrap();
        assert_eq!(reply.body()["sub"], json!("uuid"));

        let err = run(sub_aware(), authorizer(json!({}))).unwrap_err();
        assert_eq!(status_and_body(err).0, 500);
    }

    #[test]
    fn test_scopes_granted() {
        let event = authorizer(json!({"scopes": "read write"}));
        assert!(run(scopes(["read", "write"]), event.clone()).is_ok());
        assert!(run(scopes(Vec::<String>::new()), event).is_ok());
    }

    #[test]
    fn test_scopes_insufficient() {
        let event = authorizer(json!({"scopes": "read"}));
        let (code, body) = status_and_body(run(scopes(["read", "write"]), event).unwrap_err());
        assert_eq!(code, 403);
        assert!(body.contains("insufficient"));
    }

    #[test]
    fn test_scopes_missing_claim() {
        let (code, body) =
            status_and_body(run(scopes(Vec::<String>::new()), authorizer(json!({}))).unwrap_err());
        assert_eq!(code, 500);
        assert!(body.contains("missing"));
    }

    #[test]
    fn test_scopes_accept_displayable_values() {
        struct Castable;

        impl fmt::Display for Castable {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("castable")
            }
        }

        let event = authorizer(json!({"scopes": "castable"}));
        assert!(run(scopes([Castable]), event).is_ok());
    }
}
