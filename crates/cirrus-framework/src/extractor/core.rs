use std::sync::Arc;

use cirrus_core::{Event, ExtractResult, InvocationContext, Resources};

use crate::context::HandlerContext;

/// A trait for types that can be extracted from a [`HandlerContext`].
///
/// This is the core abstraction that enables the Cirrus framework's parameter
/// injection system. Types implementing this trait can be used directly as
/// handler function parameters.
///
/// # Error Handling
///
/// The extraction can fail (returning `Err`) if the required data is not
/// available in the context, which means the decorator chain does not match
/// the handler's signature. The failure travels through the pipeline's error
/// channel and is reported as an unhandled error.
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self>;
}

/// Extracts the raw inbound event.
impl FromContext for Arc<Event> {
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
        Ok(ctx.event_arc())
    }
}

/// Extracts the invocation metadata.
impl FromContext for Arc<InvocationContext> {
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
        Ok(ctx.invocation_arc())
    }
}

/// Extracts the shared resources.
impl FromContext for Arc<Resources> {
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
        Ok(ctx.resources().clone())
    }
}

/// Implementation for `Option<T>` where `T: FromContext`.
///
/// This allows handlers to have optional parameters that may or may not
/// be extractable from the context.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

/// Extracts the whole context, for handlers that inspect extras themselves.
impl FromContext for Arc<HandlerContext> {
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
        Ok(ctx.clone())
    }
}
