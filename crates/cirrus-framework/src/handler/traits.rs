//! Handler system for the Cirrus framework.
//!
//! This module defines the [`Handler`] trait. It is implemented for async
//! functions of different arities through a blanket macro, similar to Axum's
//! handler system.
//!
//! # Example
//!
//! ```rust,ignore
//! use cirrus_framework::{Body, Domain};
//!
//! // No parameters
//! async fn health() -> &'static str {
//!     "ok"
//! }
//!
//! // Injected values
//! async fn create(domain: Domain, Body(item): Body<Value>) -> Value {
//!     json!({ "domain": domain.as_str(), "item": item })
//! }
//!
//! // Fallible
//! async fn get(extras: Extras) -> Result<Value, HttpError> {
//!     let id = extras.get_str("id").ok_or_else(|| HttpError::bad_request("Invalid id"))?;
//!     Ok(json!({ "id": id }))
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use cirrus_core::{IntoReply, InvocationResult, Reply};

use crate::context::HandlerContext;
use crate::extractor::FromContext;

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for handlers in the Cirrus framework.
///
/// # Blanket Implementation
///
/// This trait is automatically implemented for async functions that:
/// - Take 0-12 parameters that implement [`FromContext`]
/// - Return a type that implements [`IntoReply`]
///
/// Every parameter is extracted before the function runs. The first failed
/// extraction aborts the call with an [`ExtractError`](cirrus_core::ExtractError).
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Call the handler with the given context.
    async fn call(self, ctx: Arc<HandlerContext>) -> InvocationResult<Reply>;
}

// ============================================================================
// Handler implementations for functions (Axum-style)
// ============================================================================

/// Macro to generate Handler implementations for functions with different arities.
macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_variables)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoReply,
            $( $ty: FromContext + Send + 'static, )*
        {
            async fn call(self, ctx: Arc<HandlerContext>) -> InvocationResult<Reply> {
                $(
                    let $ty = $ty::from_context(&ctx)?;
                )*

                (self)($($ty,)*).await.into_reply()
            }
        }
    };
}

// Generate implementations for 0-12 parameters
impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);
