//! Per-invocation context for the handler pipeline.
//!
//! One [`HandlerContext`] is created for every incoming event and shared by
//! `Arc` through every layer down to the handler. It carries:
//!
//! - the read-only [`Event`] and [`InvocationContext`]
//! - the shared [`Resources`] (environment, collaborators)
//! - the **extras** map: named JSON values injected by decorators, the
//!   equivalent of keyword arguments for the handler
//! - a typed **state** map for injections that are not JSON, such as the
//!   configuration accessor
//!
//! Layers never talk to each other directly. Each re-derives what it needs
//! from the event and communicates with the handler only through the extras
//! and state maps.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::trace;

use cirrus_core::{Event, InvocationContext, Resources};

/// Names under which the built-in decorators inject their values.
pub mod keys {
    /// Deployment namespace, from the environment.
    pub const NAMESPACE: &str = "NAMESPACE";
    /// Domain claim of the authorizer.
    pub const DOMAIN: &str = "domain";
    /// Subject claim of the authorizer.
    pub const SUB: &str = "sub";
    /// Allowed request origin.
    pub const REQUEST_ORIGIN: &str = "request_origin";
    /// Parsed request body.
    pub const BODY: &str = "body";
    /// Topic ARN of a pub/sub record.
    pub const TOPIC_ARN: &str = "topic_arn";
    /// Decoded pub/sub message.
    pub const MESSAGE: &str = "message";
}

/// The context object passed through the layers to the handler.
///
/// # Example
///
/// ```rust,ignore
/// async fn handle(ctx: Arc<HandlerContext>) -> Value {
///     let origin = ctx.get_extra("request_origin");
///     json!({ "origin": origin, "request": ctx.invocation().request_id() })
/// }
/// ```
pub struct HandlerContext {
    event: Arc<Event>,
    invocation: Arc<InvocationContext>,
    resources: Arc<Resources>,
    extras: Mutex<Map<String, Value>>,
    state: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl HandlerContext {
    /// Creates a context with empty extras.
    pub fn new(
        event: impl Into<Arc<Event>>,
        invocation: impl Into<Arc<InvocationContext>>,
        resources: Arc<Resources>,
    ) -> Self {
        Self {
            event: event.into(),
            invocation: invocation.into(),
            resources,
            extras: Mutex::new(Map::new()),
            state: Mutex::new(HashMap::new()),
        }
    }

    // ─── Read-only inputs ─────────────────────────────────────────────────────

    /// Returns the inbound event.
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Returns a clone of the event `Arc`.
    pub fn event_arc(&self) -> Arc<Event> {
        self.event.clone()
    }

    /// Returns the invocation metadata.
    pub fn invocation(&self) -> &InvocationContext {
        &self.invocation
    }

    /// Returns a clone of the invocation metadata `Arc`.
    pub fn invocation_arc(&self) -> Arc<InvocationContext> {
        self.invocation.clone()
    }

    /// Returns the shared resources.
    pub fn resources(&self) -> &Arc<Resources> {
        &self.resources
    }

    /// Reads an environment value, fresh on every call.
    pub fn env_var(&self, name: &str) -> Option<String> {
        self.resources.env_var(name)
    }

    // ─── Extras ───────────────────────────────────────────────────────────────

    /// Injects a named value, replacing any earlier value of the same name.
    pub fn insert_extra(&self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        trace!(name = %name, "Injecting handler argument");
        self.extras.lock().insert(name, value.into());
    }

    /// Returns a copy of a named value.
    pub fn get_extra(&self, name: &str) -> Option<Value> {
        self.extras.lock().get(name).cloned()
    }

    /// Returns `true` if a value with this name was injected.
    pub fn has_extra(&self, name: &str) -> bool {
        self.extras.lock().contains_key(name)
    }

    /// Returns a snapshot of every injected value.
    pub fn extras(&self) -> Map<String, Value> {
        self.extras.lock().clone()
    }

    // ─── Typed state ──────────────────────────────────────────────────────────

    /// Stores a typed value. Only one value per type is kept.
    pub fn set_state<T: Send + Sync + 'static>(&self, value: T) {
        self.state.lock().insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a cloned typed value.
    pub fn get_state<T: Clone + 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// Returns `true` if a value of type `T` is stored.
    pub fn has_state<T: 'static>(&self) -> bool {
        self.state.lock().contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns a typed value.
    pub fn take_state<T: 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("event", &self.event)
            .field("invocation", &self.invocation)
            .field("extras", &*self.extras.lock())
            .finish_non_exhaustive()
    }
}
