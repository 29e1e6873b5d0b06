//! Pub/sub notification unpacking.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use cirrus_core::{EventSkipped, InvocationError, InvocationResult};

use crate::context::{HandlerContext, keys};
use crate::decorator::{Decorator, DecoratorLayer};

/// Errors raised for events that cannot be unpacked as notifications.
#[derive(Debug, Error)]
pub enum SubscriberError {
    /// The event has no `Records[0].Sns` entry with a topic and message.
    #[error("Unsupported event shape")]
    UnsupportedEventShape,

    /// The message is not a JSON-encoded string.
    #[error("could not decode message: {0}")]
    Decode(String),
}

/// Unpacks the first notification record of the event.
#[derive(Debug, Clone)]
pub struct Subscriber {
    required_topics: Arc<[String]>,
}

impl Subscriber {
    fn accepts(&self, topic_arn: &str) -> bool {
        self.required_topics.is_empty()
            || self
                .required_topics
                .iter()
                .any(|topic| topic_arn.ends_with(topic.as_str()))
    }
}

impl Decorator for Subscriber {
    type State = ();

    fn before(&self, ctx: &HandlerContext) -> InvocationResult<()> {
        let event = ctx.event();
        let Some(record) = event.first_sns_record() else {
            warn!("Event is not a notification record");
            return Err(InvocationError::other(SubscriberError::UnsupportedEventShape));
        };

        if !self.accepts(record.topic_arn) {
            debug!(topic_arn = record.topic_arn, "Topic not subscribed, skipping");
            return Err(EventSkipped::new(format!("topic {} not subscribed", record.topic_arn)).into());
        }

        let message: Value = match record.message {
            Value::String(raw) => serde_json::from_str::<Value>(raw)
                .map_err(|err| SubscriberError::Decode(err.to_string())),
            other => Err(SubscriberError::Decode(format!(
                "expected a JSON string, got {other}"
            ))),
        }
        .map_err(|err| {
            warn!(error = %err, "Notification message is not JSON");
            InvocationError::other(err)
        })?;

        ctx.insert_extra(keys::TOPIC_ARN, record.topic_arn);
        ctx.insert_extra(keys::MESSAGE, message);
        Ok(())
    }
}

/// Layer type returned by [`subscriber`].
pub type SubscriberLayer = DecoratorLayer<Subscriber>;

/// Injects `Records[0].Sns.TopicArn` as `topic_arn` and the JSON-decoded
/// `Records[0].Sns.Message` as `message`.
///
/// With a non-empty `required_topics`, events from a topic whose ARN does not
/// end with one of the names are skipped and the handler is not called.
pub fn subscriber(required_topics: &[&str]) -> SubscriberLayer {
    DecoratorLayer::new(Subscriber {
        required_topics: required_topics.iter().map(|t| t.to_string()).collect(),
    })
}
