//! Hello World Example
//!
//! Two small functions sharing one binary:
//!
//! - `hello`: an HTTP function behind the response normalizer, with CORS,
//!   claim injection and JSON body validation
//! - `greeted`: a pub/sub subscriber that only reacts to the `greetings` topic
//!
//! # Usage
//!
//! ```bash
//! echo '{"headers": {"origin": "https://app.example.com"},
//!        "requestContext": {"authorizer": {"domain": "acme"}},
//!        "body": "{\"name\": \"Ada\"}"}' \
//!     | cargo run --package hello-world -- hello
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cirrus::prelude::*;
use serde_json::{Value, json};
use tracing::info;

// ============================================================================
// Handler Functions
// ============================================================================

/// Greets the caller by name, in their tenant.
async fn say_hello(domain: Domain, Body(body): Body<Value>) -> Result<Value, HttpError> {
    let name = body["name"].as_str().unwrap_or_default();
    if name.is_empty() {
        return Err(HttpError::bad_request("name must not be empty"));
    }

    let greeting = body["greeting"].as_str().unwrap_or("Hello");
    Ok(json!({
        "message": format!("{greeting}, {name}!"),
        "domain": domain.as_str(),
    }))
}

/// Logs every greeting published on the topic.
async fn on_greeted(topic: TopicArn, Message(message): Message<Value>) -> Value {
    info!(topic = topic.as_str(), %message, "Greeting received");
    json!({ "received": message })
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Which {
    Hello,
    Greeted,
}

#[derive(Debug, Parser)]
#[command(about = "Runs one invocation of a demo function")]
struct Args {
    /// The function to invoke.
    function: Which,

    /// Read the event from this file instead of stdin.
    #[arg(long)]
    event: Option<PathBuf>,

    /// Request id reported to the handler.
    #[arg(long, default_value = "local-request")]
    request_id: String,
}

fn read_event(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read event file {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init()?;

    let raw_event = read_event(args.event.as_ref())?;
    let event: Value = serde_json::from_str(&raw_event).context("event is not valid JSON")?;

    match args.function {
        Which::Hello => {
            let function = Function::new(
                ServiceBuilder::new()
                    .layer(http_response())
                    .layer(allow_origin_response(r".*\.example\.com")?)
                    .layer(domain_aware())
                    .layer(body(&["name"], &["greeting"]))
                    .handler(say_hello),
            );
            let context = InvocationContext::new(
                args.request_id,
                "arn:aws:lambda:us-east-1:123456789012:function:demo.say_hello",
            );

            let response = function.respond(event, context).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Which::Greeted => {
            let function = Function::new(
                ServiceBuilder::new()
                    .layer(subscriber(&["greetings"]))
                    .handler(on_greeted),
            );
            let context = InvocationContext::new(
                args.request_id,
                "arn:aws:lambda:us-east-1:123456789012:function:demo.on_greeted",
            );

            let result = function.handle(event, context).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
