//! Integration layer - External system interfaces.
//!
//! This module contains interfaces for integrating with external systems:
//! - Collaborator traits for object storage, key management and compute
//! - In-memory implementations for local runs
//! - The shared resource set handed to every invocation
//! - The encrypted configuration store

pub mod client;
pub mod configuration;
pub mod memory;
pub mod resources;

pub use client::{BlobStore, ClientError, ClientResult, FunctionInvoker, InvocationMode, KeyService};
pub use configuration::{
    ConfigurationDocument, ConfigurationError, ConfigurationResult, Connection, Setting, Settings,
    sanitize_passwords,
};
pub use memory::MemoryBlobStore;
pub use resources::{Resources, ResourcesBuilder};
