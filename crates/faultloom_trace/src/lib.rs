//! Trace store access and the span/chunk data model for faultloom.
//!
//! This crate provides:
//! - The `Span`/`SpanReference`/`Chunk` data model shared by every other
//!   faultloom crate
//! - An HTTP-backed trace store client that streams traces from a
//!   Jaeger-like trace store
//! - Chunk persistence (`query_chunks`) used both during a live experiment
//!   and when replaying one from disk
//!
//! # Example
//!
//! ```rust,ignore
//! use faultloom_trace::HttpTraceStoreClient;
//!
//! let client = HttpTraceStoreClient::new("localhost:16686")?;
//! let services = client.list_services(std::path::Path::new("data/experiments")).await?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod chunk;
pub mod client;
pub mod error;
pub mod span;

pub use chunk::Chunk;
pub use client::HttpTraceStoreClient;
pub use error::{Error, Result};
pub use span::{AttributeValue, ReferenceType, Span, SpanReference};
