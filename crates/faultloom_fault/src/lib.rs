//! Fault-injection policy client for faultloom.
//!
//! This crate provides [`client::HttpFaultPolicyClient`], which creates and
//! deletes a two-rule mesh routing policy (abort-then-fallback) via the
//! mesh control plane, and [`policy::VirtualServicePolicy`], the typed
//! payload that enforces the abort rule being ordered before the fallback
//! route.
//!
//! # Example
//!
//! ```rust,ignore
//! use faultloom_fault::client::HttpFaultPolicyClient;
//!
//! let client = HttpFaultPolicyClient::new("istio.example.com")?;
//! client.apply("cartservice", "/hipstershop.CartService/GetCart", 50.0).await?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod client;
pub mod error;
pub mod policy;

pub use client::HttpFaultPolicyClient;
pub use error::{Error, Result};
pub use policy::VirtualServicePolicy;
