//! Mesh topology client and upstream-closure resolver for faultloom.
//!
//! This crate provides:
//! - [`client::HttpMeshTopologyClient`], a token-cookie-authenticated client
//!   for the mesh introspection endpoint (services, per-service traffic
//!   graphs, mesh overview, traffic rates)
//! - [`upstream::resolve`], the cycle-safe transitive-upstream DFS (C7)
//!
//! # Example
//!
//! ```rust,ignore
//! use faultloom_mesh::client::HttpMeshTopologyClient;
//!
//! let client = HttpMeshTopologyClient::new("kiali.example.com", "config.json")?;
//! let overview = client.mesh_overview().await?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod client;
pub mod error;
pub mod upstream;

pub use client::HttpMeshTopologyClient;
pub use error::{Error, Result};
pub use upstream::{resolve, ReverseAdjacency};
