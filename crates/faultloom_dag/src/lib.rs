//! DAG construction and the graph transcript used to drive subgraph mining.
//!
//! This crate provides:
//! - [`Dag`], built from a trace's spans by [`builder::trace_to_dag`]
//! - [`labels::LabelTable`], the shared string-to-int interner used for both
//!   vertex (service) and edge (operation) labels
//! - [`transcript`], which serializes many DAGs to the line-oriented format
//!   the external miner reads, and parses its ranked output back
//! - [`artifact`], which writes the transcript and label tables to an
//!   experiment directory
//!
//! # Example
//!
//! ```rust,ignore
//! use faultloom_dag::builder::trace_to_dag;
//!
//! let dag = trace_to_dag(&spans)?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod artifact;
pub mod builder;
pub mod dag;
pub mod error;
pub mod labels;
pub mod transcript;

pub use dag::{Dag, Edge, Vertex};
pub use error::{Error, Result};
pub use labels::LabelTable;
