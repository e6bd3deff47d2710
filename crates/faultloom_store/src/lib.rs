//! Experiment directory layout and atomic file IO for faultloom.
//!
//! This crate provides:
//! - `ExperimentPaths`, which centralizes every path in the
//!   `data/experiments/<unix-ts>/...` layout so no other crate
//!   string-concatenates a path by hand
//! - Single-write-call file IO, with JSON reads that fail loudly on
//!   malformed content instead of silently falling back to a default
//!
//! # Example
//!
//! ```rust,ignore
//! use faultloom_store::ExperimentPaths;
//!
//! let paths = ExperimentPaths::new_now("data/experiments")?;
//! std::fs::create_dir_all(paths.root())?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod atomic;
pub mod error;
pub mod paths;

pub use error::{Error, Result};
pub use paths::ExperimentPaths;
