//! Subgraph-mining subprocess driver for faultloom.
//!
//! This crate provides [`driver::MinerDriver`], which invokes the external
//! frequent-subgraph-mining executable, places it in its own process
//! group, and enforces a wall-clock timeout by signalling that group if the
//! child hasn't exited in time. A timeout is not treated as a failure:
//! whatever the miner wrote before being signalled is accepted.
//!
//! # Example
//!
//! ```rust,ignore
//! use faultloom_miner::driver::MinerDriver;
//!
//! let driver = MinerDriver::new("./mine.sh");
//! driver.run("traces.data".as_ref(), "traces.result".as_ref()).await?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod driver;
pub mod error;

pub use driver::MinerDriver;
pub use error::{Error, Result};
