//! Acquisition side of icsig.
//!
//! Reads reading vectors from the IC test fixture over a serial line,
//! loads layered configuration, sets up logging, and handles the
//! reference photos stored alongside catalog entries.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod collector;
pub mod config;
pub mod error;
pub mod logging;
pub mod photo;
pub mod worker;

pub use collector::{Feed, SampleCollector};
pub use config::Config;
pub use error::{AcquireError, AcquireResult};
pub use worker::{
    available_ports, collect, collect_from_port, spawn_collection, spawn_collection_from,
    CollectOptions, CollectOutcome, CollectionHandle, Progress, SerialSettings,
};
