//! Signature matching for icsig.
//!
//! Averages a collected message set channel by channel and ranks catalog
//! entries by their sum-of-squared-error distance to that average.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod average;
pub mod distance;
pub mod rank;

pub use average::average;
pub use distance::{similarity, sse};
pub use rank::{compare, rank};
