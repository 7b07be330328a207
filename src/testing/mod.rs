//! Testing utilities for ghsearch.
//!
//! Provides a mock transport for testing applications that use the
//! aggregation clients without reaching the GitHub API.

mod mock;

pub use mock::{MockCall, MockResponse, MockTransport};
