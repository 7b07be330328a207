//! ghsearch
//!
//! Aggregating queries over the GitHub REST API: the public members of an
//! organization with their profiles, and the repositories a user has
//! committed to with per-repository commit counts.
//!
//! Every collection is paged; the clients walk all pages and keep going when
//! a nested fetch fails, returning the partial result together with the list
//! of what went wrong.
//!
//! # Quick Start
//!
//! ```rust
//! use ghsearch::validate;
//!
//! assert!(validate("rust-lang").is_ok());
//! assert!(validate("-bad").is_err());
//! assert!(validate("help").is_err());
//! ```

pub mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod pager;
pub mod testing;
pub mod transport;
pub mod types;
pub mod validate;

// Re-exports
pub use client::GitHubClient;
pub use clients::{ContributionsClient, OrgsClient, UsersClient};
pub use config::{Config, ConfigError};
pub use error::{Error, QueryError, QueryErrorKind};
pub use pager::{fetch_all, Paged};
pub use transport::{HttpTransport, Request, Response, Transport};
pub use types::{
    ContributionReport, MemberProfile, MemberReport, RepoCommitSummary,
};
pub use validate::{validate, Identifier, InvalidIdentifier};
