//! Resource clients for ghsearch.

pub mod contributions;
pub mod orgs;
pub mod users;

// Re-exports
pub use contributions::ContributionsClient;
pub use orgs::OrgsClient;
pub use users::UsersClient;
