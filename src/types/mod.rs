//! Data model types for ghsearch.
//!
//! Reports returned to callers, plus the wire records the API responses are
//! decoded into. Every nested field GitHub may omit or null is an `Option`.

pub mod repos;
pub mod users;

// Re-exports
pub use repos::{
    AccountRef, BranchRecord, CommitDetail, CommitRecord, CommitTally, ContributionReport,
    GitSignature, RepoCommitSummary, RepoRecord,
};
pub use users::{MemberProfile, MemberReport, MemberRef, OrganizationRecord, UserRecord};
