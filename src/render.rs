//! Plain-text rendering of query reports.

use std::fmt::Write;

use ghsearch::{ContributionReport, MemberProfile, MemberReport, QueryError};

/// Width of name columns.
pub const FILL: usize = 40;
/// Width of count columns.
pub const INT_FILL: usize = 20;

/// One profile as aligned columns: login, real name, email.
pub fn profile_line(profile: &MemberProfile, fill: usize) -> String {
    let mut line = format!("{:<fill$}", profile.username);
    let _ = write!(line, " {:<fill$}", profile.real_name.as_deref().unwrap_or(""));
    if let Some(email) = &profile.email {
        let _ = write!(line, " {email}");
    }
    line.trim_end().to_string()
}

pub fn members(org: &str, report: &MemberReport) -> String {
    let mut out = format!("Members for '{org}':\n");
    let _ = writeln!(
        out,
        "{:<FILL$} {:<FILL$} ------Emails------\n",
        "------Usernames------", "------Real Names------"
    );

    if report.members.is_empty() {
        let _ = writeln!(out, "No public members for organization '{org}'");
    } else {
        for member in &report.members {
            let _ = writeln!(out, "{}", profile_line(member, FILL));
        }
        let _ = writeln!(
            out,
            "\nTotal members for organization '{org}': {}",
            report.members.len()
        );
    }
    out
}

pub fn contributions(profile: &MemberProfile, report: &ContributionReport) -> String {
    let mut out = format!("{}\n", profile_line(profile, FILL));

    if report.summaries.is_empty() {
        let _ = writeln!(out, "No repos with commits found for user");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<FILL$} {:<INT_FILL$} -----Last Commit-----\n",
        "------Repo Name------", "---Total Commits---"
    );
    for summary in report.summaries.values() {
        let _ = writeln!(
            out,
            "{:<FILL$} {:<INT_FILL$} {}",
            summary.repository_full_name,
            summary.commit_count,
            summary.last_commit.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    out
}

/// Accumulated errors, one per line, preceded by a heading. Empty when
/// there is nothing to report.
pub fn errors(errors: &[QueryError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = String::from("Errors from query:\n");
    for err in errors {
        let _ = writeln!(out, "{err}");
    }
    out
}
