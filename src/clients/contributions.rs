//! Commit aggregation across a user's repositories.
//!
//! Walks repositories -> branches -> commits, each level paged, and folds
//! the commits authored by the user into one [`CommitTally`] per
//! repository. Only the user's repository list is mandatory; everything
//! below it fails softly into the report's error list.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{QueryError, QueryErrorKind};
use crate::pager::fetch_all;
use crate::transport::{Request, Transport, PER_PAGE};
use crate::types::{BranchRecord, CommitRecord, CommitTally, ContributionReport, RepoRecord};
use crate::validate::Identifier;

/// Client for per-repository commit statistics of a user.
pub struct ContributionsClient {
    transport: Arc<dyn Transport>,
}

/// Repository coordinates taken from a decoded [`RepoRecord`].
struct RepoTarget {
    owner: String,
    name: String,
    full_name: String,
}

impl ContributionsClient {
    /// Create a new contributions client.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Count the commits `username` authored in each of their repositories.
    ///
    /// Every branch is walked independently, so a commit reachable from
    /// several branches is counted once per branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the first page of the
    /// user's repository list cannot be fetched.
    pub async fn list_repo_contributions(
        &self,
        username: &str,
    ) -> Result<ContributionReport, QueryError> {
        let username = Identifier::parse(username)?;
        info!(%username, "collecting repository contributions");

        let repos = fetch_all(
            self.transport.as_ref(),
            Request::path(format!("/users/{username}/repos"))
                .query("type", "all")
                .query("per_page", PER_PAGE),
            &format!("repositories of user '{username}'"),
        )
        .await?;

        let mut report = ContributionReport::default();
        report.errors.extend(repos.truncated);

        for item in repos.items {
            let Some(repo) = Self::decode_repo(item, &username, &mut report.errors) else {
                continue;
            };

            let tally = self.tally_repo(&repo, &username, &mut report.errors).await;
            debug!(repo = %repo.full_name, commits = tally.count(), "repository walked");

            if let Some(summary) = tally.finish(&repo.full_name) {
                report.summaries.insert(repo.full_name, summary);
            }
        }

        info!(
            %username,
            repositories = report.summaries.len(),
            errors = report.errors.len(),
            "contribution walk finished"
        );
        Ok(report)
    }

    fn decode_repo(
        item: Value,
        username: &Identifier,
        errors: &mut Vec<QueryError>,
    ) -> Option<RepoTarget> {
        let record: RepoRecord = match serde_json::from_value(item) {
            Ok(record) => record,
            Err(e) => {
                push(
                    errors,
                    QueryErrorKind::MalformedRecord(e.to_string())
                        .context(format!("repository entry for user '{username}'")),
                );
                return None;
            }
        };

        let Some(owner) = record.owner_login().map(str::to_string) else {
            push(
                errors,
                QueryErrorKind::MalformedRecord("repository has no owner login".to_string())
                    .context(format!("repository '{}'", record.name)),
            );
            return None;
        };

        let full_name = record
            .full_name
            .unwrap_or_else(|| format!("{owner}/{}", record.name));
        Some(RepoTarget {
            owner,
            name: record.name,
            full_name,
        })
    }

    async fn tally_repo(
        &self,
        repo: &RepoTarget,
        username: &Identifier,
        errors: &mut Vec<QueryError>,
    ) -> CommitTally {
        let mut tally = CommitTally::default();

        let branches = match fetch_all(
            self.transport.as_ref(),
            Request::path(format!("/repos/{}/{}/branches", repo.owner, repo.name))
                .query("per_page", PER_PAGE),
            &format!("branches for repository {}", repo.full_name),
        )
        .await
        {
            Ok(branches) => branches,
            Err(err) => {
                push(errors, err);
                return tally;
            }
        };
        if let Some(err) = branches.truncated {
            push(errors, err);
        }

        for item in branches.items {
            let branch: BranchRecord = match serde_json::from_value(item) {
                Ok(branch) => branch,
                Err(e) => {
                    push(
                        errors,
                        QueryErrorKind::MalformedRecord(e.to_string())
                            .context(format!("branch entry of repository {}", repo.full_name)),
                    );
                    continue;
                }
            };
            self.tally_branch(repo, &branch.name, username, &mut tally, errors)
                .await;
        }

        tally
    }

    async fn tally_branch(
        &self,
        repo: &RepoTarget,
        branch: &str,
        username: &Identifier,
        tally: &mut CommitTally,
        errors: &mut Vec<QueryError>,
    ) {
        let context = format!("commits on branch '{branch}' of repository {}", repo.full_name);
        let commits = match fetch_all(
            self.transport.as_ref(),
            Request::path(format!("/repos/{}/{}/commits", repo.owner, repo.name))
                .query("author", username.as_str())
                .query("per_page", PER_PAGE)
                .query("sha", branch),
            &context,
        )
        .await
        {
            Ok(commits) => commits,
            Err(err) if err.kind.is_empty_repository() => {
                debug!(repo = %repo.full_name, "repository is empty");
                return;
            }
            Err(err) => {
                push(errors, err);
                return;
            }
        };
        if let Some(err) = commits.truncated {
            push(errors, err);
        }

        for item in commits.items {
            match classify_commit(item, username) {
                Ok(Some(at)) => tally.record(at),
                Ok(None) => {}
                Err(kind) => push(errors, kind.context(context.as_str())),
            }
        }
    }
}

/// Decide whether a commit record counts for `username`.
///
/// Authorship is taken from the linked account login, compared without
/// regard to ASCII case. Returns the author date of a matching commit,
/// `None` for somebody else's commit.
fn classify_commit(
    item: Value,
    username: &Identifier,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, QueryErrorKind> {
    let commit: CommitRecord =
        serde_json::from_value(item).map_err(|e| QueryErrorKind::MalformedRecord(e.to_string()))?;

    let Some(login) = commit.author_login() else {
        let written_by = commit
            .commit
            .author
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("unknown author");
        return Err(QueryErrorKind::MalformedRecord(format!(
            "commit {} by '{written_by}' is not linked to a GitHub account",
            commit.sha
        )));
    };

    if !login.eq_ignore_ascii_case(username.as_str()) {
        return Ok(None);
    }

    commit.authored_at().map(Some)
}

fn push(errors: &mut Vec<QueryError>, err: QueryError) {
    warn!(error = %err, "recorded query error");
    errors.push(err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockResponse, MockTransport};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    const USER: &str = "octocat";

    fn client(mock: &MockTransport) -> ContributionsClient {
        ContributionsClient::new(Arc::new(mock.clone()))
    }

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn commit(sha: &str, login: &str, day: u32) -> Value {
        json!({
            "sha": sha,
            "author": { "login": login },
            "commit": { "author": { "name": login, "date": ts(day).to_rfc3339() } }
        })
    }

    fn repos(mock: &MockTransport, entries: Value) {
        mock.respond(&format!("/users/{USER}/repos"), MockResponse::json(entries));
    }

    fn branches(mock: &MockTransport, full_name: &str, names: &[&str]) {
        let body: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
        mock.respond(
            &format!("/repos/{full_name}/branches"),
            MockResponse::json(Value::Array(body)),
        );
    }

    fn commits_key(full_name: &str, branch: &str) -> String {
        format!("/repos/{full_name}/commits?author={USER}&per_page=100&sha={branch}")
    }

    fn repo(owner: &str, name: &str) -> Value {
        json!({ "name": name, "full_name": format!("{owner}/{name}"), "owner": { "login": owner } })
    }

    #[tokio::test]
    async fn test_counts_across_branches_and_keeps_latest() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "widgets")]));
        branches(&mock, "octo/widgets", &["main", "dev"]);
        mock.respond(
            &commits_key("octo/widgets", "main"),
            MockResponse::json(json!([
                commit("a1", USER, 3),
                commit("a2", USER, 2),
                commit("a3", USER, 1)
            ])),
        );
        mock.respond(
            &commits_key("octo/widgets", "dev"),
            MockResponse::json(json!([commit("b1", USER, 4), commit("b2", USER, 2)])),
        );

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        let summary = &report.summaries["octo/widgets"];
        assert_eq!(summary.commit_count, 5);
        assert_eq!(summary.last_commit, ts(4));
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_repo_without_matching_commits_is_omitted() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "widgets")]));
        branches(&mock, "octo/widgets", &["main"]);
        mock.respond(
            &commits_key("octo/widgets", "main"),
            MockResponse::json(json!([commit("c1", "someone-else", 1)])),
        );

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        assert!(report.summaries.is_empty());
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_repository_list_failure_is_fatal() {
        let mock = MockTransport::new();

        let err = client(&mock)
            .list_repo_contributions(USER)
            .await
            .unwrap_err();

        assert_eq!(err.context, "repositories of user 'octocat'");
        assert_eq!(err.kind.status(), Some(404));
    }

    #[tokio::test]
    async fn test_branch_failure_only_skips_that_repository() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "broken"), repo("octo", "fine")]));
        mock.respond("/repos/octo/broken/branches", MockResponse::status(500, "oops"));
        branches(&mock, "octo/fine", &["main"]);
        mock.respond(
            &commits_key("octo/fine", "main"),
            MockResponse::json(json!([commit("f1", USER, 7)])),
        );

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries["octo/fine"].commit_count, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].context, "branches for repository octo/broken");
    }

    #[tokio::test]
    async fn test_branch_commit_failure_does_not_stop_other_branches() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "widgets")]));
        branches(&mock, "octo/widgets", &["flaky", "main"]);
        mock.respond(&commits_key("octo/widgets", "flaky"), MockResponse::timeout());
        mock.respond(
            &commits_key("octo/widgets", "main"),
            MockResponse::json(json!([commit("m1", USER, 9)])),
        );

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        assert_eq!(report.summaries["octo/widgets"].commit_count, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0].kind, QueryErrorKind::Timeout(_)));
    }

    #[tokio::test]
    async fn test_failed_later_commit_page_keeps_first_page_count() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "widgets")]));
        branches(&mock, "octo/widgets", &["main"]);
        mock.respond(
            &commits_key("octo/widgets", "main"),
            MockResponse::json(json!([commit("p1", USER, 3), commit("p2", USER, 6)]))
                .with_next("commits-main-2"),
        );
        mock.respond("commits-main-2", MockResponse::status(502, "Bad Gateway"));

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        let summary = &report.summaries["octo/widgets"];
        assert_eq!(summary.commit_count, 2);
        assert_eq!(summary.last_commit, ts(6));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].context,
            "commits on branch 'main' of repository octo/widgets"
        );
        assert!(matches!(
            report.errors[0].kind,
            QueryErrorKind::PartialPage { page: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_invalid_username_makes_no_request() {
        let mock = MockTransport::new();

        let err = client(&mock)
            .list_repo_contributions("-octocat")
            .await
            .unwrap_err();

        assert!(matches!(err.kind, QueryErrorKind::InvalidIdentifier(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bad_date_on_foreign_commit_is_ignored() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "widgets")]));
        branches(&mock, "octo/widgets", &["main"]);
        mock.respond(
            &commits_key("octo/widgets", "main"),
            MockResponse::json(json!([
                {
                    "sha": "f1",
                    "author": { "login": "someone" },
                    "commit": { "author": { "name": "someone", "date": "garbage" } }
                },
                commit("k1", USER, 4)
            ])),
        );

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        assert_eq!(report.summaries["octo/widgets"].commit_count, 1);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_bad_date_on_own_commit_names_the_sha() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "widgets")]));
        branches(&mock, "octo/widgets", &["main"]);
        mock.respond(
            &commits_key("octo/widgets", "main"),
            MockResponse::json(json!([{
                "sha": "bad0",
                "author": { "login": USER },
                "commit": { "author": { "name": USER, "date": "garbage" } }
            }])),
        );

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        assert!(report.summaries.is_empty());
        assert_eq!(report.errors.len(), 1);
        match &report.errors[0].kind {
            QueryErrorKind::MalformedRecord(message) => assert!(message.contains("bad0")),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repo_without_owner_is_skipped() {
        let mock = MockTransport::new();
        repos(&mock, json!([{ "name": "orphan", "owner": null }]));

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        assert!(report.summaries.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].context, "repository 'orphan'");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unlinked_commit_is_recorded_not_counted() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "widgets")]));
        branches(&mock, "octo/widgets", &["main"]);
        mock.respond(
            &commits_key("octo/widgets", "main"),
            MockResponse::json(json!([
                {
                    "sha": "u1",
                    "author": null,
                    "commit": { "author": { "name": "Laptop User", "date": ts(5).to_rfc3339() } }
                },
                commit("k1", USER, 2)
            ])),
        );

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        assert_eq!(report.summaries["octo/widgets"].commit_count, 1);
        assert_eq!(report.summaries["octo/widgets"].last_commit, ts(2));
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].to_string().contains("Laptop User"));
    }

    #[tokio::test]
    async fn test_empty_repository_is_silent() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "blank")]));
        branches(&mock, "octo/blank", &["main"]);
        mock.respond(
            &commits_key("octo/blank", "main"),
            MockResponse::status(409, "Git Repository is empty."),
        );

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        assert!(report.summaries.is_empty());
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_same_name_under_different_owners() {
        let mock = MockTransport::new();
        repos(&mock, json!([repo("octo", "dotfiles"), repo("octocat", "dotfiles")]));
        for full_name in ["octo/dotfiles", "octocat/dotfiles"] {
            branches(&mock, full_name, &["main"]);
            mock.respond(
                &commits_key(full_name, "main"),
                MockResponse::json(json!([commit("d1", USER, 1)])),
            );
        }

        let report = client(&mock)
            .list_repo_contributions(USER)
            .await
            .expect("walk succeeds");

        let keys: Vec<&str> = report.summaries.keys().map(String::as_str).collect();
        assert_eq!(keys, ["octo/dotfiles", "octocat/dotfiles"]);
    }

    #[test]
    fn test_classify_commit_case_insensitive_login() {
        let username = Identifier::parse("OctoCat").unwrap();
        let at = classify_commit(commit("x", "octocat", 6), &username).unwrap();
        assert_eq!(at, Some(ts(6)));
    }

    #[test]
    fn test_classify_commit_missing_date() {
        let username = Identifier::parse(USER).unwrap();
        let item = json!({ "sha": "nd", "author": { "login": USER }, "commit": {} });
        assert!(matches!(
            classify_commit(item, &username),
            Err(QueryErrorKind::MalformedRecord(_))
        ));
    }
}
