//! GitHub Issues provider implementation.

use octocrab::Octocrab;
use octocrab::models::IssueState as GitHubIssueState;
use octocrab::params;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{Config, RemoteConfig};
use crate::error::{HermesError, Result};
use crate::types::{CachedIssue, FieldChanges, IssueState};

use super::RemoteProvider;
use super::error::classify_github_error;

/// GitHub Issues provider bound to one repository
pub struct GitHubProvider {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubProvider {
    /// Create a new GitHub provider from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.token().ok_or_else(|| {
            HermesError::Auth(
                "no token configured. Set HERMES_TOKEN or GITHUB_TOKEN, or run: hermes config set auth.token <token>"
                    .to_string(),
            )
        })?;
        Self::new(&token, config.remote()?)
    }

    pub fn new(token: &SecretString, remote: &RemoteConfig) -> Result<Self> {
        if remote.owner.is_empty() || remote.repo.is_empty() {
            return Err(HermesError::Config(
                "remote.owner and remote.repo must both be set".to_string(),
            ));
        }

        let client = Octocrab::builder()
            .personal_token(token.expose_secret().to_string())
            .build()
            .map_err(|e| HermesError::Api(format!("Failed to create GitHub client: {e}")))?;

        Ok(Self {
            client,
            owner: remote.owner.clone(),
            repo: remote.repo.clone(),
        })
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl RemoteProvider for GitHubProvider {
    async fn update_issue(&self, id: u64, changes: &FieldChanges) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let state = changes.state.map(|s| match s {
            IssueState::Open => GitHubIssueState::Open,
            IssueState::Closed => GitHubIssueState::Closed,
        });

        let issues_handler = self.client.issues(&self.owner, &self.repo);
        let mut update = issues_handler.update(id);
        if let Some(title) = &changes.title {
            update = update.title(title);
        }
        if let Some(body) = &changes.body {
            update = update.body(body);
        }
        if let Some(state) = state {
            update = update.state(state);
        }
        if let Some(labels) = &changes.labels {
            update = update.labels(labels);
        }

        update
            .send()
            .await
            .map_err(|e| classify_github_error(e, &format!("update issue #{id}")))?;
        Ok(())
    }

    async fn create_comment(&self, id: u64, body: &str) -> Result<()> {
        self.client
            .issues(&self.owner, &self.repo)
            .create_comment(id, body)
            .await
            .map_err(|e| classify_github_error(e, &format!("comment on issue #{id}")))?;
        Ok(())
    }

    async fn replace_labels(&self, id: u64, labels: &[String]) -> Result<()> {
        self.client
            .issues(&self.owner, &self.repo)
            .replace_all_labels(id, labels)
            .await
            .map_err(|e| classify_github_error(e, &format!("replace labels on issue #{id}")))?;
        Ok(())
    }

    async fn list_issues(&self) -> Result<Vec<CachedIssue>> {
        let first_page = self
            .client
            .issues(&self.owner, &self.repo)
            .list()
            .state(params::State::All)
            .per_page(100)
            .send()
            .await
            .map_err(|e| classify_github_error(e, "list issues"))?;

        let issues = self
            .client
            .all_pages(first_page)
            .await
            .map_err(|e| classify_github_error(e, "list issues"))?;

        Ok(issues
            .iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(convert_github_issue)
            .collect())
    }
}

fn convert_github_issue(issue: &octocrab::models::issues::Issue) -> CachedIssue {
    let state = match issue.state {
        GitHubIssueState::Closed => IssueState::Closed,
        _ => IssueState::Open,
    };

    CachedIssue {
        id: issue.number,
        title: issue.title.clone(),
        body: issue.body.clone().unwrap_or_default(),
        state,
        labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
        updated_at: issue.updated_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> RemoteConfig {
        RemoteConfig {
            owner: "acme".to_string(),
            repo: "game".to_string(),
        }
    }

    #[tokio::test]
    async fn test_github_provider_new() {
        let provider = GitHubProvider::new(&SecretString::from("test_token"), &remote()).unwrap();
        assert_eq!(provider.repository(), "acme/game");
    }

    #[tokio::test]
    async fn test_github_provider_requires_repo() {
        let incomplete = RemoteConfig {
            owner: "acme".to_string(),
            repo: String::new(),
        };
        assert!(matches!(
            GitHubProvider::new(&SecretString::from("t"), &incomplete),
            Err(HermesError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_without_remote() {
        let mut config = Config::default();
        config.set("auth.token", "t").unwrap();
        assert!(GitHubProvider::from_config(&config).is_err());
    }
}
