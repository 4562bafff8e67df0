// Typed GitHub API fetchers for the snapshot producer.
// Derived counts come from Link-header pagination totals on one-item pages.

use serde_json::Value;

use crate::error::{Result, VitrineError};

use super::client::GitHubClient;
use super::types::{ApiRepo, ApiUser};

impl GitHubClient {
    /// Fetch a user's public profile.
    pub async fn get_user(&mut self, login: &str) -> Result<ApiUser> {
        let response = self.get(&format!("/users/{login}")).await?;
        Ok(response.json().await?)
    }

    /// Fetch one page of a user's repositories, most recently updated first.
    pub async fn get_user_repos(
        &mut self,
        login: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ApiRepo>> {
        let params = [
            ("sort", "updated"),
            ("direction", "desc"),
            ("page", &page.to_string()),
            ("per_page", &per_page.to_string()),
        ];
        let response = self
            .get_with_params(&format!("/users/{login}/repos"), &params)
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch a single repository. This is the only endpoint that carries the
    /// subscriber (watcher) count.
    pub async fn get_repo(&mut self, full_name: &str) -> Result<ApiRepo> {
        let response = self.get(&format!("/repos/{full_name}")).await?;
        Ok(response.json().await?)
    }

    /// Total commits on the default branch.
    pub async fn get_commit_count(&mut self, full_name: &str) -> Result<u64> {
        self.count_collection(&format!("/repos/{full_name}/commits"), &[])
            .await
    }

    /// Total contributors, anonymous ones included.
    pub async fn get_contributor_count(&mut self, full_name: &str) -> Result<u64> {
        self.count_collection(&format!("/repos/{full_name}/contributors"), &[("anon", "true")])
            .await
    }

    /// Raw README text, or None when the repository has none.
    pub async fn get_readme(&mut self, full_name: &str) -> Result<Option<String>> {
        let result = self
            .get_media(&format!("/repos/{full_name}/readme"), "application/vnd.github.raw")
            .await;
        match result {
            Ok(response) => Ok(Some(response.text().await?)),
            Err(VitrineError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Count a collection by requesting one item per page and reading the
    /// page number of the `rel="last"` Link.
    async fn count_collection(&mut self, endpoint: &str, extra: &[(&str, &str)]) -> Result<u64> {
        let mut params = vec![("per_page", "1")];
        params.extend_from_slice(extra);
        let response = self.get_with_params(endpoint, &params).await?;

        let link = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if let Some(total) = link.as_deref().and_then(last_page) {
            return Ok(total);
        }

        // A single page carries no Link header; the item count is the total.
        let items: Vec<Value> = response.json().await?;
        Ok(items.len() as u64)
    }
}

/// Extract the `rel="last"` page number from a Link header.
fn last_page(header: &str) -> Option<u64> {
    header.split(',').find_map(|part| {
        let (url, rel) = part.split_once(';')?;
        if !rel.contains(r#"rel="last""#) {
            return None;
        }
        let url = url.trim().trim_start_matches('<').trim_end_matches('>');
        let query = url.split_once('?')?.1;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == "page").then(|| value.parse().ok()).flatten()
        })
    })
}
