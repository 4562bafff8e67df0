// GitHub REST API response shapes.
// Only the fields the producer reads are modeled.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `/users/{login}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub followers: u32,
    pub following: u32,
    pub hireable: Option<bool>,
    pub html_url: String,
    pub login: String,
    pub name: Option<String>,
    pub public_repos: u32,
    pub updated_at: DateTime<Utc>,
}

/// Owner summary embedded in repository responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepoOwner {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// Repository record from the list and single-repo endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepo {
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub default_branch: String,
    pub description: Option<String>,
    pub fork: bool,
    pub forks_count: u32,
    pub full_name: String,
    pub homepage: Option<String>,
    pub html_url: String,
    pub id: u64,
    #[serde(default)]
    pub is_template: bool,
    pub language: Option<String>,
    pub name: String,
    pub open_issues_count: u32,
    pub owner: ApiRepoOwner,
    pub private: bool,
    pub pushed_at: Option<DateTime<Utc>>,
    pub size: u64,
    pub stargazers_count: u32,
    /// Only populated on the single-repo endpoint.
    #[serde(default)]
    pub subscribers_count: u64,
    #[serde(default)]
    pub topics: Vec<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_visibility")]
    pub visibility: String,
}

fn default_visibility() -> String {
    "public".to_string()
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
