// Portfolio data snapshot model.
// Mirrors the published JSON document: one profile plus every repository,
// cached and replaced as a single unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A snapshot document that failed structural validation.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("profile login is empty")]
    EmptyLogin,
}

/// Public account summary of the portfolio owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub followers: u32,
    pub following: u32,
    /// Accounts that never set the flag report `null` on the wire.
    #[serde(default, deserialize_with = "null_as_false")]
    pub hireable: bool,
    pub html_url: String,
    pub login: String,
    pub name: Option<String>,
    pub public_repos: u32,
    pub updated_at: DateTime<Utc>,
}

/// Owning-account projection embedded in each repository entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// One repository owned or forked by the account, enriched with the derived
/// statistics the producer computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub archived: bool,
    pub commits_count: u64,
    pub contributors_count: u64,
    pub created_at: DateTime<Utc>,
    pub default_branch: String,
    pub description: Option<String>,
    pub fork: bool,
    pub forks_count: u32,
    pub full_name: String,
    pub homepage: Option<String>,
    pub html_url: String,
    pub id: u64,
    pub is_template: bool,
    pub language: Option<String>,
    pub name: String,
    pub open_issues_count: u32,
    pub owner: RepoOwner,
    pub private: bool,
    pub pushed_at: Option<DateTime<Utc>>,
    pub readme: Option<String>,
    pub size: u64,
    pub stargazers_count: u32,
    #[serde(default)]
    pub topics: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub visibility: String,
    pub watchers_count: u64,
}

/// The aggregate document published by the producer and consumed by the
/// loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    /// Wire name kept from the published document.
    #[serde(rename = "ayfri")]
    pub profile: Profile,
    pub repos: Vec<RepositoryEntry>,
}

impl DataSnapshot {
    /// Parse and structurally validate a snapshot document.
    ///
    /// Uniqueness of repository ids and full names is the producer's
    /// guarantee and is not re-checked here.
    pub fn from_json(text: &str) -> Result<Self, ParseError> {
        let snapshot: Self = serde_json::from_str(text)?;
        if snapshot.profile.login.is_empty() {
            return Err(ParseError::EmptyLogin);
        }
        Ok(snapshot)
    }

    /// Serialize to the published wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_every_field() {
        let snapshot = samples::snapshot();
        let json = snapshot.to_json().unwrap();
        let parsed = DataSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn duplicate_repo_ids_still_parse() {
        let mut snapshot = samples::snapshot();
        snapshot.repos[1].id = snapshot.repos[0].id;
        let json = snapshot.to_json().unwrap();

        // Uniqueness is the producer's obligation, not re-checked on parse.
        assert!(DataSnapshot::from_json(&json).is_ok());
    }

    #[test]
    fn empty_login_is_rejected() {
        let mut snapshot = samples::snapshot();
        snapshot.profile.login.clear();
        let json = snapshot.to_json().unwrap();

        assert!(matches!(
            DataSnapshot::from_json(&json),
            Err(ParseError::EmptyLogin)
        ));
    }

    #[test]
    fn null_hireable_reads_as_false() {
        let mut value: serde_json::Value =
            serde_json::from_str(&samples::snapshot_json()).unwrap();
        value["ayfri"]["hireable"] = serde_json::Value::Null;

        let snapshot = DataSnapshot::from_json(&value.to_string()).unwrap();
        assert!(!snapshot.profile.hireable);
    }

    #[test]
    fn truncated_document_is_invalid_json() {
        assert!(matches!(
            DataSnapshot::from_json(r#"{"ayfri":"#),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn missing_required_field_is_invalid() {
        let mut value: serde_json::Value =
            serde_json::from_str(&samples::snapshot_json()).unwrap();
        value["ayfri"]
            .as_object_mut()
            .unwrap()
            .remove("followers");

        assert!(matches!(
            DataSnapshot::from_json(&value.to_string()),
            Err(ParseError::Json(_))
        ));
    }
}
