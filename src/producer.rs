// Offline snapshot producer.
// Fetches the profile and every repository, enriches each entry with derived
// statistics, and serializes the aggregate document to one file.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::github::GitHubClient;
use crate::github::types::{ApiRepo, ApiUser};
use crate::snapshot::{DataSnapshot, Profile, RepoOwner, RepositoryEntry};

const REPOS_PER_PAGE: u32 = 100;

/// Build the full data snapshot for one account.
///
/// Repository pages are walked until a short page; each repository then gets
/// its derived counts and README from secondary requests. A failed secondary
/// request degrades that one entry to zero/absent values instead of aborting
/// the whole batch.
pub async fn build_snapshot(client: &mut GitHubClient, login: &str) -> Result<DataSnapshot> {
    info!(login, "fetching profile");
    let user = client.get_user(login).await?;

    let mut repos = Vec::new();
    let mut page = 1;
    loop {
        let batch = client.get_user_repos(login, page, REPOS_PER_PAGE).await?;
        let last_page = (batch.len() as u32) < REPOS_PER_PAGE;
        repos.extend(batch);
        if last_page {
            break;
        }
        page += 1;
    }
    info!(count = repos.len(), "fetched repository list");

    let mut entries = Vec::with_capacity(repos.len());
    for repo in repos {
        entries.push(enrich(client, repo).await);
    }

    Ok(DataSnapshot {
        profile: profile_from(user),
        repos: entries,
    })
}

/// Serialize the snapshot to `path` as pretty JSON, atomically.
pub fn write_snapshot(snapshot: &DataSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = snapshot.to_json()?;

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Augment one repository with the statistics the list endpoint omits.
async fn enrich(client: &mut GitHubClient, repo: ApiRepo) -> RepositoryEntry {
    let full_name = repo.full_name.clone();

    // Empty repositories answer the commits endpoint with an error; treat
    // any per-repo failure the same way and keep going.
    let commits_count = match client.get_commit_count(&full_name).await {
        Ok(count) => count,
        Err(e) => {
            warn!(repo = %full_name, error = %e, "commit count unavailable");
            0
        }
    };
    let contributors_count = match client.get_contributor_count(&full_name).await {
        Ok(count) => count,
        Err(e) => {
            warn!(repo = %full_name, error = %e, "contributor count unavailable");
            0
        }
    };
    let watchers_count = match client.get_repo(&full_name).await {
        Ok(full) => full.subscribers_count,
        Err(e) => {
            warn!(repo = %full_name, error = %e, "watcher count unavailable");
            0
        }
    };
    let readme = match client.get_readme(&full_name).await {
        Ok(text) => text,
        Err(e) => {
            warn!(repo = %full_name, error = %e, "readme unavailable");
            None
        }
    };

    entry_from(repo, commits_count, contributors_count, watchers_count, readme)
}

fn profile_from(user: ApiUser) -> Profile {
    Profile {
        bio: user.bio,
        created_at: user.created_at,
        followers: user.followers,
        following: user.following,
        hireable: user.hireable.unwrap_or(false),
        html_url: user.html_url,
        login: user.login,
        name: user.name,
        public_repos: user.public_repos,
        updated_at: user.updated_at,
    }
}

fn entry_from(
    repo: ApiRepo,
    commits_count: u64,
    contributors_count: u64,
    watchers_count: u64,
    readme: Option<String>,
) -> RepositoryEntry {
    RepositoryEntry {
        archived: repo.archived,
        commits_count,
        contributors_count,
        created_at: repo.created_at,
        default_branch: repo.default_branch,
        description: repo.description,
        fork: repo.fork,
        forks_count: repo.forks_count,
        full_name: repo.full_name,
        // The API reports an empty string for unset homepages.
        homepage: repo.homepage.filter(|url| !url.is_empty()),
        html_url: repo.html_url,
        id: repo.id,
        is_template: repo.is_template,
        language: repo.language,
        name: repo.name,
        open_issues_count: repo.open_issues_count,
        owner: RepoOwner {
            login: repo.owner.login,
            avatar_url: repo.owner.avatar_url,
            html_url: repo.owner.html_url,
        },
        private: repo.private,
        pushed_at: repo.pushed_at,
        readme,
        size: repo.size,
        stargazers_count: repo.stargazers_count,
        topics: repo.topics,
        updated_at: repo.updated_at,
        visibility: repo.visibility,
        watchers_count,
    }
}
