use super::{CountSource, ReleaseSource, SourceError};
use crate::config::GithubConfig;
use reqwest::Client;
use serde::Deserialize;
use std::cmp::Ordering;
use std::sync::Arc;

const USER_AGENT: &str = concat!("growth-agent/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_url: String,
    repo: String,
    token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RepoStats {
    #[serde(default, rename = "stargazers_count")]
    pub stars: u64,
    #[serde(default, rename = "forks_count")]
    pub forks: u64,
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: Option<String>,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self, SourceError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            repo: config.repo.clone(),
            token: config.token.clone(),
        })
    }

    pub async fn repo_stats(&self) -> Result<RepoStats, SourceError> {
        let url = format!("{}/repos/{}", self.api_url, self.repo);
        let stats = self
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<RepoStats>()
            .await?;
        Ok(stats)
    }

    pub async fn release_tags(&self) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/repos/{}/releases", self.api_url, self.repo);
        let releases = self
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Release>>()
            .await?;
        Ok(releases
            .into_iter()
            .filter_map(|release| release.tag_name)
            .collect())
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GithubStars(pub Arc<GithubClient>);

#[async_trait::async_trait]
impl CountSource for GithubStars {
    async fn fetch_count(&self) -> Result<u64, SourceError> {
        Ok(self.0.repo_stats().await?.stars)
    }
}

#[derive(Debug, Clone)]
pub struct GithubForks(pub Arc<GithubClient>);

#[async_trait::async_trait]
impl CountSource for GithubForks {
    async fn fetch_count(&self) -> Result<u64, SourceError> {
        Ok(self.0.repo_stats().await?.forks)
    }
}

#[derive(Debug, Clone)]
pub struct GithubReleases {
    client: Arc<GithubClient>,
    tag_prefix: String,
}

impl GithubReleases {
    pub fn new(client: Arc<GithubClient>, tag_prefix: String) -> Self {
        Self { client, tag_prefix }
    }
}

#[async_trait::async_trait]
impl ReleaseSource for GithubReleases {
    async fn fetch_latest_tag(&self) -> Result<String, SourceError> {
        let tags = self.client.release_tags().await?;
        select_latest_release(&tags, &self.tag_prefix)
            .map(str::to_owned)
            .ok_or_else(|| SourceError::NoMatchingRelease(self.tag_prefix.clone()))
    }
}

/// Picks the highest version among tags starting with `prefix`. Versions are
/// compared numerically component by component; ties keep the earlier tag.
pub fn select_latest_release<'a>(tags: &'a [String], prefix: &str) -> Option<&'a str> {
    tags.iter()
        .filter(|tag| tag.starts_with(prefix))
        .fold(None, |latest: Option<&'a String>, candidate| match latest {
            Some(current)
                if compare_versions(
                    &version_components(current, prefix),
                    &version_components(candidate, prefix),
                ) != Ordering::Less =>
            {
                Some(current)
            }
            _ => Some(candidate),
        })
        .map(String::as_str)
}

fn version_components(tag: &str, prefix: &str) -> Vec<u64> {
    tag.strip_prefix(prefix)
        .unwrap_or(tag)
        .trim_start_matches(['-', '_', 'v', 'V'])
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u64>().unwrap_or(0)
        })
        .collect()
}

fn compare_versions(left: &[u64], right: &[u64]) -> Ordering {
    let length = left.len().max(right.len());
    (0..length)
        .map(|index| {
            let l = left.get(index).copied().unwrap_or(0);
            let r = right.get(index).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
