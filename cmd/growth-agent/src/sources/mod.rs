//! Fetchers for the current value of each metric family.

pub mod followers;
pub mod github;
pub mod holders;
pub mod telegram;

pub use followers::ProfileFollowers;
pub use github::{GithubClient, GithubForks, GithubReleases, GithubStars};
pub use holders::TokenHolders;
pub use telegram::TelegramMembers;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("no release tag matches prefix {0:?}")]
    NoMatchingRelease(String),
    #[error("followers count not found in profile page")]
    MissingFollowersCount,
}

#[async_trait::async_trait]
pub trait CountSource: Send + Sync {
    async fn fetch_count(&self) -> Result<u64, SourceError>;
}

#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn fetch_latest_tag(&self) -> Result<String, SourceError>;
}
