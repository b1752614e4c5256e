use super::{CountSource, SourceError};
use reqwest::Client;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
const FOLLOWERS_KEY: &str = "\"followers_count\"";

/// Follower count scraped from the embedded JSON of a public profile page.
#[derive(Debug, Clone)]
pub struct ProfileFollowers {
    client: Client,
    profile_url: String,
}

impl ProfileFollowers {
    pub fn new(profile_url: String) -> Result<Self, SourceError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            profile_url,
        })
    }
}

#[async_trait::async_trait]
impl CountSource for ProfileFollowers {
    async fn fetch_count(&self) -> Result<u64, SourceError> {
        let body = self
            .client
            .get(&self.profile_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_followers_count(&body).ok_or(SourceError::MissingFollowersCount)
    }
}

/// First `"followers_count": <digits>` occurrence in `body`.
pub fn extract_followers_count(body: &str) -> Option<u64> {
    body.match_indices(FOLLOWERS_KEY).find_map(|(index, key)| {
        let rest = body.get(index + key.len()..)?;
        let rest = rest.trim_start().strip_prefix(':')?.trim_start();
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        digits.parse::<u64>().ok()
    })
}
