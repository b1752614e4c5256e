use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One tracked external quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    GithubStars,
    GithubForks,
    ReleaseVersion,
    TelegramMembers,
    TokenHolders,
    SocialFollowers,
}

impl MetricFamily {
    /// Every family, in broadcast order.
    pub const ALL: [MetricFamily; 6] = [
        MetricFamily::GithubStars,
        MetricFamily::GithubForks,
        MetricFamily::ReleaseVersion,
        MetricFamily::TelegramMembers,
        MetricFamily::TokenHolders,
        MetricFamily::SocialFollowers,
    ];

    /// Stable identifier, also used as the milestone-state key.
    pub fn key(self) -> &'static str {
        match self {
            MetricFamily::GithubStars => "github_stars",
            MetricFamily::GithubForks => "github_forks",
            MetricFamily::ReleaseVersion => "release_version",
            MetricFamily::TelegramMembers => "telegram_members",
            MetricFamily::TokenHolders => "token_holders",
            MetricFamily::SocialFollowers => "social_followers",
        }
    }

    /// Plural key holding the record array inside the series document.
    pub fn series_key(self) -> &'static str {
        match self {
            MetricFamily::GithubStars => "stars",
            MetricFamily::GithubForks => "forks",
            MetricFamily::ReleaseVersion => "versions",
            MetricFamily::TelegramMembers => "members",
            MetricFamily::TokenHolders => "holders",
            MetricFamily::SocialFollowers => "followers",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            MetricFamily::GithubStars => "github_stars.json",
            MetricFamily::GithubForks => "github_forks.json",
            MetricFamily::ReleaseVersion => "github_release_version.json",
            MetricFamily::TelegramMembers => "telegram_metrics.json",
            MetricFamily::TokenHolders => "token_holders.json",
            MetricFamily::SocialFollowers => "x_metrics.json",
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            MetricFamily::GithubStars => "GitHub Stars",
            MetricFamily::GithubForks => "GitHub Forks",
            MetricFamily::ReleaseVersion => "Latest Release",
            MetricFamily::TelegramMembers => "Telegram Members",
            MetricFamily::TokenHolders => "Token Holders",
            MetricFamily::SocialFollowers => "X Followers",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MetricFamily::GithubStars => "⭐️",
            MetricFamily::GithubForks => "🍴",
            MetricFamily::ReleaseVersion => "🔖",
            MetricFamily::TelegramMembers => "👥",
            MetricFamily::TokenHolders => "💊",
            MetricFamily::SocialFollowers => "🐦",
        }
    }

    /// Release versions are string tags compared by identity, not counts.
    pub fn is_tag(self) -> bool {
        matches!(self, MetricFamily::ReleaseVersion)
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric family: {0}")]
pub struct UnknownFamily(pub String);

impl FromStr for MetricFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricFamily::ALL
            .into_iter()
            .find(|family| family.key() == s || family.series_key() == s)
            .ok_or_else(|| UnknownFamily(s.to_owned()))
    }
}
