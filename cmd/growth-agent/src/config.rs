use crate::milestones::default_thresholds;
use growth_core::MetricFamily;
use std::{collections::HashMap, env, num::ParseIntError};
use thiserror::Error;

pub const ENV_PREFIX: &str = "GROWTH_AGENT_";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_HELIUS_RPC_URL: &str = "https://mainnet.helius-rpc.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    pub repo: String,
    pub api_url: String,
    pub token: Option<String>,
    /// Release tracking is enabled only when a prefix (possibly empty) is set.
    pub release_tag_prefix: Option<String>,
    pub release_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
    pub members_chat_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordConfig {
    pub bot_token: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHoldersConfig {
    pub mint: String,
    pub api_key: String,
    pub rpc_url: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowersConfig {
    pub profile_url: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub github: GithubConfig,
    pub telegram: Option<TelegramConfig>,
    pub discord: Option<DiscordConfig>,
    pub token_holders: Option<TokenHoldersConfig>,
    pub followers: Option<FollowersConfig>,
    pub milestones: HashMap<MetricFamily, Vec<u64>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    MissingEnv(String),
    #[error("invalid integer in env var {name}: {source}")]
    InvalidInteger { name: String, source: ParseIntError },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source. `lookup` receives
    /// full variable names, prefix included.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reader = Reader { lookup };

        let github = GithubConfig {
            repo: reader.required("GITHUB_REPO")?,
            api_url: reader
                .optional("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_owned()),
            token: reader.optional("GITHUB_TOKEN"),
            release_tag_prefix: reader
                .raw("RELEASE_TAG_PREFIX")
                .map(|prefix| prefix.trim().to_owned()),
            release_label: reader
                .optional("RELEASE_LABEL")
                .unwrap_or_else(|| MetricFamily::ReleaseVersion.default_label().to_owned()),
        };

        let telegram = match reader.optional("TELEGRAM_BOT_TOKEN") {
            Some(bot_token) => {
                let chat_id = reader.required_i64("TELEGRAM_CHAT_ID")?;
                let members_chat_id = reader
                    .optional_i64("TELEGRAM_MEMBERS_CHAT_ID")?
                    .unwrap_or(chat_id);
                Some(TelegramConfig {
                    bot_token,
                    chat_id,
                    members_chat_id,
                })
            }
            None => None,
        };

        let discord = match reader.optional("DISCORD_BOT_TOKEN") {
            Some(bot_token) => Some(DiscordConfig {
                bot_token,
                channel_id: reader.required("DISCORD_CHANNEL_ID")?,
            }),
            None => None,
        };

        let token_holders = match reader.optional("TOKEN_MINT") {
            Some(mint) => Some(TokenHoldersConfig {
                mint,
                api_key: reader.required("HELIUS_API_KEY")?,
                rpc_url: reader
                    .optional("HELIUS_RPC_URL")
                    .unwrap_or_else(|| DEFAULT_HELIUS_RPC_URL.to_owned()),
                label: reader
                    .optional("TOKEN_LABEL")
                    .unwrap_or_else(|| MetricFamily::TokenHolders.default_label().to_owned()),
            }),
            None => None,
        };

        let followers = reader
            .optional("FOLLOWERS_PROFILE_URL")
            .map(|profile_url| FollowersConfig {
                profile_url,
                label: reader
                    .optional("FOLLOWERS_LABEL")
                    .unwrap_or_else(|| MetricFamily::SocialFollowers.default_label().to_owned()),
            });

        let mut milestones = HashMap::new();
        for family in MetricFamily::ALL.into_iter().filter(|family| !family.is_tag()) {
            let name = format!("MILESTONES_{}", family.key().to_ascii_uppercase());
            let thresholds = match reader.optional(&name) {
                Some(raw) => parse_thresholds(&format!("{ENV_PREFIX}{name}"), &raw)?,
                None => default_thresholds(family).to_vec(),
            };
            milestones.insert(family, thresholds);
        }

        Ok(Self {
            github,
            telegram,
            discord,
            token_holders,
            followers,
            milestones,
        })
    }

    pub fn thresholds(&self, family: MetricFamily) -> &[u64] {
        self.milestones
            .get(&family)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Comma-separated thresholds, returned ascending and de-duplicated.
pub fn parse_thresholds(name: &str, raw: &str) -> Result<Vec<u64>, ConfigError> {
    let mut thresholds = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.replace('_', "")
                .parse::<u64>()
                .map_err(|source| ConfigError::InvalidInteger {
                    name: name.to_owned(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    thresholds.sort_unstable();
    thresholds.dedup();
    Ok(thresholds)
}

struct Reader<F> {
    lookup: F,
}

impl<F> Reader<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Value as set, including empty strings.
    fn raw(&self, name: &str) -> Option<String> {
        (self.lookup)(&format!("{ENV_PREFIX}{name}"))
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.raw(name)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::MissingEnv(format!("{ENV_PREFIX}{name}")))
    }

    fn required_i64(&self, name: &str) -> Result<i64, ConfigError> {
        let raw = self.required(name)?;
        parse_i64(name, &raw)
    }

    fn optional_i64(&self, name: &str) -> Result<Option<i64>, ConfigError> {
        self.optional(name)
            .map(|raw| parse_i64(name, &raw))
            .transpose()
    }
}

fn parse_i64(name: &str, raw: &str) -> Result<i64, ConfigError> {
    raw.parse::<i64>().map_err(|source| ConfigError::InvalidInteger {
        name: format!("{ENV_PREFIX}{name}"),
        source,
    })
}
