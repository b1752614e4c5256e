//! Hand-maintained announcement thresholds, ascending.

use growth_core::MetricFamily;

pub const TELEGRAM_MEMBERS: &[u64] = &[
    10_000, 12_500, 15_000, 17_500, 20_000, 25_000, 30_000, 50_000, 75_000, 100_000, 125_000,
    150_000, 175_000, 200_000, 225_000, 250_000,
];

pub const GITHUB_STARS: &[u64] = &[
    100, 500, 1_000, 2_500, 3_500, 4_000, 4_500, 5_000, 7_500, 10_000, 12_500, 15_000, 17_500,
    20_000, 25_000, 30_000, 35_000, 40_000, 50_000, 60_000, 70_000, 80_000, 90_000, 100_000,
];

pub const GITHUB_FORKS: &[u64] = &[
    50, 75, 100, 125, 150, 175, 200, 300, 400, 500, 1_000, 2_500, 5_000, 7_500, 10_000, 12_500,
    15_000, 17_500, 20_000, 25_000, 30_000, 35_000, 40_000, 50_000, 60_000, 70_000, 80_000,
    90_000, 100_000,
];

pub const TOKEN_HOLDERS: &[u64] = &[
    50_000, 60_000, 65_000, 70_000, 75_000, 80_000, 85_000, 90_000, 95_000, 100_000, 125_000,
    150_000, 175_000, 200_000, 225_000, 250_000, 275_000, 300_000,
];

pub const SOCIAL_FOLLOWERS: &[u64] = &[
    50_000, 55_000, 60_000, 65_000, 70_000, 75_000, 80_000, 85_000, 90_000, 95_000, 100_000,
    125_000, 150_000, 175_000, 200_000, 225_000, 250_000, 275_000, 300_000,
];

pub fn default_thresholds(family: MetricFamily) -> &'static [u64] {
    match family {
        MetricFamily::GithubStars => GITHUB_STARS,
        MetricFamily::GithubForks => GITHUB_FORKS,
        MetricFamily::TelegramMembers => TELEGRAM_MEMBERS,
        MetricFamily::TokenHolders => TOKEN_HOLDERS,
        MetricFamily::SocialFollowers => SOCIAL_FOLLOWERS,
        MetricFamily::ReleaseVersion => &[],
    }
}
