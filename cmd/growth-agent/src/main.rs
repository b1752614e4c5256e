use clap::Parser;
use growth_agent::{
    alerter::{Broadcaster, DiscordBroadcaster, LogBroadcaster, TelegramBroadcaster},
    cli::{CLI, init_tracing},
    config::AppConfig,
    service::{GrowthAgent, TrackedCount, TrackedRelease},
    sources::{
        GithubClient, GithubForks, GithubReleases, GithubStars, ProfileFollowers, SourceError,
        TelegramMembers, TokenHolders,
    },
};
use growth_core::{MetricFamily, MilestoneTracker, SnapshotStore, csv::CsvMirror};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = CLI::parse();
    init_tracing(cli.log_level);

    if let Err(error) = run(cli).await {
        error!(error = %error, "growth-agent run failed");
        std::process::exit(1);
    }
}

async fn run(cli: CLI) -> Result<(), String> {
    let config = AppConfig::from_env().map_err(|error| error.to_string())?;
    let agent = build_agent(&cli, &config).map_err(|error| error.to_string())?;

    info!(
        datadir = %cli.datadir.display(),
        dry_run = cli.dry_run,
        "growth-agent started"
    );

    let report = agent.run_once().await;
    if !report.failed_families.is_empty() {
        warn!(failed = ?report.failed_families, "some families fell back to stored values");
    }

    Ok(())
}

fn build_agent(cli: &CLI, config: &AppConfig) -> Result<GrowthAgent, SourceError> {
    let store = SnapshotStore::new(&cli.datadir);
    let csv = CsvMirror::new(&cli.datadir);
    let milestones = MilestoneTracker::new(cli.milestones_path());

    let github = Arc::new(GithubClient::new(&config.github)?);

    let mut agent = GrowthAgent::new(store, csv, milestones)
        .track(TrackedCount::new(
            MetricFamily::GithubStars,
            Box::new(GithubStars(Arc::clone(&github))),
            config.thresholds(MetricFamily::GithubStars).to_vec(),
        ))
        .track(TrackedCount::new(
            MetricFamily::GithubForks,
            Box::new(GithubForks(Arc::clone(&github))),
            config.thresholds(MetricFamily::GithubForks).to_vec(),
        ));

    if let Some(prefix) = &config.github.release_tag_prefix {
        agent = agent.track_release(TrackedRelease {
            label: config.github.release_label.clone(),
            source: Box::new(GithubReleases::new(Arc::clone(&github), prefix.clone())),
        });
    }

    if let Some(telegram) = &config.telegram {
        agent = agent.track(TrackedCount::new(
            MetricFamily::TelegramMembers,
            Box::new(TelegramMembers::new(
                telegram.bot_token.clone(),
                telegram.members_chat_id,
            )),
            config.thresholds(MetricFamily::TelegramMembers).to_vec(),
        ));
    }

    if let Some(holders) = &config.token_holders {
        agent = agent.track(
            TrackedCount::new(
                MetricFamily::TokenHolders,
                Box::new(TokenHolders::new(holders)),
                config.thresholds(MetricFamily::TokenHolders).to_vec(),
            )
            .with_label(holders.label.clone()),
        );
    }

    if let Some(followers) = &config.followers {
        agent = agent.track(
            TrackedCount::new(
                MetricFamily::SocialFollowers,
                Box::new(ProfileFollowers::new(followers.profile_url.clone())?),
                config.thresholds(MetricFamily::SocialFollowers).to_vec(),
            )
            .with_label(followers.label.clone()),
        );
    }

    for broadcaster in broadcasters(cli, config) {
        agent = agent.broadcast_to(broadcaster);
    }

    for family in MetricFamily::ALL {
        if !agent.is_tracking(family) {
            info!(%family, "family not configured, skipping");
        }
    }

    Ok(agent)
}

fn broadcasters(cli: &CLI, config: &AppConfig) -> Vec<Box<dyn Broadcaster>> {
    if cli.dry_run {
        return vec![Box::new(LogBroadcaster)];
    }

    let mut broadcasters: Vec<Box<dyn Broadcaster>> = Vec::new();
    if let Some(telegram) = &config.telegram {
        broadcasters.push(Box::new(TelegramBroadcaster::new(telegram)));
    }
    if let Some(discord) = &config.discord {
        broadcasters.push(Box::new(DiscordBroadcaster::new(discord)));
    }
    if broadcasters.is_empty() {
        warn!("no chat destination configured, messages will only be logged");
        broadcasters.push(Box::new(LogBroadcaster));
    }
    broadcasters
}
