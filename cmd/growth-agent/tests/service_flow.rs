use growth_agent::{
    alerter::{AlertError, Broadcaster},
    service::{GrowthAgent, TrackedCount, TrackedRelease},
    sources::{CountSource, ReleaseSource, SourceError},
};
use growth_core::{MetricFamily, MilestoneTracker, SnapshotStore, csv::CsvMirror};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};
use tempfile::TempDir;

struct SharedCount(Arc<AtomicU64>);

#[async_trait::async_trait]
impl CountSource for SharedCount {
    async fn fetch_count(&self) -> Result<u64, SourceError> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

struct FailingCount;

#[async_trait::async_trait]
impl CountSource for FailingCount {
    async fn fetch_count(&self) -> Result<u64, SourceError> {
        Err(SourceError::Rpc("rate limited".to_owned()))
    }
}

struct SharedTag(Arc<Mutex<String>>);

#[async_trait::async_trait]
impl ReleaseSource for SharedTag {
    async fn fetch_latest_tag(&self) -> Result<String, SourceError> {
        match self.0.lock() {
            Ok(guard) => Ok(guard.clone()),
            Err(_) => Err(SourceError::Rpc("poisoned".to_owned())),
        }
    }
}

#[derive(Clone, Default)]
struct RecordingBroadcaster {
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingBroadcaster {
    fn sent(&self) -> Vec<String> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl Broadcaster for RecordingBroadcaster {
    fn name(&self) -> &str {
        "recording"
    }

    async fn broadcast(&self, text: &str) -> Result<(), AlertError> {
        if let Ok(mut guard) = self.sent.lock() {
            guard.push(text.to_owned());
        }
        Ok(())
    }
}

struct RejectingBroadcaster;

#[async_trait::async_trait]
impl Broadcaster for RejectingBroadcaster {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn broadcast(&self, _text: &str) -> Result<(), AlertError> {
        Err(AlertError::Rejected {
            destination: "rejecting".to_owned(),
            reason: "403 Forbidden".to_owned(),
        })
    }
}

fn agent_in(dir: &TempDir) -> GrowthAgent {
    let data_dir = dir.path().join("data");
    GrowthAgent::new(
        SnapshotStore::new(&data_dir),
        CsvMirror::new(&data_dir),
        MilestoneTracker::new(data_dir.join("milestones.json")),
    )
}

#[tokio::test]
async fn first_and_second_run_report_growth_and_milestones_once() {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let stars = Arc::new(AtomicU64::new(120));
    let recorder = RecordingBroadcaster::default();

    let agent = agent_in(&dir)
        .track(TrackedCount::new(
            MetricFamily::GithubStars,
            Box::new(SharedCount(Arc::clone(&stars))),
            vec![100, 500, 1000],
        ))
        .broadcast_to(Box::new(recorder.clone()));

    let first = agent.run_once().await;
    assert_eq!(first.summary, vec!["⭐️ GitHub Stars  >>  120".to_owned()]);
    assert_eq!(
        first.announcements,
        vec!["🎉 Milestone Reached! GitHub Stars has hit 100!".to_owned()]
    );
    assert!(first.failed_families.is_empty());
    assert_eq!(first.delivered, 2);

    stars.store(150, Ordering::SeqCst);
    let second = agent.run_once().await;
    assert_eq!(second.summary, vec!["⭐️ GitHub Stars  >>  150 (+25.00%)".to_owned()]);
    assert!(second.announcements.is_empty());

    stars.store(750, Ordering::SeqCst);
    let third = agent.run_once().await;
    assert_eq!(
        third.announcements,
        vec!["🎉 Milestone Reached! GitHub Stars has hit 500!".to_owned()]
    );

    let series = SnapshotStore::new(dir.path().join("data")).load::<u64>(MetricFamily::GithubStars);
    let ids: Vec<u64> = series.records().iter().map(|record| record.id).collect();
    let counts: Vec<u64> = series.records().iter().map(|record| record.count).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(counts, vec![120, 150, 750]);

    assert_eq!(recorder.sent().len(), 5);
}

#[tokio::test]
async fn failed_fetch_uses_placeholder_and_previous_value() {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let store = SnapshotStore::new(dir.path().join("data"));
    assert!(store.append(MetricFamily::TelegramMembers, 12_600_u64).is_ok());

    let forks = Arc::new(AtomicU64::new(80));
    let agent = agent_in(&dir)
        .track(TrackedCount::new(
            MetricFamily::GithubForks,
            Box::new(SharedCount(Arc::clone(&forks))),
            vec![50, 75, 100],
        ))
        .track(TrackedCount::new(
            MetricFamily::TelegramMembers,
            Box::new(FailingCount),
            vec![10_000, 12_500, 15_000],
        ));

    let report = agent.run_once().await;

    assert_eq!(
        report.summary,
        vec![
            "🍴 GitHub Forks  >>  80".to_owned(),
            "❌ Error fetching Telegram Members.".to_owned(),
        ]
    );
    assert_eq!(report.failed_families, vec![MetricFamily::TelegramMembers]);
    assert_eq!(
        report.announcements,
        vec![
            "🎉 Milestone Reached! GitHub Forks has hit 50!".to_owned(),
            "🎉 Milestone Reached! GitHub Forks has hit 75!".to_owned(),
            "🎉 Milestone Reached! Telegram Members has hit 10,000!".to_owned(),
            "🎉 Milestone Reached! Telegram Members has hit 12,500!".to_owned(),
        ]
    );

    let members = store.load::<u64>(MetricFamily::TelegramMembers);
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn release_is_announced_only_when_the_tag_changes() {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let tag = Arc::new(Mutex::new("rig-core-v0.9.0".to_owned()));
    let agent = agent_in(&dir).track_release(TrackedRelease {
        label: "Rig Version".to_owned(),
        source: Box::new(SharedTag(Arc::clone(&tag))),
    });

    let first = agent.run_once().await;
    assert_eq!(first.summary, vec!["🔖 Rig Version  >>  rig-core-v0.9.0".to_owned()]);
    assert_eq!(first.announcements.len(), 1);

    let unchanged = agent.run_once().await;
    assert!(unchanged.announcements.is_empty());

    if let Ok(mut guard) = tag.lock() {
        *guard = "rig-core-v0.10.0".to_owned();
    }
    let bumped = agent.run_once().await;
    assert_eq!(
        bumped.announcements,
        vec!["🚀 New Release: Version **rig-core-v0.10.0** is now available on GitHub!".to_owned()]
    );

    let versions = SnapshotStore::new(dir.path().join("data")).load::<String>(MetricFamily::ReleaseVersion);
    assert_eq!(versions.len(), 3);
}

#[tokio::test]
async fn broadcaster_failure_does_not_stop_other_destinations() {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let recorder = RecordingBroadcaster::default();
    let agent = agent_in(&dir)
        .track(TrackedCount::new(
            MetricFamily::TokenHolders,
            Box::new(SharedCount(Arc::new(AtomicU64::new(1_234)))),
            Vec::new(),
        ).with_label("$ARC Holders"))
        .broadcast_to(Box::new(RejectingBroadcaster))
        .broadcast_to(Box::new(recorder.clone()));

    let report = agent.run_once().await;

    assert_eq!(report.delivered, 1);
    assert_eq!(recorder.sent(), vec!["💊 $ARC Holders  >>  1,234".to_owned()]);
}

#[tokio::test]
async fn summary_joins_families_and_mirrors_csv() {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let recorder = RecordingBroadcaster::default();
    let agent = agent_in(&dir)
        .track(TrackedCount::new(
            MetricFamily::SocialFollowers,
            Box::new(SharedCount(Arc::new(AtomicU64::new(61_000)))),
            Vec::new(),
        ))
        .track(TrackedCount::new(
            MetricFamily::GithubStars,
            Box::new(SharedCount(Arc::new(AtomicU64::new(4_100)))),
            Vec::new(),
        ))
        .broadcast_to(Box::new(recorder.clone()));

    let _ = agent.run_once().await;

    assert_eq!(
        recorder.sent(),
        vec!["⭐️ GitHub Stars  >>  4,100\n\n🐦 X Followers  >>  61,000".to_owned()]
    );

    let csv = std::fs::read_to_string(dir.path().join("data").join("csv").join("x_metrics.csv"));
    assert!(csv.is_ok());
    let csv = csv.unwrap_or_default();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines.first().copied(), Some("Date,Metric Label,Count,AdditionalInfo"));
    assert!(lines.get(1).is_some_and(|row| row.ends_with(",X Followers,61000,N/A")));
}

#[tokio::test]
async fn nothing_is_sent_when_no_family_is_tracked() {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let recorder = RecordingBroadcaster::default();
    let agent = agent_in(&dir).broadcast_to(Box::new(recorder.clone()));

    let report = agent.run_once().await;

    assert!(report.summary.is_empty());
    assert_eq!(report.delivered, 0);
    assert!(recorder.sent().is_empty());
}

#[tokio::test]
async fn label_keyed_milestones_from_older_deployments_are_not_repeated() {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let data_dir = dir.path().join("data");
    assert!(std::fs::create_dir_all(&data_dir).is_ok());
    assert!(
        std::fs::write(
            data_dir.join("milestones.json"),
            r#"{"GitHub Stars":[100,500,1000,2500,3500,4000]}"#,
        )
        .is_ok()
    );
    assert!(
        std::fs::write(
            data_dir.join("github_stars.json"),
            r#"{"stars":[{"id":1,"timestamp":"2025-01-10T09:00:00.000Z","count":4100}]}"#,
        )
        .is_ok()
    );

    let agent = agent_in(&dir).track(TrackedCount::new(
        MetricFamily::GithubStars,
        Box::new(SharedCount(Arc::new(AtomicU64::new(4_100)))),
        vec![100, 500, 1000, 2500, 3500, 4000, 5000],
    ));

    let report = agent.run_once().await;

    assert!(report.announcements.is_empty());
    assert_eq!(report.summary, vec!["⭐️ GitHub Stars  >>  4,100".to_owned()]);
    let tracker = MilestoneTracker::new(data_dir.join("milestones.json"));
    assert_eq!(tracker.load().announced("github_stars").map(|set| set.len()), Some(6));
}

#[tokio::test]
async fn unsaved_milestones_are_not_announced_but_summary_is_sent() {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    assert!(std::fs::create_dir_all(dir.path().join("data").join("milestones.json")).is_ok());
    let recorder = RecordingBroadcaster::default();
    let agent = agent_in(&dir)
        .track(TrackedCount::new(
            MetricFamily::GithubStars,
            Box::new(SharedCount(Arc::new(AtomicU64::new(200)))),
            vec![100],
        ))
        .broadcast_to(Box::new(recorder.clone()));

    let report = agent.run_once().await;

    assert!(report.announcements.is_empty());
    assert_eq!(report.summary, vec!["⭐️ GitHub Stars  >>  200".to_owned()]);
    assert_eq!(recorder.sent(), vec!["⭐️ GitHub Stars  >>  200".to_owned()]);
    let stars = SnapshotStore::new(dir.path().join("data")).load::<u64>(MetricFamily::GithubStars);
    assert_eq!(stars.len(), 1);
}

#[tokio::test]
async fn snapshot_failure_in_one_family_does_not_stop_the_others() {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let data_dir = dir.path().join("data");
    assert!(std::fs::create_dir_all(&data_dir).is_ok());
    let newer = r#"{"schema_version":99,"forks":[]}"#;
    assert!(std::fs::write(data_dir.join("github_forks.json"), newer).is_ok());

    let recorder = RecordingBroadcaster::default();
    let agent = agent_in(&dir)
        .track(TrackedCount::new(
            MetricFamily::GithubStars,
            Box::new(SharedCount(Arc::new(AtomicU64::new(300)))),
            Vec::new(),
        ))
        .track(TrackedCount::new(
            MetricFamily::GithubForks,
            Box::new(SharedCount(Arc::new(AtomicU64::new(40)))),
            Vec::new(),
        ))
        .track(TrackedCount::new(
            MetricFamily::TelegramMembers,
            Box::new(SharedCount(Arc::new(AtomicU64::new(9_000)))),
            Vec::new(),
        ))
        .broadcast_to(Box::new(recorder.clone()));

    let report = agent.run_once().await;

    assert!(report.failed_families.is_empty());
    assert_eq!(
        recorder.sent(),
        vec![
            "⭐️ GitHub Stars  >>  300\n\n🍴 GitHub Forks  >>  40\n\n👥 Telegram Members  >>  9,000"
                .to_owned()
        ]
    );

    let store = SnapshotStore::new(&data_dir);
    assert_eq!(store.load::<u64>(MetricFamily::GithubStars).len(), 1);
    assert_eq!(store.load::<u64>(MetricFamily::TelegramMembers).len(), 1);
    assert_eq!(
        std::fs::read_to_string(data_dir.join("github_forks.json")).unwrap_or_default(),
        newer
    );
}
