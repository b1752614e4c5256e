use crate::{
    alerter::Broadcaster,
    sources::{CountSource, ReleaseSource},
};
use growth_core::{
    MetricFamily, MilestoneTracker, SnapshotStore, compare_release, compute_delta,
    csv::CsvMirror,
    delta::NOT_APPLICABLE,
    format::{
        error_placeholder, format_count_message, format_milestone, format_new_release,
        format_release_message,
    },
};
use tracing::{info, warn};

/// A counted family and where its value comes from.
pub struct TrackedCount {
    pub family: MetricFamily,
    pub label: String,
    pub source: Box<dyn CountSource>,
    pub thresholds: Vec<u64>,
}

impl TrackedCount {
    pub fn new(family: MetricFamily, source: Box<dyn CountSource>, thresholds: Vec<u64>) -> Self {
        Self {
            family,
            label: family.default_label().to_owned(),
            source,
            thresholds,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

pub struct TrackedRelease {
    pub label: String,
    pub source: Box<dyn ReleaseSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One line per family, broadcast together.
    pub summary: Vec<String>,
    /// New releases and milestones, broadcast one by one.
    pub announcements: Vec<String>,
    pub failed_families: Vec<MetricFamily>,
    /// Successful deliveries, counted per destination and message.
    pub delivered: usize,
}

pub struct GrowthAgent {
    store: SnapshotStore,
    csv: CsvMirror,
    milestones: MilestoneTracker,
    counts: Vec<TrackedCount>,
    release: Option<TrackedRelease>,
    broadcasters: Vec<Box<dyn Broadcaster>>,
}

impl GrowthAgent {
    pub fn new(store: SnapshotStore, csv: CsvMirror, milestones: MilestoneTracker) -> Self {
        Self {
            store,
            csv,
            milestones,
            counts: Vec::new(),
            release: None,
            broadcasters: Vec::new(),
        }
    }

    pub fn track(mut self, tracked: TrackedCount) -> Self {
        self.counts.push(tracked);
        self
    }

    pub fn track_release(mut self, release: TrackedRelease) -> Self {
        self.release = Some(release);
        self
    }

    pub fn broadcast_to(mut self, broadcaster: Box<dyn Broadcaster>) -> Self {
        self.broadcasters.push(broadcaster);
        self
    }

    pub fn is_tracking(&self, family: MetricFamily) -> bool {
        match family {
            MetricFamily::ReleaseVersion => self.release.is_some(),
            _ => self.counts.iter().any(|tracked| tracked.family == family),
        }
    }

    /// Fetches every family, records and formats the results, then hands
    /// the text to all broadcasters. Per-family failures never abort the run.
    pub async fn run_once(&self) -> RunReport {
        let mut report = RunReport::default();
        let mut milestone_values = Vec::with_capacity(self.counts.len());

        for family in MetricFamily::ALL {
            if family.is_tag() {
                if let Some(release) = &self.release {
                    self.observe_release(release, &mut report).await;
                }
                continue;
            }

            for tracked in self.counts.iter().filter(|tracked| tracked.family == family) {
                let value = self.observe_count(tracked, &mut report).await;
                milestone_values.push((tracked, value));
            }
        }

        for (tracked, value) in milestone_values {
            match self
                .milestones
                .check(tracked.family, value, &tracked.thresholds)
            {
                Ok(crossed) => report.announcements.extend(
                    crossed
                        .into_iter()
                        .map(|threshold| format_milestone(&tracked.label, threshold)),
                ),
                Err(error) => {
                    warn!(family = %tracked.family, error = %error, "failed to save milestone state");
                }
            }
        }

        self.deliver(&mut report).await;

        info!(
            families = report.summary.len(),
            failed = report.failed_families.len(),
            announcements = report.announcements.len(),
            delivered = report.delivered,
            "run complete"
        );
        report
    }

    /// Returns the value milestones should be checked against: the fresh
    /// count, or the stored one when the fetch failed.
    async fn observe_count(&self, tracked: &TrackedCount, report: &mut RunReport) -> u64 {
        let family = tracked.family;
        let previous = self.store.last::<u64>(family).unwrap_or(0);

        let current = match tracked.source.fetch_count().await {
            Ok(current) => current,
            Err(error) => {
                warn!(%family, error = %error, previous, "fetch failed, keeping previous value");
                report.summary.push(error_placeholder(&tracked.label));
                report.failed_families.push(family);
                return previous;
            }
        };

        let delta = compute_delta(previous, current);
        info!(%family, previous, current, increase = delta.increase, percent_change = %delta.percent_change, "metric fetched");
        report
            .summary
            .push(format_count_message(family.emoji(), &tracked.label, &delta));

        match self.store.append(family, current) {
            Ok(record) => {
                let info = delta.percent_change.to_string();
                if let Err(error) = self.csv.append_row(family, &tracked.label, &record, &info) {
                    warn!(%family, error = %error, "failed to mirror csv row");
                }
            }
            Err(error) => warn!(%family, error = %error, "failed to store snapshot"),
        }

        current
    }

    async fn observe_release(&self, release: &TrackedRelease, report: &mut RunReport) {
        let family = MetricFamily::ReleaseVersion;
        let previous = self.store.last::<String>(family);

        let current = match release.source.fetch_latest_tag().await {
            Ok(current) => current,
            Err(error) => {
                warn!(%family, error = %error, "release lookup failed");
                report.summary.push(error_placeholder(&release.label));
                report.failed_families.push(family);
                return;
            }
        };

        let delta = compare_release(previous.as_deref(), &current);
        info!(%family, previous = previous.as_deref().unwrap_or(NOT_APPLICABLE), current = %current, new_release = delta.is_new_release, "release fetched");
        report
            .summary
            .push(format_release_message(family.emoji(), &release.label, &delta));
        if delta.is_new_release {
            report.announcements.push(format_new_release(&delta.current));
        }

        match self.store.append(family, current) {
            Ok(record) => {
                let info = if delta.is_new_release { "new-release" } else { "" };
                if let Err(error) = self.csv.append_row(family, &release.label, &record, info) {
                    warn!(%family, error = %error, "failed to mirror csv row");
                }
            }
            Err(error) => warn!(%family, error = %error, "failed to store snapshot"),
        }
    }

    async fn deliver(&self, report: &mut RunReport) {
        if report.summary.is_empty() {
            return;
        }

        let summary = report.summary.join("\n\n");
        let messages = std::iter::once(summary.as_str())
            .chain(report.announcements.iter().map(String::as_str));

        let mut delivered = 0;
        for message in messages {
            for broadcaster in &self.broadcasters {
                match broadcaster.broadcast(message).await {
                    Ok(()) => delivered += 1,
                    Err(error) => {
                        warn!(destination = broadcaster.name(), error = %error, "failed to broadcast");
                    }
                }
            }
        }
        report.delivered += delivered;
    }
}
