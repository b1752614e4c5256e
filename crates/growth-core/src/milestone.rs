use crate::family::MetricFamily;
use crate::store::{StoreError, write_json_atomically};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Thresholds already announced, per family key. Entries are only ever
/// added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneState {
    announced: BTreeMap<String, BTreeSet<u64>>,
}

impl MilestoneState {
    pub fn announced(&self, key: &str) -> Option<&BTreeSet<u64>> {
        self.announced.get(key)
    }

    pub fn families(&self) -> impl Iterator<Item = (&str, &BTreeSet<u64>)> {
        self.announced
            .iter()
            .map(|(key, thresholds)| (key.as_str(), thresholds))
    }

    /// Marks every threshold reached by `value` and returns the ones that
    /// were not announced before, in ascending order.
    pub fn advance(&mut self, key: &str, value: u64, thresholds: &[u64]) -> Vec<u64> {
        let mut ordered = thresholds.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let announced = self.announced.entry(key.to_owned()).or_default();
        ordered
            .into_iter()
            .filter(|threshold| value >= *threshold)
            .filter(|threshold| announced.insert(*threshold))
            .collect()
    }

    /// Folds thresholds recorded under `legacy_key` into `key` and drops the
    /// legacy entry. Returns whether anything moved.
    pub fn adopt_legacy(&mut self, key: &str, legacy_key: &str) -> bool {
        if key == legacy_key {
            return false;
        }
        let Some(legacy) = self.announced.remove(legacy_key) else {
            return false;
        };
        self.announced.entry(key.to_owned()).or_default().extend(legacy);
        true
    }
}

/// File-backed milestone state. Each check is a full read-modify-write of
/// the state file; overlapping runs lose updates.
#[derive(Debug, Clone)]
pub struct MilestoneTracker {
    path: PathBuf,
}

impl MilestoneTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state, treating a missing or broken file as nothing
    /// announced yet.
    pub fn load(&self) -> MilestoneState {
        match self.read_state() {
            Ok(state) => state,
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "unreadable milestone state, starting empty");
                MilestoneState::default()
            }
        }
    }

    /// Older state files are keyed by display label; those entries are
    /// migrated to the family key before advancing.
    pub fn check(
        &self,
        family: MetricFamily,
        value: u64,
        thresholds: &[u64],
    ) -> Result<Vec<u64>, StoreError> {
        let mut state = self.load();
        if state.adopt_legacy(family.key(), family.default_label()) {
            info!(%family, legacy_key = family.default_label(), "migrated label-keyed milestone state");
        }
        let crossed = state.advance(family.key(), value, thresholds);
        write_json_atomically(&self.path, &state)?;

        if !crossed.is_empty() {
            info!(%family, value, ?crossed, "milestones crossed");
        }
        Ok(crossed)
    }

    fn read_state(&self) -> Result<MilestoneState, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(MilestoneState::default()),
            Err(error) => Err(error.into()),
        }
    }
}
