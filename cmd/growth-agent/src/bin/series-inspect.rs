use chrono::SecondsFormat;
use growth_core::{MetricFamily, MilestoneTracker, SnapshotStore, format::group_thousands};
use std::{env, path::PathBuf};

fn main() {
    let args: Vec<String> = env::args().collect();
    let data_dir = PathBuf::from(env::var("GROWTH_AGENT_DATA_DIR").unwrap_or_else(|_| "data".to_owned()));

    match args.get(1).map(String::as_str) {
        Some("list") => {
            let Some(family) = args.get(2) else {
                print_usage();
                return;
            };
            let family = match family.parse::<MetricFamily>() {
                Ok(family) => family,
                Err(error) => {
                    eprintln!("{error}");
                    return;
                }
            };
            let limit = args
                .get(3)
                .and_then(|raw| raw.parse::<usize>().ok())
                .unwrap_or(20);

            let store = SnapshotStore::new(data_dir);
            if family.is_tag() {
                let series = store.load::<String>(family);
                for record in series.recent(limit) {
                    let timestamp = record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
                    println!("#{} [{}] {}", record.id, timestamp, record.count);
                }
            } else {
                let series = store.load::<u64>(family);
                for record in series.recent(limit) {
                    let timestamp = record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
                    println!("#{} [{}] {}", record.id, timestamp, group_thousands(record.count));
                }
            }
        }
        Some("milestones") => {
            let tracker = MilestoneTracker::new(data_dir.join("milestones.json"));
            let state = tracker.load();
            let mut empty = true;
            for (family, thresholds) in state.families() {
                empty = false;
                let rendered: Vec<String> = thresholds.iter().copied().map(group_thousands).collect();
                println!("{family}: {}", rendered.join(", "));
            }
            if empty {
                println!("no milestones announced yet");
            }
        }
        _ => print_usage(),
    }
}

fn print_usage() {
    eprintln!("usage:");
    eprintln!("  series-inspect list <family> [limit]");
    eprintln!("  series-inspect milestones");
    eprintln!("families:");
    for family in MetricFamily::ALL {
        eprintln!("  {} ({})", family.key(), family.default_label());
    }
}
