//! Offline provider: synthesizes snapshots and comparison maps so the
//! dashboard can run without the aggregation service. Speaks the same
//! command/update protocol as the real provider.

use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use chrono::Local;
use rand::Rng;

use crate::state::{
    Comparison, ComparisonMap, DeltaValue, Entry, GenderDetail, ProviderCommand, Snapshot, Update,
};

struct DemoSite {
    name: &'static str,
    base_count: u64,
    gendered: bool,
}

const DEMO_SITES: [DemoSite; 4] = [
    DemoSite {
        name: "Harbor Lounge",
        base_count: 42,
        gendered: false,
    },
    DemoSite {
        name: "Night Owl Board",
        base_count: 17,
        gendered: false,
    },
    DemoSite {
        name: "Cedar Room",
        base_count: 31,
        gendered: true,
    },
    DemoSite {
        name: "Corner Post",
        base_count: 8,
        gendered: false,
    },
];

pub fn spawn_demo_provider(tx: Sender<Update>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let mut yesterday: Vec<u64> = DEMO_SITES.iter().map(|s| s.base_count).collect();

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Refresh { force } => {
                    let _ = tx.send(Update::RefreshStarted { forced: force });
                    // Leave the busy state visible for a beat.
                    thread::sleep(Duration::from_millis(400));

                    if force {
                        let _ = tx.send(Update::Log(
                            "[INFO] Demo feed: simulated upstream recount".to_string(),
                        ));
                    }

                    let counts: Vec<u64> = DEMO_SITES
                        .iter()
                        .map(|site| jitter_count(site.base_count, &mut rng))
                        .collect();
                    let _ = tx.send(Update::SetSnapshot(demo_snapshot(&counts, &mut rng)));
                    let _ = tx.send(Update::SetComparisons(demo_comparisons(
                        &counts, &yesterday,
                    )));
                    yesterday = counts;
                }
            }
        }
    });
}

fn demo_snapshot(counts: &[u64], rng: &mut impl Rng) -> Snapshot {
    let entries = DEMO_SITES
        .iter()
        .zip(counts)
        .map(|(site, &count)| {
            let gender = site.gendered.then(|| {
                let male = rng.gen_range(0..=count);
                let female = rng.gen_range(0..=(count - male));
                let unknown = count - male - female;
                GenderDetail {
                    male,
                    female,
                    unknown,
                    ratio: ratio_text(male, female, unknown),
                }
            });
            Entry {
                display_name: site.name.to_string(),
                count,
                url: None,
                image_url: None,
                gender,
                comparison: None,
            }
        })
        .collect();

    Snapshot {
        last_updated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        entries,
    }
}

fn demo_comparisons(counts: &[u64], yesterday: &[u64]) -> ComparisonMap {
    DEMO_SITES
        .iter()
        .zip(counts.iter().zip(yesterday))
        .map(|(site, (&now, &prev))| {
            let day = delta_value(now as i64 - prev as i64, prev);
            // Week-over-week against the seeded baseline.
            let week = delta_value(now as i64 - site.base_count as i64, site.base_count);
            (
                site.name.to_string(),
                Comparison {
                    vs_yesterday: day,
                    vs_last_week: week,
                },
            )
        })
        .collect()
}

fn delta_value(diff: i64, reference: u64) -> DeltaValue {
    let rate_text = if reference == 0 {
        "n/a".to_string()
    } else {
        format!("{:+.1}%", diff as f64 / reference as f64 * 100.0)
    };
    DeltaValue {
        diff: diff as f64,
        diff_text: format!("{diff:+}"),
        rate_text,
    }
}

fn jitter_count(base: u64, rng: &mut impl Rng) -> u64 {
    let spread = (base / 4).max(2) as i64;
    (base as i64 + rng.gen_range(-spread..=spread)).max(0) as u64
}

fn ratio_text(male: u64, female: u64, unknown: u64) -> String {
    let g = gcd(gcd(male, female), unknown).max(1);
    format!("{}:{}:{}", male / g, female / g, unknown / g)
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
