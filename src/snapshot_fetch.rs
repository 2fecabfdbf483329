use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::RefreshError;
use crate::state::{Comparison, ComparisonMap, DeltaValue, Entry, GenderDetail, Snapshot};

const POSTS_PATH: &str = "/api/posts";
const REFRESH_PATH: &str = "/api/refresh";
const COMPARISON_PATH: &str = "/api/comparison";

/// Fetch the primary snapshot. `force` selects the upstream-recompute
/// endpoint instead of the cached read.
pub fn fetch_snapshot(client: &Client, base_url: &str, force: bool) -> Result<Snapshot, RefreshError> {
    let path = if force { REFRESH_PATH } else { POSTS_PATH };
    let response = client
        .get(format!("{base_url}{path}"))
        .send()?
        .error_for_status()?;
    let body = response.text()?;
    parse_snapshot_json(&body, force)
}

/// Fetch the comparison map. Best-effort: callers swallow failures.
pub fn fetch_comparison(client: &Client, base_url: &str) -> Result<ComparisonMap> {
    let response = client
        .get(format!("{base_url}{COMPARISON_PATH}"))
        .send()
        .context("comparison request failed")?
        .error_for_status()
        .context("comparison request rejected")?;
    let body = response.text().context("comparison body unreadable")?;
    parse_comparison_json(&body)
}

#[derive(Debug, Deserialize)]
struct SnapshotWire {
    #[serde(default)]
    last_updated: Option<String>,
    #[serde(default)]
    post_data: Option<Vec<EntryWire>>,
}

#[derive(Debug, Deserialize)]
struct EntryWire {
    display_name: String,
    count: u64,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    gender_detail: Option<GenderDetailWire>,
    #[serde(default)]
    comparison: Option<ComparisonWire>,
}

#[derive(Debug, Deserialize)]
struct GenderDetailWire {
    #[serde(default)]
    male: u64,
    #[serde(default)]
    female: u64,
    #[serde(default)]
    unknown: u64,
    #[serde(default)]
    ratio: String,
}

#[derive(Debug, Deserialize)]
struct ComparisonWire {
    yesterday_comparison: DeltaWire,
    last_week_comparison: DeltaWire,
}

#[derive(Debug, Deserialize)]
struct DeltaWire {
    diff: f64,
    #[serde(default)]
    diff_text: String,
    #[serde(default)]
    rate_text: String,
}

/// Parse a primary-endpoint body into a snapshot.
///
/// The forced-refresh endpoint sometimes wraps its snapshot in an outer
/// envelope under a `data` field and sometimes returns it bare; the upstream
/// contract is inconsistent, so detection is by key presence only, and only
/// for forced refreshes.
pub fn parse_snapshot_json(raw: &str, forced: bool) -> Result<Snapshot, RefreshError> {
    let mut root: Value = serde_json::from_str(raw.trim())?;
    if forced {
        if let Some(inner) = root.get_mut("data") {
            root = inner.take();
        }
    }
    if root.is_null() {
        return Err(RefreshError::Shape);
    }

    let wire: SnapshotWire = serde_json::from_value(root)?;
    let entries = wire.post_data.ok_or(RefreshError::Shape)?;

    Ok(Snapshot {
        last_updated: wire.last_updated.unwrap_or_default(),
        entries: entries.into_iter().map(build_entry).collect(),
    })
}

/// Parse the comparison endpoint body. Lenient per entry: malformed values
/// are dropped rather than failing the whole map, since enrichment is a
/// non-critical pass.
pub fn parse_comparison_json(raw: &str) -> Result<ComparisonMap> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(ComparisonMap::new());
    }

    let root: serde_json::Map<String, Value> =
        serde_json::from_str(trimmed).context("invalid comparison json")?;

    let mut map = ComparisonMap::new();
    for (name, value) in root {
        let Ok(wire) = serde_json::from_value::<ComparisonWire>(value) else {
            continue;
        };
        map.insert(name.trim().to_string(), build_comparison(wire));
    }
    Ok(map)
}

fn build_entry(wire: EntryWire) -> Entry {
    // gender_detail is honored only when the entry is gender-typed.
    let gender = match wire.kind.as_deref() {
        Some("gender") => wire.gender_detail.map(|detail| GenderDetail {
            male: detail.male,
            female: detail.female,
            unknown: detail.unknown,
            ratio: detail.ratio,
        }),
        _ => None,
    };

    Entry {
        display_name: wire.display_name,
        count: wire.count,
        url: wire.url.filter(|u| !u.trim().is_empty()),
        image_url: wire.image_url.filter(|u| !u.trim().is_empty()),
        gender,
        comparison: wire.comparison.map(build_comparison),
    }
}

fn build_comparison(wire: ComparisonWire) -> Comparison {
    Comparison {
        vs_yesterday: build_delta(wire.yesterday_comparison),
        vs_last_week: build_delta(wire.last_week_comparison),
    }
}

fn build_delta(wire: DeltaWire) -> DeltaValue {
    DeltaValue {
        diff: wire.diff,
        diff_text: wire.diff_text,
        rate_text: wire.rate_text,
    }
}
