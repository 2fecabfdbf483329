use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

use crate::config::Layout;

const MAX_LOGS: usize = 200;

/// One period-over-period comparison value. The display strings are
/// precomputed upstream and rendered verbatim; only `diff`'s sign is
/// interpreted here.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaValue {
    pub diff: f64,
    pub diff_text: String,
    pub rate_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub vs_yesterday: DeltaValue,
    pub vs_last_week: DeltaValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenderDetail {
    pub male: u64,
    pub female: u64,
    pub unknown: u64,
    /// Preformatted ratio string, e.g. "3:2:1". Never recomputed client-side.
    pub ratio: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub display_name: String,
    pub count: u64,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub gender: Option<GenderDetail>,
    pub comparison: Option<Comparison>,
}

/// One complete dataset for the view. Replaced atomically on every successful
/// refresh; the screen never mixes entries from two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub last_updated: String,
    pub entries: Vec<Entry>,
}

/// Display name (trimmed) -> comparison pair, fetched separately from the
/// snapshot and merged into it by name.
pub type ComparisonMap = HashMap<String, Comparison>;

pub struct AppState {
    pub layout: Layout,
    pub busy: bool,
    pub error: Option<String>,
    pub snapshot: Option<Snapshot>,
    pub fetched_at: Option<SystemTime>,
    pub scroll: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            busy: false,
            error: None,
            snapshot: None,
            fetched_at: None,
            scroll: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.snapshot.as_ref().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn scroll_down(&mut self) {
        let max = self.entry_count().saturating_sub(1);
        if self.scroll < max {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(msg.into());
    }
}

/// State mutations emitted by a provider, applied in order on the UI thread.
#[derive(Debug, Clone)]
pub enum Update {
    RefreshStarted { forced: bool },
    SetSnapshot(Snapshot),
    RefreshFailed(String),
    SetComparisons(ComparisonMap),
    Log(String),
}

#[derive(Debug, Clone, Copy)]
pub enum ProviderCommand {
    Refresh { force: bool },
}

pub fn apply_update(state: &mut AppState, update: Update) {
    match update {
        Update::RefreshStarted { forced } => {
            // Busy entry: loading placeholder replaces the entries and the
            // updated-time text is cleared until the cycle resolves.
            state.busy = true;
            state.error = None;
            state.snapshot = None;
            state.scroll = 0;
            let kind = if forced { "forced" } else { "normal" };
            state.push_log(format!("[INFO] Refresh started ({kind})"));
        }
        Update::SetSnapshot(snapshot) => {
            state.busy = false;
            state.error = None;
            state.scroll = 0;
            state.fetched_at = Some(SystemTime::now());
            state.push_log(format!(
                "[INFO] Snapshot rendered: {} entries, updated {}",
                snapshot.entries.len(),
                snapshot.last_updated
            ));
            state.snapshot = Some(snapshot);
        }
        Update::RefreshFailed(message) => {
            // A failed refresh discards stale entries rather than showing
            // data inconsistent with a just-failed reload.
            state.busy = false;
            state.snapshot = None;
            state.scroll = 0;
            state.push_log(format!("[WARN] Refresh failed: {message}"));
            state.error = Some(message);
        }
        Update::SetComparisons(map) => {
            let Some(snapshot) = state.snapshot.as_mut() else {
                return;
            };
            let mut hits = 0usize;
            for entry in &mut snapshot.entries {
                if let Some(comparison) = map.get(entry.display_name.trim()) {
                    entry.comparison = Some(comparison.clone());
                    hits += 1;
                }
            }
            // Unmatched map keys are ignored; entries without a match keep
            // whatever comparison the snapshot itself carried.
            if hits > 0 {
                state.push_log(format!("[INFO] Comparison data applied to {hits} entries"));
            }
        }
        Update::Log(msg) => state.push_log(msg),
    }
}
