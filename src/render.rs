//! Pure Snapshot -> render-tree transform. Nothing here touches the
//! terminal; `main` commits these cards to ratatui widgets in whichever
//! layout is configured.

use crate::state::{DeltaValue, Entry, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Tri-state classification driven by the sign of `diff`.
pub fn trend(diff: f64) -> Trend {
    if diff > 0.0 {
        Trend::Up
    } else if diff < 0.0 {
        Trend::Down
    } else {
        Trend::Flat
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub value: String,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryCard {
    pub title: String,
    pub link: Option<String>,
    pub count_text: String,
    pub gender_line: Option<String>,
    pub ratio_line: Option<String>,
    pub comparison_rows: Vec<ComparisonRow>,
}

/// One card per snapshot entry, in snapshot order.
pub fn build_cards(snapshot: &Snapshot) -> Vec<EntryCard> {
    snapshot.entries.iter().map(build_card).collect()
}

pub fn build_card(entry: &Entry) -> EntryCard {
    let (gender_line, ratio_line) = match &entry.gender {
        Some(detail) => (
            Some(format!(
                "M {} / F {} / ? {}",
                detail.male, detail.female, detail.unknown
            )),
            // Ratio is preformatted upstream; shown as-is.
            Some(format!("ratio {}", detail.ratio)),
        ),
        None => (None, None),
    };

    let comparison_rows = match &entry.comparison {
        Some(comparison) => vec![
            delta_row("vs yesterday", &comparison.vs_yesterday),
            delta_row("vs last week", &comparison.vs_last_week),
        ],
        None => Vec::new(),
    };

    EntryCard {
        title: entry.display_name.clone(),
        link: entry.url.clone(),
        count_text: format!("{} posts", entry.count),
        gender_line,
        ratio_line,
        comparison_rows,
    }
}

pub fn updated_line(snapshot: &Snapshot) -> String {
    format!("Updated: {}", snapshot.last_updated)
}

fn delta_row(label: &'static str, delta: &DeltaValue) -> ComparisonRow {
    ComparisonRow {
        label,
        value: format!("{} ({})", delta.diff_text, delta.rate_text),
        trend: trend(delta.diff),
    }
}
