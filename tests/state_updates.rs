use postwatch::config::Layout;
use postwatch::state::{
    AppState, Comparison, ComparisonMap, DeltaValue, Entry, Snapshot, Update, apply_update,
};

fn entry(name: &str, count: u64) -> Entry {
    Entry {
        display_name: name.to_string(),
        count,
        url: None,
        image_url: None,
        gender: None,
        comparison: None,
    }
}

fn snapshot(updated: &str, names: &[(&str, u64)]) -> Snapshot {
    Snapshot {
        last_updated: updated.to_string(),
        entries: names.iter().map(|&(n, c)| entry(n, c)).collect(),
    }
}

fn delta(diff: f64) -> DeltaValue {
    DeltaValue {
        diff,
        diff_text: format!("{diff:+}"),
        rate_text: "n/a".to_string(),
    }
}

fn comparison(day: f64, week: f64) -> Comparison {
    Comparison {
        vs_yesterday: delta(day),
        vs_last_week: delta(week),
    }
}

fn state_with(snap: Snapshot) -> AppState {
    let mut state = AppState::new(Layout::Cards);
    apply_update(&mut state, Update::SetSnapshot(snap));
    state
}

#[test]
fn refresh_started_clears_content_and_enters_busy() {
    let mut state = state_with(snapshot("T1", &[("A", 1)]));
    state.error = Some("stale error".to_string());

    apply_update(&mut state, Update::RefreshStarted { forced: true });

    assert!(state.busy);
    assert!(state.error.is_none());
    assert!(state.snapshot.is_none());
    assert_eq!(state.scroll, 0);
}

#[test]
fn set_snapshot_replaces_previous_content_atomically() {
    let mut state = state_with(snapshot("T1", &[("A", 1), ("B", 2)]));

    apply_update(&mut state, Update::RefreshStarted { forced: false });
    apply_update(&mut state, Update::SetSnapshot(snapshot("T2", &[("C", 3)])));

    let snap = state.snapshot.as_ref().expect("snapshot should be set");
    assert_eq!(snap.last_updated, "T2");
    assert_eq!(snap.entries.len(), 1);
    assert_eq!(snap.entries[0].display_name, "C");
    assert!(!state.busy);
    assert!(state.error.is_none());
}

#[test]
fn repeated_refresh_with_unchanged_upstream_is_idempotent() {
    let mut once = AppState::new(Layout::Cards);
    apply_update(&mut once, Update::RefreshStarted { forced: false });
    apply_update(&mut once, Update::SetSnapshot(snapshot("T", &[("A", 5), ("B", 2)])));

    let mut twice = AppState::new(Layout::Cards);
    for _ in 0..2 {
        apply_update(&mut twice, Update::RefreshStarted { forced: false });
        apply_update(&mut twice, Update::SetSnapshot(snapshot("T", &[("A", 5), ("B", 2)])));
    }

    assert_eq!(once.snapshot, twice.snapshot);
}

#[test]
fn refresh_failed_discards_entries_and_leaves_busy() {
    let mut state = state_with(snapshot("T1", &[("A", 1)]));

    apply_update(&mut state, Update::RefreshStarted { forced: true });
    apply_update(
        &mut state,
        Update::RefreshFailed("retrieval failed: boom".to_string()),
    );

    // All-or-nothing: a failed refresh never leaves stale entries behind,
    // and the trigger is usable again.
    assert!(state.snapshot.is_none());
    assert_eq!(state.error.as_deref(), Some("retrieval failed: boom"));
    assert!(!state.busy);
}

#[test]
fn comparisons_attach_by_trimmed_name_match() {
    let mut state = state_with(snapshot("T", &[("A", 1), (" B ", 2)]));

    let mut map = ComparisonMap::new();
    map.insert("A".to_string(), comparison(2.0, -1.0));
    map.insert("B".to_string(), comparison(0.0, 3.0));
    apply_update(&mut state, Update::SetComparisons(map));

    let snap = state.snapshot.as_ref().expect("snapshot still present");
    let a = snap.entries[0].comparison.as_ref().expect("A should match");
    assert_eq!(a.vs_yesterday.diff, 2.0);
    let b = snap.entries[1]
        .comparison
        .as_ref()
        .expect("entry name is trimmed for lookup");
    assert_eq!(b.vs_last_week.diff, 3.0);
}

#[test]
fn comparisons_replace_inline_section() {
    let mut snap = snapshot("T", &[("A", 1)]);
    snap.entries[0].comparison = Some(comparison(9.0, 9.0));
    let mut state = state_with(snap);

    let mut map = ComparisonMap::new();
    map.insert("A".to_string(), comparison(-4.0, 0.0));
    apply_update(&mut state, Update::SetComparisons(map));

    let applied = state.snapshot.as_ref().unwrap().entries[0]
        .comparison
        .as_ref()
        .expect("comparison should remain");
    assert_eq!(applied.vs_yesterday.diff, -4.0);
}

#[test]
fn unmatched_comparison_key_is_a_noop() {
    let mut snap = snapshot("T", &[("A", 1)]);
    snap.entries[0].comparison = Some(comparison(1.0, 1.0));
    let mut state = state_with(snap.clone());

    let mut map = ComparisonMap::new();
    map.insert("Ghost Site".to_string(), comparison(9.0, 9.0));
    apply_update(&mut state, Update::SetComparisons(map));

    // No entry created or altered for the unknown key; the inline section
    // on the miss entry survives.
    assert_eq!(state.snapshot.as_ref(), Some(&snap));
}

#[test]
fn comparisons_without_snapshot_are_ignored() {
    let mut state = AppState::new(Layout::Cards);
    apply_update(&mut state, Update::RefreshStarted { forced: false });

    let mut map = ComparisonMap::new();
    map.insert("A".to_string(), comparison(1.0, 1.0));
    apply_update(&mut state, Update::SetComparisons(map));

    assert!(state.snapshot.is_none());
    assert!(state.busy);
}

#[test]
fn stale_enrichment_lands_on_the_current_snapshot_by_name() {
    // A second refresh can complete before the first cycle's enrichment
    // resolves; the late map then attaches to whatever snapshot is current.
    let mut state = state_with(snapshot("T1", &[("A", 1)]));
    apply_update(&mut state, Update::RefreshStarted { forced: false });
    apply_update(&mut state, Update::SetSnapshot(snapshot("T2", &[("A", 8)])));

    let mut map = ComparisonMap::new();
    map.insert("A".to_string(), comparison(5.0, 5.0));
    apply_update(&mut state, Update::SetComparisons(map));

    let snap = state.snapshot.as_ref().unwrap();
    assert_eq!(snap.last_updated, "T2");
    assert!(snap.entries[0].comparison.is_some());
}

#[test]
fn log_ring_is_capped() {
    let mut state = AppState::new(Layout::Cards);
    for i in 0..500 {
        apply_update(&mut state, Update::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.back().map(String::as_str), Some("line 499"));
}
