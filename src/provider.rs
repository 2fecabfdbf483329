use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::http_client::http_client;
use crate::snapshot_fetch::{fetch_comparison, fetch_snapshot};
use crate::state::{ProviderCommand, Update};

/// Spawn the HTTP-backed provider thread. It serves one refresh command at a
/// time and answers every `Refresh` with exactly one busy-clearing update
/// (`SetSnapshot` or `RefreshFailed`).
pub fn spawn_provider(base_url: String, tx: Sender<Update>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Refresh { force } => run_refresh(&base_url, force, &tx),
            }
        }
    });
}

fn run_refresh(base_url: &str, force: bool, tx: &Sender<Update>) {
    let _ = tx.send(Update::RefreshStarted { forced: force });

    let fetched = http_client()
        .map_err(|err| err.to_string())
        .and_then(|client| fetch_snapshot(client, base_url, force).map_err(|err| err.to_string()));

    match fetched {
        Ok(snapshot) => {
            let _ = tx.send(Update::SetSnapshot(snapshot));
            enrich(base_url, tx);
        }
        Err(message) => {
            let _ = tx.send(Update::RefreshFailed(message));
        }
    }
}

/// Comparison pass. Issued only after the snapshot update has been sent, so
/// it never targets entries the UI has not seen. Failures are logged and
/// swallowed; this data is a non-critical enhancement.
fn enrich(base_url: &str, tx: &Sender<Update>) {
    let Ok(client) = http_client() else {
        return;
    };
    match fetch_comparison(client, base_url) {
        Ok(map) if !map.is_empty() => {
            let _ = tx.send(Update::SetComparisons(map));
        }
        Ok(_) => {}
        Err(err) => {
            let _ = tx.send(Update::Log(format!("[WARN] Comparison fetch error: {err:#}")));
        }
    }
}
