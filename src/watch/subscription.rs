//! Filesystem subscription: notify watcher → debouncer → settled batches.
//!
//! ```text
//! notify (sync) ─bridge thread─▶ tokio mpsc ─▶ Debouncer ─▶ settle ─▶ Pipeline
//! ```

use std::path::PathBuf;

use notify::RecommendedWatcher;
use tokio::sync::{mpsc, oneshot};

use super::debouncer::Debouncer;
use super::settle::settle;
use super::watch_roots::WatchRoots;
use crate::{config::WatchConfig, debug, log, pipeline::Pipeline};

pub(super) struct Subscription {
    /// Sync channel fed by the notify callback.
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Dropping the watcher terminates the subscription.
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    debouncer: Debouncer,
}

impl Subscription {
    pub(super) fn new(roots: Vec<PathBuf>, filter: WatchConfig) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(roots);
        watch_roots.attach_existing(&mut watcher)?;
        debug!("watch"; "watching {} root(s)", watch_roots.attached_count());

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            debouncer: Debouncer::new(filter),
        })
    }

    /// Deliver batches to `pipeline` until `stop_rx` fires or its sender is
    /// dropped. Batches are processed one at a time; events arriving during
    /// a rebuild queue up for the next batch.
    pub(super) async fn run(self, pipeline: Pipeline, mut stop_rx: oneshot::Receiver<()>) {
        let notify_rx = self.notify_rx;
        let mut watcher = self.watcher;
        let mut watch_roots = self.watch_roots;
        let mut debouncer = self.debouncer;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Exits once the watcher (and with it the notify sender) is dropped.
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);

                    let Some(raw) = debouncer.take_if_ready() else {
                        continue;
                    };
                    let batch = settle(raw);
                    if batch.is_empty() {
                        continue;
                    }
                    debug!("watch"; "batch of {} change(s)", batch.len());
                    if pipeline.process_batch(&batch).is_noop() {
                        debug!("watch"; "nothing to do");
                    }
                }
            }
        }

        drop(watcher);
        debug!("watch"; "subscription terminated");
    }
}
