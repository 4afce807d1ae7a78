//! Watch session: initial build, then filesystem-driven regeneration.
//!
//! # Lifecycle
//!
//! ```text
//! Stopped → Starting → Running → Stopping → Stopped
//! ```
//!
//! [`WatchSession::start`] ensures the output store, runs a full rebuild and
//! only then subscribes to the source and tests trees. The returned handle
//! owns the subscription thread; [`WatchSession::stop`] (or dropping the
//! handle) terminates it and removes the output store.

mod classifier;
mod debouncer;
mod settle;
mod subscription;
mod types;
mod watch_roots;


pub use classifier::{Action, ChangeClassifier, PathClass};
pub use types::ChangeBatch;

use std::{io, path::PathBuf, thread::JoinHandle};

use thiserror::Error;
use tokio::sync::oneshot;

use crate::{
    compose::GenerationError,
    config::ProjectConfig,
    debug, log,
    pipeline::Pipeline,
    store::{OutputStore, StoreError},
    utils::path::has_ancestor,
};
use subscription::Subscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("test page template is unusable")]
    Template(#[source] GenerationError),

    #[error("failed to subscribe to file changes")]
    Subscribe(#[from] notify::Error),

    #[error("failed to spawn watch thread")]
    Spawn(#[source] io::Error),
}

/// Owned handle of a running pipeline.
pub struct WatchSession {
    state: WatchState,
    store: OutputStore,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl WatchSession {
    /// Build everything once and start watching.
    pub fn start(config: &ProjectConfig) -> Result<Self, SessionError> {
        Self::start_with(config, true)
    }

    /// Like [`start`](Self::start); with `subscribe == false` the session
    /// only holds the initial build until stopped.
    pub fn start_with(config: &ProjectConfig, subscribe: bool) -> Result<Self, SessionError> {
        let pipeline = Pipeline::new(config);
        let mut session = Self {
            state: WatchState::Starting,
            store: pipeline.store().clone(),
            stop_tx: None,
            handle: None,
        };

        // An unusable template would fail every module on every change.
        pipeline
            .composer()
            .check_template()
            .map_err(SessionError::Template)?;

        if let Err(e) = pipeline.store().ensure() {
            log!("error"; "{}", e);
        }
        if let Err(e) = pipeline.rebuild_all() {
            log!("error"; "{}", e);
        }
        session.state = WatchState::Running;

        if subscribe {
            let subscription = Subscription::new(watch_roots(config), config.watch.clone())?;
            let (stop_tx, stop_rx) = oneshot::channel();
            let handle = std::thread::Builder::new()
                .name("testbed-watch".into())
                .spawn(move || run_subscription(subscription, pipeline, stop_rx))
                .map_err(SessionError::Spawn)?;

            session.stop_tx = Some(stop_tx);
            session.handle = Some(handle);
            log!("watch"; "watching for changes");
        }

        Ok(session)
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Terminate the subscription and remove the output store.
    ///
    /// Safe to call more than once, and after a failed start.
    pub fn stop(&mut self) -> Result<(), StoreError> {
        if self.state == WatchState::Stopped {
            return Ok(());
        }
        self.state = WatchState::Stopping;

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log!("error"; "watch thread panicked");
        }

        let result = self.store.clear();
        self.state = WatchState::Stopped;
        debug!("watch"; "removed {}", self.store.root().display());
        result
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log!("error"; "{}", e);
        }
    }
}

/// Source and tests roots, plus the fixtures directory when it lives
/// outside the tests tree.
fn watch_roots(config: &ProjectConfig) -> Vec<PathBuf> {
    let paths = &config.paths;
    let mut roots = vec![paths.source.clone(), paths.tests.clone()];
    if !has_ancestor(&paths.fixtures, &paths.tests) {
        roots.push(paths.fixtures.clone());
    }
    roots
}

fn run_subscription(
    subscription: Subscription,
    pipeline: Pipeline,
    stop_rx: oneshot::Receiver<()>,
) {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log!("error"; "failed to create watch runtime: {}", e);
            return;
        }
    };

    rt.block_on(subscription.run(pipeline, stop_rx));
}
