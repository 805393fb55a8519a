use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use notify::event::{EventKind, ModifyKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::change::ChangeDetector;
use crate::watch::FileWatch;

type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// State shared between the monitor handle and its background task.
struct Shared {
    path: Mutex<PathBuf>,
    detector: Mutex<ChangeDetector>,
    watch: Mutex<Option<FileWatch>>,
    subscribers: Mutex<Vec<ChangeCallback>>,
}

impl Shared {
    fn check_changed(&self) -> bool {
        lock(&self.detector).has_changed()
    }

    fn emit(&self) {
        // Invoke outside the lock; a callback may subscribe or poke the
        // monitor again.
        let subscribers: Vec<ChangeCallback> = lock(&self.subscribers).clone();
        for callback in subscribers {
            callback();
        }
    }
}

/// Produces one unified "the backing file changed" signal from two
/// redundant channels: an OS file watch (primary, low latency) and a
/// long-interval poll of the file's mtime (backstop for missed or
/// unsupported file events, e.g. on network filesystems).
///
/// Both channels funnel through the same [`ChangeDetector`], so a change
/// announced by the watch is not re-announced by the next poll tick.
/// Watch setup is best-effort: when the OS watch cannot be established
/// the monitor degrades to polling only and logs a warning.
pub struct SyncMonitor {
    shared: Arc<Shared>,
    poll_interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl SyncMonitor {
    pub fn new(path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        let path = path.into();
        SyncMonitor {
            shared: Arc::new(Shared {
                detector: Mutex::new(ChangeDetector::new(&path)),
                path: Mutex::new(path),
                watch: Mutex::new(None),
                subscribers: Mutex::new(Vec::new()),
            }),
            poll_interval,
            task: None,
        }
    }

    /// Register a callback invoked (on the monitor task) for every unified
    /// change notification.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) {
        lock(&self.shared.subscribers).push(Arc::new(callback));
    }

    /// Manual change query, sharing the monitor's baseline: a change
    /// consumed here will not be announced again by the monitor.
    pub fn has_changed(&self) -> bool {
        self.shared.check_changed()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start both channels. A second call while running is a no-op. Must
    /// be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.task.is_some() {
            debug!(target: "dunmore", event = "sync_monitor_already_running");
            return;
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let watch = match FileWatch::new(events_tx) {
            Ok(mut watch) => {
                let path = lock(&self.shared.path).clone();
                if path.exists() {
                    if let Err(e) = watch.add_path(&path) {
                        warn!(
                            target: "dunmore",
                            event = "watch_setup_failed",
                            path = %path.display(),
                            error = %e,
                        );
                    }
                }
                Some(watch)
            }
            Err(e) => {
                // Unsupported platform or filesystem: polling carries the
                // load alone.
                warn!(
                    target: "dunmore",
                    event = "watch_unavailable",
                    error = %e,
                );
                None
            }
        };
        *lock(&self.shared.watch) = watch;

        let shared = Arc::clone(&self.shared);
        let poll = self.poll_interval;
        self.task = Some(tokio::spawn(run_loop(shared, poll, events_rx)));
        info!(
            target: "dunmore",
            event = "sync_monitor_started",
            poll_ms = self.poll_interval.as_millis() as u64,
        );
    }

    /// Cancel the poll task and deregister all watched paths. Safe to call
    /// when never started, twice, or from teardown after partial setup.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!(target: "dunmore", event = "sync_monitor_stopped");
        }
        if let Some(mut watch) = lock(&self.shared.watch).take() {
            watch.clear();
        }
    }

    /// Re-register the watch against the current backing path, e.g. after
    /// the store location changed. Tolerates the old path no longer
    /// existing. Resets the detector baseline.
    pub fn refresh_path(&self, path: &Path) {
        *lock(&self.shared.path) = path.to_path_buf();
        lock(&self.shared.detector).set_path(path);
        if let Some(watch) = lock(&self.shared.watch).as_mut() {
            watch.clear();
            if path.exists() {
                if let Err(e) = watch.add_path(path) {
                    warn!(
                        target: "dunmore",
                        event = "watch_refresh_failed",
                        path = %path.display(),
                        error = %e,
                    );
                }
            }
        }
    }
}

impl Drop for SyncMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(
    shared: Arc<Shared>,
    poll: Duration,
    mut events_rx: mpsc::UnboundedReceiver<notify::Result<notify::Event>>,
) {
    let mut ticker = tokio::time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval yields immediately; swallow that tick so the backstop
    // waits a full interval before its first check.
    ticker.tick().await;

    let mut events_open = true;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if shared.check_changed() {
                    debug!(target: "dunmore", event = "change_detected", channel = "poll");
                    shared.emit();
                }
            }
            maybe = events_rx.recv(), if events_open => match maybe {
                Some(Ok(event)) => handle_fs_event(&shared, &event),
                Some(Err(e)) => {
                    warn!(target: "dunmore", event = "watch_event_error", error = %e);
                }
                None => events_open = false,
            }
        }
    }
}

fn handle_fs_event(shared: &Shared, event: &notify::Event) {
    let path = lock(&shared.path).clone();

    // Some backends canonicalize paths in events; fall back to comparing
    // file names since only one file is ever registered.
    let concerns_backing_file = event.paths.is_empty()
        || event
            .paths
            .iter()
            .any(|p| p == &path || p.file_name() == path.file_name());
    if !concerns_backing_file {
        return;
    }

    // Delete or rename-over kills the OS-side watch; mirror that in the
    // registry so the rearm below can see it.
    if matches!(
        event.kind,
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
    ) {
        if let Some(watch) = lock(&shared.watch).as_mut() {
            watch.note_dropped(&path);
        }
    }

    // Funnel through the detector: the poll backstop then stays silent
    // about a change already announced here.
    if shared.check_changed() {
        debug!(target: "dunmore", event = "change_detected", channel = "watch");
        shared.emit();
    }

    rearm_watch(shared, &path);
}

fn rearm_watch(shared: &Shared, path: &Path) {
    if let Some(watch) = lock(&shared.watch).as_mut() {
        if watch.is_empty() && path.exists() {
            match watch.add_path(path) {
                Ok(()) => {
                    debug!(target: "dunmore", event = "watch_rearmed", path = %path.display());
                }
                Err(e) => {
                    warn!(
                        target: "dunmore",
                        event = "watch_rearm_failed",
                        path = %path.display(),
                        error = %e,
                    );
                }
            }
        }
    }
}
