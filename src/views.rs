use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

/// The three top-level views of the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Dashboard,
    EntryForm,
    RecordTable,
}

/// Explicit per-view reload state. A view is Loading from the moment a
/// reload is dispatched until the reload callback returns; reload requests
/// arriving while Loading are ignored by design, which is what keeps
/// programmatic repopulation from re-triggering itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
}

/// Why a reload was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// The view became visible.
    Navigation,
    /// Another process touched the backing file.
    ExternalChange,
    /// This process completed a create/update/delete.
    LocalMutation,
}

/// Which local mutation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Created,
    Updated,
    Deleted,
}

type ReloadFn = Arc<dyn Fn(RefreshReason) + Send + Sync>;
type MutationFn = Arc<dyn Fn(MutationKind) + Send + Sync>;

struct ViewSlot {
    kind: ViewKind,
    caches_data: bool,
    state: ViewState,
    reload: ReloadFn,
}

struct Inner {
    views: Vec<ViewSlot>,
    active: Option<ViewKind>,
    mutation_subscribers: Vec<MutationFn>,
}

/// Translates change notifications into the minimum reload work.
///
/// External changes (from the change monitor) reload only the currently
/// active view. Local mutations are known-fresh and skip the detector
/// path entirely: every view holding cached list/aggregate data reloads
/// immediately. Reloads are full re-fetches, not incremental diffs.
pub struct ViewCoordinator {
    inner: Mutex<Inner>,
}

impl ViewCoordinator {
    pub fn new() -> Self {
        ViewCoordinator {
            inner: Mutex::new(Inner {
                views: Vec::new(),
                active: None,
                mutation_subscribers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a view's reload callback. One slot per kind; registering
    /// the same kind again replaces the previous callback. `caches_data`
    /// marks views that display list/aggregate data and therefore take
    /// part in mutation-driven reloads.
    pub fn register_view(
        &self,
        kind: ViewKind,
        caches_data: bool,
        reload: impl Fn(RefreshReason) + Send + Sync + 'static,
    ) {
        let mut inner = self.lock();
        inner.views.retain(|slot| slot.kind != kind);
        inner.views.push(ViewSlot {
            kind,
            caches_data,
            state: ViewState::Idle,
            reload: Arc::new(reload),
        });
    }

    /// Subscribe to "mutation completed" events, e.g. for a status bar.
    pub fn subscribe_mutations(&self, callback: impl Fn(MutationKind) + Send + Sync + 'static) {
        self.lock().mutation_subscribers.push(Arc::new(callback));
    }

    pub fn active(&self) -> Option<ViewKind> {
        self.lock().active
    }

    pub fn view_state(&self, kind: ViewKind) -> Option<ViewState> {
        self.lock()
            .views
            .iter()
            .find(|slot| slot.kind == kind)
            .map(|slot| slot.state)
    }

    /// Mark `kind` as the visible view and reload it if it shows data.
    pub fn activate(&self, kind: ViewKind) {
        self.lock().active = Some(kind);
        self.reload_one(kind, RefreshReason::Navigation);
    }

    /// The backing file changed under us: reload only the active view, to
    /// avoid wasted work on hidden ones.
    pub fn external_change(&self) {
        let active = self.lock().active;
        if let Some(kind) = active {
            self.reload_one(kind, RefreshReason::ExternalChange);
        }
    }

    /// A local create/update/delete succeeded: notify mutation subscribers
    /// and reload every data-holding view.
    pub fn record_mutation(&self, mutation: MutationKind) {
        let subscribers: Vec<MutationFn> = self.lock().mutation_subscribers.clone();
        for callback in subscribers {
            callback(mutation);
        }

        let kinds: Vec<ViewKind> = self
            .lock()
            .views
            .iter()
            .filter(|slot| slot.caches_data)
            .map(|slot| slot.kind)
            .collect();
        for kind in kinds {
            self.reload_one(kind, RefreshReason::LocalMutation);
        }
    }

    fn reload_one(&self, kind: ViewKind, reason: RefreshReason) {
        // Take the callback out under the lock, invoke it without, so a
        // reentrant reload request can observe the Loading state instead
        // of deadlocking.
        let reload = {
            let mut inner = self.lock();
            let Some(slot) = inner.views.iter_mut().find(|slot| slot.kind == kind) else {
                return;
            };
            if !slot.caches_data {
                return;
            }
            if slot.state == ViewState::Loading {
                debug!(target: "dunmore", event = "reload_suppressed", view = ?kind);
                return;
            }
            slot.state = ViewState::Loading;
            Arc::clone(&slot.reload)
        };

        debug!(target: "dunmore", event = "view_reload", view = ?kind, reason = ?reason);
        reload(reason);

        let mut inner = self.lock();
        if let Some(slot) = inner.views.iter_mut().find(|slot| slot.kind == kind) {
            slot.state = ViewState::Idle;
        }
    }
}

impl Default for ViewCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
