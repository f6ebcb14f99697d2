//! The head manager: registry, scheduling, capture and document emission in
//! one owned value.
//!
//! Lifecycle:
//! - `mount`/`update`/`unmount` change the registry and move the manager to
//!   `PendingRecompute`; the scheduler decides whether that flushes now or at
//!   the next `commit`.
//! - A flush reduces exactly once, applies the result to the document when
//!   the manager may mutate one, and moves to `Resolved`.
//! - `peek` resolves any pending recompute before returning, so capture never
//!   sees stale state. `rewind` peeks, then resets for the next request.

use crate::config::HeadConfig;
use crate::dom::{DomEmitter, HeadChange};
use crate::props::PropBag;
use crate::reduce::reduce;
use crate::registry::{InstanceId, InstanceRegistry};
use crate::scheduler::{Batched, Immediate, Scheduler};
use crate::state::HeadState;
use html::{Detached, Document};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    PendingRecompute,
    Resolved,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub reductions: u64,
    /// Emits that reached the document, including no-op ones.
    pub emits: u64,
    pub patches: u64,
}

/// Called after every document emit that changed something.
pub type Observer = Box<dyn FnMut(&HeadState, &HeadChange) + Send>;

pub struct HeadManager<D: Document = Detached> {
    config: HeadConfig,
    registry: InstanceRegistry,
    scheduler: Box<dyn Scheduler + Send>,
    phase: Phase,
    snapshot: Option<HeadState>,
    document: Option<D>,
    emitter: DomEmitter,
    counters: Counters,
    observer: Option<Observer>,
}

impl HeadManager<Detached> {
    /// A capture-only manager.
    pub fn new(config: HeadConfig, scheduler: Box<dyn Scheduler + Send>) -> Self {
        Self::build(config, scheduler, None)
    }

    /// Capture-only manager that resolves on every change.
    pub fn server(config: HeadConfig) -> Self {
        Self::new(config, Box::new(Immediate))
    }
}

impl<D: Document> HeadManager<D> {
    pub fn with_document(
        config: HeadConfig,
        scheduler: Box<dyn Scheduler + Send>,
        document: D,
    ) -> Self {
        Self::build(config, scheduler, Some(document))
    }

    /// Manager bound to a live document. `deferred` batches changes until
    /// `commit`.
    pub fn client(config: HeadConfig, document: D, deferred: bool) -> Self {
        let scheduler: Box<dyn Scheduler + Send> = if deferred {
            Box::new(Batched::new())
        } else {
            Box::new(Immediate)
        };
        Self::with_document(config, scheduler, document)
    }

    fn build(config: HeadConfig, scheduler: Box<dyn Scheduler + Send>, document: Option<D>) -> Self {
        Self {
            config,
            registry: InstanceRegistry::new(),
            scheduler,
            phase: Phase::Idle,
            snapshot: None,
            document,
            emitter: DomEmitter::new(),
            counters: Counters::default(),
            observer: None,
        }
    }

    pub fn config(&self) -> &HeadConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn mounted(&self) -> usize {
        self.registry.len()
    }

    pub fn document(&self) -> Option<&D> {
        self.document.as_ref()
    }

    /// The host's own access to the document. Managed nodes it removes are
    /// recovered from on the next emit.
    pub fn document_mut(&mut self) -> Option<&mut D> {
        self.document.as_mut()
    }

    pub fn can_mutate_document(&self) -> bool {
        self.config.can_use_dom && self.document.is_some()
    }

    pub fn on_change_client_state<F>(&mut self, observer: F)
    where
        F: FnMut(&HeadState, &HeadChange) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn mount(&mut self, props: PropBag) -> InstanceId {
        let id = self.registry.register(props);
        self.changed();
        id
    }

    /// Replace the props of a mounted instance. Unknown ids are ignored.
    pub fn update(&mut self, id: InstanceId, props: PropBag) -> bool {
        let known = self.registry.update(id, props);
        if known {
            self.changed();
        }
        known
    }

    /// Unknown ids are ignored.
    pub fn unmount(&mut self, id: InstanceId) -> bool {
        let known = self.registry.deregister(id);
        if known {
            self.changed();
        }
        known
    }

    /// Host commit boundary. Also retries an emit the document rejected.
    pub fn commit(&mut self) {
        let due = self.scheduler.on_commit();
        if due || self.phase == Phase::PendingRecompute {
            self.flush();
        }
    }

    /// Resolve a pending recompute now. No-op when nothing changed.
    pub fn flush(&mut self) {
        if self.phase != Phase::PendingRecompute {
            return;
        }
        let state = reduce(self.registry.iter(), &self.config);
        self.counters.reductions += 1;
        self.phase = Phase::Resolved;
        if self.can_mutate_document() && !self.apply(&state) {
            // Retried by the next commit or flush.
            self.phase = Phase::PendingRecompute;
        }
        self.snapshot = Some(state);
    }

    /// Latest resolved state, resolving first if a recompute is pending.
    pub fn peek(&mut self) -> HeadState {
        self.flush();
        self.snapshot.clone().unwrap_or_default()
    }

    /// `peek`, then `reset`.
    pub fn rewind(&mut self) -> HeadState {
        let state = self.peek();
        self.reset();
        state
    }

    /// Drop every instance and the snapshot. The document keeps its managed
    /// nodes until the next flush replaces them.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.snapshot = None;
        self.phase = Phase::Idle;
        self.counters = Counters::default();
    }

    fn changed(&mut self) {
        self.phase = Phase::PendingRecompute;
        if self.scheduler.on_change() {
            self.flush();
        }
    }

    /// Emit `state` into the document. A rejected batch triggers one resync
    /// and retry; `false` means the document still does not reflect `state`.
    fn apply(&mut self, state: &HeadState) -> bool {
        let Some(document) = self.document.as_mut() else {
            return true;
        };
        let result = match self.emitter.emit(state, document) {
            Err(err) => {
                log::warn!(target: "head.dom", "{err}; removing managed nodes and retrying");
                match self.emitter.resync(document) {
                    Ok(_) => self.emitter.emit(state, document),
                    Err(err) => Err(err),
                }
            }
            ok => ok,
        };
        match result {
            Ok(change) => {
                self.counters.emits += 1;
                self.counters.patches += change.patches as u64;
                if !change.is_empty() {
                    if let Some(observer) = self.observer.as_mut() {
                        observer(state, &change);
                    }
                }
                true
            }
            Err(err) => {
                log::warn!(target: "head.dom", "{err}; retrying on next commit");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagDescriptor;
    use html::{Attribute, DomPatch, DomPatchError, DomStore, PatchKey};
    use std::sync::{Arc, Mutex};

    struct Flaky {
        inner: DomStore,
        reject: bool,
    }

    impl Document for Flaky {
        fn find_element(&self, name: &str) -> Option<PatchKey> {
            self.inner.find_element(name)
        }

        fn attributes(&self, key: PatchKey) -> Option<Vec<Attribute>> {
            self.inner.attributes(key)
        }

        fn parent(&self, key: PatchKey) -> Option<PatchKey> {
            self.inner.parent(key)
        }

        fn allocate_key(&mut self) -> PatchKey {
            self.inner.allocate_key()
        }

        fn apply(&mut self, patches: &[DomPatch]) -> Result<(), DomPatchError> {
            if self.reject {
                return Err(DomPatchError::MissingRoot);
            }
            self.inner.apply(patches)
        }
    }

    #[test]
    fn immediate_reduces_once_per_change() {
        let mut manager = HeadManager::server(HeadConfig::default());
        let a = manager.mount(PropBag::new().title("a"));
        manager.mount(PropBag::new().title("b"));
        manager.update(a, PropBag::new().title("a2"));
        assert_eq!(manager.counters().reductions, 3);
        assert_eq!(manager.phase(), Phase::Resolved);
        assert_eq!(manager.peek().title_text().as_deref(), Some("b"));
        assert_eq!(manager.counters().reductions, 3);
    }

    #[test]
    fn batched_reduces_once_per_commit() {
        let mut manager = HeadManager::client(HeadConfig::default(), DomStore::new(), true);
        manager.mount(PropBag::new().title("a"));
        manager.mount(PropBag::new().title("b"));
        assert_eq!(manager.phase(), Phase::PendingRecompute);
        assert_eq!(manager.counters().reductions, 0);
        manager.commit();
        assert_eq!(manager.counters().reductions, 1);
        manager.commit();
        assert_eq!(manager.counters().reductions, 1);
    }

    #[test]
    fn unmount_before_flush_is_excluded() {
        let mut manager = HeadManager::client(HeadConfig::default(), DomStore::new(), true);
        manager.mount(PropBag::new().title("kept"));
        let gone = manager.mount(PropBag::new().title("gone"));
        assert!(manager.unmount(gone));
        manager.commit();
        assert_eq!(manager.peek().title_text().as_deref(), Some("kept"));
    }

    #[test]
    fn peek_resolves_pending_changes() {
        let mut manager = HeadManager::new(HeadConfig::default(), Box::new(Batched::new()));
        manager.mount(PropBag::new().title("late"));
        assert_eq!(manager.peek().title_text().as_deref(), Some("late"));
        assert_eq!(manager.phase(), Phase::Resolved);
    }

    #[test]
    fn peek_without_mounts_is_fallback() {
        let mut manager = HeadManager::server(HeadConfig::default());
        assert_eq!(manager.peek(), HeadState::fallback());
        assert_eq!(manager.counters().reductions, 0);
    }

    #[test]
    fn rewind_resets_for_the_next_request() {
        let mut manager = HeadManager::server(HeadConfig::default());
        manager.mount(PropBag::new().title("first"));
        let captured = manager.rewind();
        assert_eq!(captured.title_text().as_deref(), Some("first"));
        assert_eq!(manager.mounted(), 0);
        assert_eq!(manager.phase(), Phase::Idle);
        assert_eq!(manager.counters(), Counters::default());
        assert_eq!(manager.peek(), HeadState::fallback());
    }

    #[test]
    fn document_is_left_alone_when_dom_is_disabled() {
        let config = HeadConfig {
            can_use_dom: false,
            ..HeadConfig::default()
        };
        let mut manager = HeadManager::client(config, DomStore::new(), false);
        assert!(!manager.can_mutate_document());
        manager.mount(PropBag::new().title("T"));
        assert_eq!(manager.document().map(DomStore::version), Some(0));
        assert_eq!(manager.counters().emits, 0);
        assert!(!HeadManager::server(HeadConfig::default()).can_mutate_document());
    }

    #[test]
    fn observer_sees_added_and_removed_nodes() {
        let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let mut manager = HeadManager::client(HeadConfig::default(), DomStore::new(), false);
        manager.on_change_client_state(move |_, change| {
            if let Ok(mut seen) = sink.lock() {
                seen.push((change.added.len(), change.removed.len()));
            }
        });
        let id = manager.mount(
            PropBag::new().meta(TagDescriptor::new().attr("name", "a").attr("content", "1")),
        );
        manager.update(
            id,
            PropBag::new().meta(TagDescriptor::new().attr("name", "a").attr("content", "1")),
        );
        manager.unmount(id);
        assert_eq!(*seen.lock().expect("lock"), vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn rejected_batch_resynchronizes() {
        let document = Flaky {
            inner: DomStore::new(),
            reject: true,
        };
        let mut manager = HeadManager::client(HeadConfig::default(), document, false);
        manager.mount(PropBag::new().title("T"));
        assert_eq!(manager.counters().emits, 0);
        assert_eq!(manager.phase(), Phase::PendingRecompute);
        assert_eq!(manager.peek().title_text().as_deref(), Some("T"));

        if let Some(document) = manager.document_mut() {
            document.reject = false;
        }
        manager.commit();
        assert_eq!(manager.phase(), Phase::Resolved);
        assert_eq!(manager.counters().emits, 1);
        let inner = &manager.document().expect("document").inner;
        let head = inner.find_element("head").expect("head");
        let head = inner.materialize_key(head).expect("materialize");
        assert_eq!(html::to_html(head.children()), "<title>T</title>");
    }
}
