//! Asynchronous, cancellable image binding.
//!
//! One [`ImageLoader`] serves every slot of a pager. For each request it
//! checks the cache, and on a miss spawns one worker thread that re-checks
//! the cache, parks on the pause gate while scrolling is fast, resolves the
//! key through the [`ImageDecoder`], and posts the result back to the
//! coordination thread. The continuation there inserts the bitmap into the
//! cache and binds it only if the slot still expects the same key, so a slow
//! result can never overwrite a newer binding.
//!
//! At most one task is outstanding per slot: requesting a different key
//! cancels the previous task, while re-requesting the in-flight key starts
//! nothing new.

use ahash::AHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gridpager_cache::{Bitmap, BitmapCache};
use gridpager_core::{CancelToken, ContId, UiRuntime, WorkGate};

use crate::{sample_size, ImageDecoder, SourceKind, TargetSize};

/// Default cross-fade length when a bind transitions in.
pub const FADE_IN: Duration = Duration::from_millis(200);

/// How a freshly loaded bitmap should appear in its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindTransition {
    /// Swap the image in immediately.
    None,
    /// Fade from the placeholder over the given duration.
    CrossFade(Duration),
}

impl BindTransition {
    /// A cross-fade of the default [`FADE_IN`] length.
    pub fn cross_fade() -> Self {
        Self::CrossFade(FADE_IN)
    }
}

/// Identity of one slot view, assigned by the host's adapter-binding layer.
///
/// Tasks never hold view references; they carry a `SlotId` and look up the
/// slot's current state just-in-time on the coordination thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

impl SlotId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// What [`ImageLoader::request`] did with a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Cache hit; the bind ran synchronously.
    Cached,
    /// A worker was started for this key.
    Started,
    /// A task for the same key is already in flight; it will satisfy the
    /// request.
    InFlight,
}

struct PendingTask<K> {
    key: K,
    cont: ContId,
    token: CancelToken,
}

struct SlotState<K> {
    /// Key this slot currently represents; results for any other key are
    /// stale and discarded.
    expected: Option<K>,
    pending: Option<PendingTask<K>>,
}

impl<K> SlotState<K> {
    fn new() -> Self {
        Self {
            expected: None,
            pending: None,
        }
    }
}

/// State shared between the loader and its registered continuations.
/// Coordination-thread only, except for the cache.
struct LoaderShared<D: ImageDecoder> {
    cache: Arc<BitmapCache<D::Key>>,
    slots: RefCell<AHashMap<SlotId, SlotState<D::Key>>>,
}

/// Resolves item keys to bitmaps and binds them to slots, cache-first.
///
/// Owned by the coordination thread; not `Send`. Workers communicate back
/// exclusively through the [`UiRuntime`]'s dispatcher.
pub struct ImageLoader<D: ImageDecoder + 'static> {
    runtime: UiRuntime,
    shared: Rc<LoaderShared<D>>,
    decoder: Arc<D>,
    gate: WorkGate,
    target: TargetSize,
    transition: BindTransition,
}

impl<D: ImageDecoder + 'static> ImageLoader<D> {
    pub fn new(runtime: &UiRuntime, cache: Arc<BitmapCache<D::Key>>, decoder: Arc<D>) -> Self {
        Self {
            runtime: runtime.clone(),
            shared: Rc::new(LoaderShared {
                cache,
                slots: RefCell::new(AHashMap::new()),
            }),
            decoder,
            gate: WorkGate::new(),
            target: TargetSize::default(),
            transition: BindTransition::None,
        }
    }

    /// Overrides the decode target dimensions.
    pub fn with_target(mut self, target: TargetSize) -> Self {
        self.target = target;
        self
    }

    /// Sets how freshly loaded bitmaps appear; defaults to no transition.
    pub fn with_transition(mut self, transition: BindTransition) -> Self {
        self.transition = transition;
        self
    }

    /// Requests that `slot` display the image for `key`.
    ///
    /// `bind` runs on the coordination thread: synchronously on a cache hit,
    /// or from a later [`UiRuntime::run_until_idle`] drain once a worker has
    /// produced the image. It is dropped without running if the result turns
    /// out stale, cancelled, or absent.
    ///
    /// Requesting the key already in flight for this slot is a no-op
    /// ([`RequestOutcome::InFlight`]); requesting a different key cancels
    /// the previous task first.
    pub fn request<B>(&self, slot: SlotId, key: D::Key, bind: B) -> RequestOutcome
    where
        B: FnOnce(Arc<Bitmap>, BindTransition) + 'static,
    {
        {
            let mut slots = self.shared.slots.borrow_mut();
            let state = slots.entry(slot).or_insert_with(SlotState::new);
            if let Some(pending) = state.pending.take() {
                if pending.key == key {
                    state.pending = Some(pending);
                    return RequestOutcome::InFlight;
                }
                self.cancel_task(&pending);
            }
            state.expected = Some(key.clone());
        }

        if let Some(bitmap) = self.shared.cache.get(&key) {
            bind(bitmap, self.transition);
            return RequestOutcome::Cached;
        }

        let token = CancelToken::new();
        let cont = {
            let shared = Rc::clone(&self.shared);
            let key = key.clone();
            let token = token.clone();
            let transition = self.transition;
            self.runtime
                .register_cont(move |result: Option<Arc<Bitmap>>| {
                    Self::complete(&shared, slot, key, &token, transition, result, bind);
                })
        };
        self.shared
            .slots
            .borrow_mut()
            .entry(slot)
            .or_insert_with(SlotState::new)
            .pending = Some(PendingTask {
            key: key.clone(),
            cont,
            token: token.clone(),
        });

        // One worker per outstanding task.
        let decoder = Arc::clone(&self.decoder);
        let cache = Arc::clone(&self.shared.cache);
        let gate = self.gate.clone();
        let dispatcher = self.runtime.dispatcher();
        let target = self.target;
        thread::spawn(move || {
            let result = resolve(&*decoder, &cache, &gate, &token, &key, target);
            if token.is_cancelled() {
                return;
            }
            dispatcher.post_invoke(cont, result);
        });
        RequestOutcome::Started
    }

    /// Runs on the coordination thread when a worker's result is drained.
    fn complete<B>(
        shared: &LoaderShared<D>,
        slot: SlotId,
        key: D::Key,
        token: &CancelToken,
        transition: BindTransition,
        result: Option<Arc<Bitmap>>,
        bind: B,
    ) where
        B: FnOnce(Arc<Bitmap>, BindTransition),
    {
        if token.is_cancelled() {
            return;
        }
        let bound = {
            let mut slots = shared.slots.borrow_mut();
            let Some(state) = slots.get_mut(&slot) else {
                return;
            };
            if state.pending.as_ref().map_or(false, |p| p.key == key) {
                state.pending = None;
            }
            let Some(bitmap) = result else {
                // Decode/fetch failure: the slot keeps its placeholder and
                // nothing is retried until the next request.
                log::warn!("no image produced for slot {slot:?}");
                return;
            };
            shared.cache.put(key.clone(), Arc::clone(&bitmap));
            if state.expected.as_ref() == Some(&key) {
                Some(bitmap)
            } else {
                log::debug!("discarding stale result for slot {slot:?}");
                None
            }
        };
        if let Some(bitmap) = bound {
            bind(bitmap, transition);
        }
    }

    fn cancel_task(&self, pending: &PendingTask<D::Key>) {
        pending.token.cancel();
        // A worker parked on the gate must re-check its token.
        self.gate.wake_all();
        self.runtime.cancel_cont(pending.cont);
    }

    /// Cancels any pending work for `slot` and forgets its expected key.
    ///
    /// Called when the slot's view is scrapped or discarded.
    pub fn forget(&self, slot: SlotId) {
        let removed = self.shared.slots.borrow_mut().remove(&slot);
        if let Some(state) = removed {
            if let Some(pending) = state.pending {
                self.cancel_task(&pending);
            }
        }
    }

    /// Cancels all pending work and clears every slot association.
    /// Cache contents are unaffected.
    pub fn forget_all(&self) {
        let drained: Vec<SlotState<D::Key>> = {
            let mut slots = self.shared.slots.borrow_mut();
            slots.drain().map(|(_, state)| state).collect()
        };
        for state in drained {
            if let Some(pending) = state.pending {
                self.cancel_task(&pending);
            }
        }
    }

    /// Pauses or resumes decode work; propagates to every active task.
    ///
    /// Set while the user is flinging to keep workers from flooding the
    /// pipeline with soon-stale decodes.
    pub fn set_paused(&self, paused: bool) {
        self.gate.set_paused(paused);
    }

    /// Number of slots with an outstanding task; test hook.
    pub fn pending_count(&self) -> usize {
        self.shared
            .slots
            .borrow()
            .values()
            .filter(|state| state.pending.is_some())
            .count()
    }

    pub fn cache(&self) -> &Arc<BitmapCache<D::Key>> {
        &self.shared.cache
    }
}

/// Worker-side resolution: cache re-check, pause gate, then decode.
///
/// The cache check deliberately runs before the pause wait, matching the
/// task's cache-first contract, and counts as a recency access. A task that
/// missed here decodes even if another slot fills the key meanwhile; its
/// `put` then just refreshes the entry.
fn resolve<D: ImageDecoder + ?Sized>(
    decoder: &D,
    cache: &BitmapCache<D::Key>,
    gate: &WorkGate,
    token: &CancelToken,
    key: &D::Key,
    target: TargetSize,
) -> Option<Arc<Bitmap>> {
    if let Some(hit) = cache.get(key) {
        return Some(hit);
    }

    gate.wait_while_paused(token);
    if token.is_cancelled() {
        return None;
    }

    let bitmap = match decoder.source_kind(key) {
        SourceKind::Sampled => {
            let bounds = decoder.probe(key)?;
            let sample = sample_size(bounds, target);
            if token.is_cancelled() {
                return None;
            }
            decoder.decode(key, sample)
        }
        SourceKind::Thumbnail => decoder.thumbnail(key),
    };
    bitmap.map(Arc::new)
}
