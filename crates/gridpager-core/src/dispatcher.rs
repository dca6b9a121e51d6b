//! Continuation registry and cross-thread dispatcher.
//!
//! A worker never holds a reference to coordination-thread state. Before the
//! worker starts, the coordination thread registers a continuation and hands
//! the worker a [`Dispatcher`] plus the continuation's [`ContId`]. When the
//! worker finishes it posts the result; the continuation runs on the
//! coordination thread during the next [`UiRuntime::run_until_idle`] drain.
//!
//! Cancelling a continuation removes it from the registry, so a result that
//! was already posted (or is posted later) is discarded at drain time.

use ahash::AHashMap;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

type Payload = Box<dyn Any + Send>;
type Continuation = Box<dyn FnOnce(Payload)>;

/// Identifier of a registered continuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContId(u64);

struct RuntimeInner {
    conts: AHashMap<u64, Continuation>,
    next_id: u64,
    rx: mpsc::Receiver<(u64, Payload)>,
}

/// Coordination-thread side of the dispatcher.
///
/// Cheaply clonable handle; all clones share one registry and queue. Not
/// `Send`: continuations may capture `Rc`/`RefCell` state, so the runtime
/// must stay on the thread that created it.
#[derive(Clone)]
pub struct UiRuntime {
    inner: Rc<RefCell<RuntimeInner>>,
    tx: mpsc::Sender<(u64, Payload)>,
}

impl Default for UiRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl UiRuntime {
    /// Creates an empty runtime owned by the calling thread.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            inner: Rc::new(RefCell::new(RuntimeInner {
                conts: AHashMap::new(),
                next_id: 0,
                rx,
            })),
            tx,
        }
    }

    /// Returns a `Send` handle workers use to post results back.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            tx: self.tx.clone(),
        }
    }

    /// Registers a one-shot continuation and returns its id.
    ///
    /// The continuation runs on the coordination thread when a matching
    /// invocation is drained. A posted payload of the wrong type is dropped
    /// with a warning rather than panicking.
    pub fn register_cont<T, F>(&self, cont: F) -> ContId
    where
        T: Send + 'static,
        F: FnOnce(T) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.conts.insert(
            id,
            Box::new(move |payload: Payload| match payload.downcast::<T>() {
                Ok(value) => cont(*value),
                Err(_) => log::warn!("continuation {id} posted a payload of the wrong type"),
            }),
        );
        ContId(id)
    }

    /// Drops a registered continuation.
    ///
    /// Any pending or future invocation for `id` is silently discarded at
    /// drain time.
    pub fn cancel_cont(&self, id: ContId) {
        self.inner.borrow_mut().conts.remove(&id.0);
    }

    /// Number of continuations currently registered.
    pub fn registered_count(&self) -> usize {
        self.inner.borrow().conts.len()
    }

    /// Drains every posted invocation, running matching continuations on the
    /// calling thread. Returns how many continuations ran.
    ///
    /// Invocations whose continuation was cancelled are dropped. The queue
    /// borrow is released before each continuation runs, so continuations may
    /// register new work.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.borrow_mut().rx.try_recv().ok();
            let Some((id, payload)) = next else {
                return ran;
            };
            let cont = self.inner.borrow_mut().conts.remove(&id);
            match cont {
                Some(cont) => {
                    cont(payload);
                    ran += 1;
                }
                None => log::debug!("dropping result for cancelled continuation {id}"),
            }
        }
    }
}

/// `Send + Clone` handle for posting continuation results from workers.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<(u64, Payload)>,
}

impl Dispatcher {
    /// Posts `value` for the continuation registered under `id`.
    ///
    /// Never blocks. Posting after the runtime is gone, or for a cancelled
    /// id, is a no-op.
    pub fn post_invoke<T: Send + 'static>(&self, id: ContId, value: T) {
        if self.tx.send((id.0, Box::new(value))).is_err() {
            log::debug!("runtime dropped before continuation {} was invoked", id.0);
        }
    }
}
