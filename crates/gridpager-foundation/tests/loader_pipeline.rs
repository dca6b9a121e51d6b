//! End-to-end loader behavior: pause/resume, cancellation, single-flight,
//! and stale-result rejection across real worker threads.

use gridpager_foundation::{
    Bitmap, BitmapCache, ImageBounds, ImageDecoder, ImageLoader, RequestOutcome, SlotId, UiRuntime,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Decoder whose decodes announce themselves and then wait for a permit,
/// so tests control exactly when each decode finishes.
struct BlockingDecoder {
    decodes: AtomicUsize,
    started_tx: Mutex<mpsc::Sender<u64>>,
    permits: Mutex<mpsc::Receiver<()>>,
}

struct DecoderControl {
    started_rx: mpsc::Receiver<u64>,
    permit_tx: mpsc::Sender<()>,
}

fn blocking_decoder() -> (Arc<BlockingDecoder>, DecoderControl) {
    let (started_tx, started_rx) = mpsc::channel();
    let (permit_tx, permits) = mpsc::channel();
    (
        Arc::new(BlockingDecoder {
            decodes: AtomicUsize::new(0),
            started_tx: Mutex::new(started_tx),
            permits: Mutex::new(permits),
        }),
        DecoderControl {
            started_rx,
            permit_tx,
        },
    )
}

impl ImageDecoder for BlockingDecoder {
    type Key = u64;

    fn probe(&self, _key: &u64) -> Option<ImageBounds> {
        Some(ImageBounds {
            width: 600,
            height: 400,
        })
    }

    fn decode(&self, key: &u64, _sample_size: u32) -> Option<Bitmap> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        self.started_tx.lock().unwrap().send(*key).unwrap();
        self.permits
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5))
            .ok()?;
        // Encode the key in the pixel data so tests can tell results apart.
        Some(Bitmap::solid(2, 1, [*key as u8, 0, 0, 255]))
    }
}

fn new_loader(
    runtime: &UiRuntime,
    decoder: Arc<BlockingDecoder>,
) -> ImageLoader<BlockingDecoder> {
    let _ = env_logger::builder().is_test(true).try_init();
    let cache = Arc::new(BitmapCache::new(1024 * 1024));
    ImageLoader::new(runtime, cache, decoder)
}

fn pump_until<F: Fn() -> bool>(runtime: &UiRuntime, done: F) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        runtime.run_until_idle();
        assert!(Instant::now() < deadline, "pipeline did not settle");
        thread::yield_now();
    }
}

#[test]
fn test_same_key_request_is_single_flight() {
    let runtime = UiRuntime::new();
    let (decoder, control) = blocking_decoder();
    let loader = new_loader(&runtime, Arc::clone(&decoder));

    // Pause so the first task parks before decoding; the dedupe must happen
    // regardless of worker progress.
    loader.set_paused(true);
    let slot = SlotId::new(1);
    assert_eq!(
        loader.request(slot, 7, |_, _| {}),
        RequestOutcome::Started
    );
    let bound = Rc::new(RefCell::new(Vec::new()));
    let bound_in_bind = Rc::clone(&bound);
    assert_eq!(
        loader.request(slot, 7, move |bitmap, _| {
            bound_in_bind.borrow_mut().push(bitmap.pixels()[0]);
        }),
        RequestOutcome::InFlight
    );
    assert_eq!(loader.pending_count(), 1);

    loader.set_paused(false);
    control
        .started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("decode should start after unpause");
    control.permit_tx.send(()).unwrap();

    pump_until(&runtime, || loader.pending_count() == 0);
    assert_eq!(decoder.decodes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_new_key_cancels_prior_task_and_rejects_its_result() {
    let runtime = UiRuntime::new();
    let (decoder, control) = blocking_decoder();
    let loader = new_loader(&runtime, Arc::clone(&decoder));

    let slot = SlotId::new(1);
    let bound = Rc::new(RefCell::new(Vec::new()));

    let bound_a = Rc::clone(&bound);
    loader.request(slot, 1, move |bitmap, _| {
        bound_a.borrow_mut().push(bitmap.pixels()[0]);
    });
    // Let task A get into its decode before superseding it.
    assert_eq!(
        control.started_rx.recv_timeout(Duration::from_secs(5)),
        Ok(1)
    );

    let bound_b = Rc::clone(&bound);
    assert_eq!(
        loader.request(slot, 2, move |bitmap, _| {
            bound_b.borrow_mut().push(bitmap.pixels()[0]);
        }),
        RequestOutcome::Started
    );

    // Release both decodes in whatever order they are waiting.
    control.permit_tx.send(()).unwrap();
    control.permit_tx.send(()).unwrap();
    assert_eq!(
        control.started_rx.recv_timeout(Duration::from_secs(5)),
        Ok(2)
    );

    pump_until(&runtime, || !bound.borrow().is_empty());
    runtime.run_until_idle();
    // Only the second key's image ever reached the slot.
    assert_eq!(*bound.borrow(), vec![2]);
    assert_eq!(loader.pending_count(), 0);
}

#[test]
fn test_paused_task_does_not_decode_until_resumed() {
    let runtime = UiRuntime::new();
    let (decoder, control) = blocking_decoder();
    let loader = new_loader(&runtime, Arc::clone(&decoder));

    loader.set_paused(true);
    let bound = Rc::new(RefCell::new(Vec::new()));
    let bound_in_bind = Rc::clone(&bound);
    loader.request(SlotId::new(1), 5, move |bitmap, _| {
        bound_in_bind.borrow_mut().push(bitmap.pixels()[0]);
    });

    assert!(
        control
            .started_rx
            .recv_timeout(Duration::from_millis(200))
            .is_err(),
        "decode ran while paused"
    );
    assert_eq!(decoder.decodes.load(Ordering::SeqCst), 0);

    loader.set_paused(false);
    control
        .started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("decode should start after unpause");
    control.permit_tx.send(()).unwrap();
    pump_until(&runtime, || !bound.borrow().is_empty());
    assert_eq!(*bound.borrow(), vec![5]);
}

#[test]
fn test_cancelling_paused_task_returns_without_decoding() {
    let runtime = UiRuntime::new();
    let (decoder, control) = blocking_decoder();
    let loader = new_loader(&runtime, Arc::clone(&decoder));

    loader.set_paused(true);
    let slot = SlotId::new(1);
    loader.request(slot, 5, |_, _| panic!("cancelled task must not bind"));
    loader.forget(slot);

    // Even after resuming, the cancelled worker must not decode.
    loader.set_paused(false);
    assert!(
        control
            .started_rx
            .recv_timeout(Duration::from_millis(200))
            .is_err()
    );
    assert_eq!(decoder.decodes.load(Ordering::SeqCst), 0);
    runtime.run_until_idle();
}

#[test]
fn test_forget_all_drops_every_pending_bind() {
    let runtime = UiRuntime::new();
    let (decoder, _control) = blocking_decoder();
    let loader = new_loader(&runtime, Arc::clone(&decoder));

    loader.set_paused(true);
    for raw in 0..4 {
        loader.request(SlotId::new(raw), raw, |_, _| {
            panic!("invalidated slot must not bind")
        });
    }
    assert_eq!(loader.pending_count(), 4);

    loader.forget_all();
    assert_eq!(loader.pending_count(), 0);
    loader.set_paused(false);
    runtime.run_until_idle();
}

#[test]
fn test_worker_decodes_even_if_key_arrives_while_paused() {
    // Pins the resolution order: the worker's cache check happens before the
    // pause wait and is not repeated afterwards.
    let runtime = UiRuntime::new();
    let (decoder, control) = blocking_decoder();
    let loader = new_loader(&runtime, Arc::clone(&decoder));

    loader.set_paused(true);
    let slot = SlotId::new(1);
    let bound = Rc::new(RefCell::new(Vec::new()));
    let bound_in_bind = Rc::clone(&bound);
    loader.request(slot, 5, move |bitmap, _| {
        bound_in_bind.borrow_mut().push(bitmap.pixels()[0]);
    });
    // Wait for the worker to park on the gate (its cache check has run by
    // the time the decode hasn't started and the task is still pending).
    assert!(
        control
            .started_rx
            .recv_timeout(Duration::from_millis(200))
            .is_err()
    );

    // Another slot finishes the same key meanwhile.
    loader
        .cache()
        .put(5, Arc::new(Bitmap::solid(2, 1, [99, 0, 0, 255])));

    loader.set_paused(false);
    control
        .started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("parked worker still decodes after resume");
    control.permit_tx.send(()).unwrap();
    pump_until(&runtime, || !bound.borrow().is_empty());

    // The freshly decoded bitmap replaced the cached one.
    assert_eq!(*bound.borrow(), vec![5]);
    assert_eq!(loader.cache().get(&5).unwrap().pixels()[0], 5);
}
