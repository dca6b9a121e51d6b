//! Coordination-thread runtime primitives for gridpager.
//!
//! Everything that mutates pages, slots, or pools runs on one coordination
//! thread (the "UI thread" of the host toolkit). Background workers never
//! touch that state directly: they register a continuation on the
//! [`UiRuntime`] before starting, do their work, and post the result back
//! through a [`Dispatcher`]. The continuation then runs on the coordination
//! thread the next time it drains its queue.
//!
//! The other two primitives here are [`CancelToken`], a cooperative
//! cancellation flag, and [`WorkGate`], the shared pause flag workers block
//! on during fast scrolling.

mod cancel;
mod dispatcher;
mod gate;

pub use cancel::CancelToken;
pub use dispatcher::{ContId, Dispatcher, UiRuntime};
pub use gate::WorkGate;
