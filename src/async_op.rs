//! The async operation frame backing every `Begin*`/`End*` pair on the
//! resolver: a single-completion future dispatched to a worker thread,
//! with single-shot `end()` enforcement.
//!
//! No teacher analogue exists for this — `bramp-rustdns` is purely
//! synchronous. Modeled on the `parking_lot::{Mutex, Condvar}` wait/notify
//! pattern used by DNS-adjacent crates in the example pack (e.g.
//! `RoeeJ-heimdall`, `ktheindifferent-AtlasDNS`) for blocking completion
//! signaling without pulling in an async runtime.

use crate::errors::Error;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;

enum Slot<T> {
    Pending,
    Ready(Result<T, Error>),
    Taken,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    condvar: Condvar,
}

/// A handle to a single asynchronous operation. Corresponds to the
/// `IAsyncResult` returned by a `Begin*` call; [`AsyncOp::end`] is the
/// matching `End*`.
pub struct AsyncOp<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> AsyncOp<T> {
    /// Schedules `f` on a worker thread. If the thread fails to spawn
    /// (exhausted OS resources), `f` runs synchronously on the calling
    /// thread instead, so `begin()` itself blocks in that case but
    /// `end()` still sees a real result rather than a fabricated error.
    pub fn begin<F>(f: F) -> AsyncOp<T>
    where
        F: FnOnce() -> Result<T, Error> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::Pending),
            condvar: Condvar::new(),
        });

        // `f` is parked behind a shared slot rather than moved straight
        // into the spawn closure so it can be recovered and run inline
        // if the thread never gets created.
        let pending = Arc::new(Mutex::new(Some(f)));

        let worker_shared = shared.clone();
        let worker_pending = pending.clone();
        let spawned = thread::Builder::new()
            .name("dnsstub-async-op".into())
            .spawn(move || {
                let f = worker_pending
                    .lock()
                    .take()
                    .expect("spawned closure runs at most once");
                complete(worker_shared, f);
            });

        if let Err(e) = spawned {
            log::debug!("failed to schedule async operation, running inline: {}", e);
            let f = pending
                .lock()
                .take()
                .expect("spawn failed before the worker closure could run");
            complete(shared.clone(), f);
        }

        AsyncOp { shared }
    }

    /// Blocks until the operation completes, then returns its result.
    /// Calling this a second time returns `Error::Usage` instead of
    /// blocking again or returning a stale result.
    pub fn end(&self) -> Result<T, Error> {
        let mut slot = self.shared.slot.lock();
        loop {
            match &*slot {
                Slot::Pending => self.shared.condvar.wait(&mut slot),
                Slot::Ready(_) => break,
                Slot::Taken => {
                    return Err(Error::Usage("end() was already called on this operation"))
                }
            }
        }

        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Ready(result) => result,
            _ => unreachable!("checked above"),
        }
    }

    /// True once the worker has finished, without blocking.
    pub fn is_completed(&self) -> bool {
        !matches!(&*self.shared.slot.lock(), Slot::Pending)
    }
}

fn complete<T, F>(shared: Arc<Shared<T>>, f: F)
where
    F: FnOnce() -> Result<T, Error>,
{
    let result = f();
    let mut slot = shared.slot.lock();
    *slot = Slot::Ready(result);
    shared.condvar.notify_all();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_and_returns_value() {
        let op = AsyncOp::begin(|| Ok(42));
        assert_eq!(op.end().unwrap(), 42);
    }

    #[test]
    fn end_called_twice_errors() {
        let op = AsyncOp::begin(|| Ok(1));
        assert!(op.end().is_ok());
        assert!(op.end().is_err());
    }

    #[test]
    fn propagates_worker_error() {
        let op: AsyncOp<i32> = AsyncOp::begin(|| Err(Error::NoEndPointsReplied));
        assert!(op.end().is_err());
    }
}
