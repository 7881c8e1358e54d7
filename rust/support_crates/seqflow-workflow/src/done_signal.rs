//! One-shot cancellation flag shared between the tasks of a pipeline run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

type Hook = Box<dyn FnOnce() + Send>;

/// A cloneable "done" flag that transitions exactly once from unfired to fired.
///
/// Any number of tasks may call [`fire`](Self::fire) concurrently; exactly one of
/// them observes `true`. Hooks registered through [`on_fire`](Self::on_fire) run
/// once, on the thread that won the race, which is how a run closes its queues
/// and wakes blocked producers when it is cancelled.
#[derive(Clone, Default)]
pub struct DoneSignal(Arc<Inner>);

#[derive(Default)]
struct Inner {
    fired: AtomicBool,
    hooks: Mutex<Hooks>,
    waiters: Condvar,
}

#[derive(Default)]
struct Hooks {
    next_id: u64,
    pending: Vec<(u64, Hook)>,
}

impl DoneSignal {
    pub fn new() -> DoneSignal {
        DoneSignal::default()
    }

    /// Fires the signal. Returns `true` for the call that performed the
    /// transition and `false` for every later call.
    pub fn fire(&self) -> bool {
        if self
            .0
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let hooks = std::mem::take(&mut self.0.hooks.lock().unwrap().pending);
        self.0.waiters.notify_all();
        for (_, hook) in hooks {
            hook();
        }
        true
    }

    #[inline]
    pub fn is_fired(&self) -> bool {
        self.0.fired.load(Ordering::Acquire)
    }

    /// Registers a hook to run when the signal fires.
    ///
    /// If the signal has already fired, the hook runs immediately on the
    /// calling thread.
    pub fn on_fire(&self, hook: impl FnOnce() + Send + 'static) {
        self.register(Box::new(hook));
    }

    /// Like [`on_fire`](Self::on_fire), but the hook is deregistered when the
    /// returned guard is dropped before the signal fires.
    pub fn on_fire_scoped(&self, hook: impl FnOnce() + Send + 'static) -> HookGuard {
        HookGuard {
            signal: self.clone(),
            id: self.register(Box::new(hook)),
        }
    }

    fn register(&self, hook: Hook) -> Option<u64> {
        {
            let mut hooks = self.0.hooks.lock().unwrap();
            if !self.is_fired() {
                let id = hooks.next_id;
                hooks.next_id += 1;
                hooks.pending.push((id, hook));
                return Some(id);
            }
        }
        hook();
        None
    }

    /// Number of hooks waiting for the signal to fire.
    pub fn pending_hooks(&self) -> usize {
        self.0.hooks.lock().unwrap().pending.len()
    }

    /// Blocks until the signal fires.
    pub fn wait(&self) {
        let mut hooks = self.0.hooks.lock().unwrap();
        while !self.is_fired() {
            hooks = self.0.waiters.wait(hooks).unwrap();
        }
    }

    /// Blocks until the signal fires or `timeout` elapses. Returns whether the
    /// signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let hooks = self.0.hooks.lock().unwrap();
        let (_hooks, _) = self
            .0
            .waiters
            .wait_timeout_while(hooks, timeout, |_| !self.is_fired())
            .unwrap();
        self.is_fired()
    }
}

/// Deregisters a hook added by [`DoneSignal::on_fire_scoped`] when dropped.
#[must_use = "dropping the guard deregisters the hook"]
pub struct HookGuard {
    signal: DoneSignal,
    id: Option<u64>,
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            let mut hooks = self.signal.0.hooks.lock().unwrap();
            hooks.pending.retain(|(hook_id, _)| *hook_id != id);
        }
    }
}

impl std::fmt::Debug for HookGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookGuard").field("id", &self.id).finish()
    }
}

impl std::fmt::Debug for DoneSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoneSignal")
            .field("fired", &self.is_fired())
            .finish()
    }
}
