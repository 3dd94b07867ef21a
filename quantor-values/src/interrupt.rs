//! Cooperative interruption of long enumerations.
//!
//! An evaluation holds an [`Interrupter`] and polls it at its yield points; the
//! controlling front end (a debugger, a checker with a watchdog) holds the paired
//! [`InterruptHandle`] and flips the level. Polling is a single atomic load.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterruptLevel {
    Continue,
    Pause,
    Terminate,
}

impl InterruptLevel {
    fn to_raw(self) -> u8 {
        match self {
            InterruptLevel::Continue => 0,
            InterruptLevel::Pause => 1,
            InterruptLevel::Terminate => 2,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => InterruptLevel::Pause,
            2 => InterruptLevel::Terminate,
            _ => InterruptLevel::Continue,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum InterruptCommand {
    Pause,
    Continue,
    /// Abort the running enumeration at its next poll.
    Terminate,
    /// Clear a previous terminate so the controller can be reused.
    Reset,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum InterruptEvent {
    Paused { reason: String },
    Resumed,
    Terminated { reason: String },
}

pub type InterruptEmitFn = Arc<dyn Fn(InterruptEvent) + Send + Sync + 'static>;

/// Evaluation side of the controller.
#[derive(Clone)]
pub struct Interrupter {
    inner: Arc<InterruptInner>,
}

/// Controller side: sends commands to every paired [`Interrupter`].
#[derive(Clone)]
pub struct InterruptHandle {
    inner: Arc<InterruptInner>,
}

impl fmt::Debug for Interrupter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interrupter({:?})", self.poll())
    }
}

impl fmt::Debug for InterruptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InterruptHandle(..)")
    }
}

impl Default for Interrupter {
    fn default() -> Self {
        Self::detached()
    }
}

impl Interrupter {
    pub fn new() -> (Self, InterruptHandle) {
        Self::build(None)
    }

    /// Like [`Interrupter::new`], reporting pause/terminate transitions to `emit`.
    pub fn with_events(emit: InterruptEmitFn) -> (Self, InterruptHandle) {
        Self::build(Some(emit))
    }

    /// An interrupter nobody controls; it always polls `Continue`.
    pub fn detached() -> Self {
        Self::build(None).0
    }

    fn build(emit: Option<InterruptEmitFn>) -> (Self, InterruptHandle) {
        let inner = Arc::new(InterruptInner {
            level: AtomicU8::new(InterruptLevel::Continue.to_raw()),
            lock: Mutex::new(()),
            cv: Condvar::new(),
            emit,
        });
        (
            Self {
                inner: Arc::clone(&inner),
            },
            InterruptHandle { inner },
        )
    }

    /// Non-blocking read of the current level.
    pub fn poll(&self) -> InterruptLevel {
        self.inner.level()
    }

    /// Blocks while the level is `Pause`, then returns the level that ended the
    /// wait (`Continue` or `Terminate`).
    pub fn wait_while_paused(&self, reason: &str) -> InterruptLevel {
        let mut guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.inner.level() == InterruptLevel::Pause {
            log::debug!("paused: {reason}");
            self.inner.emit(InterruptEvent::Paused {
                reason: reason.to_string(),
            });
        }
        while self.inner.level() == InterruptLevel::Pause {
            guard = self.inner.cv.wait(guard).unwrap_or_else(PoisonError::into_inner);
        }
        drop(guard);
        self.inner.level()
    }

    /// Polls once and resolves a pause in place. Returns `true` when the caller
    /// must abandon its work.
    pub fn should_terminate(&self, reason: &str) -> bool {
        match self.poll() {
            InterruptLevel::Continue => false,
            InterruptLevel::Pause => self.wait_while_paused(reason) == InterruptLevel::Terminate,
            InterruptLevel::Terminate => true,
        }
    }

    /// Check for a terminate request without ever blocking.
    pub fn terminate_requested(&self) -> bool {
        self.poll() == InterruptLevel::Terminate
    }
}

impl InterruptHandle {
    pub fn send(&self, cmd: InterruptCommand) {
        match cmd {
            InterruptCommand::Pause => self.inner.set(InterruptLevel::Pause),
            InterruptCommand::Continue => {
                if self.inner.level() == InterruptLevel::Pause {
                    self.inner.set(InterruptLevel::Continue);
                    self.inner.emit(InterruptEvent::Resumed);
                }
            }
            InterruptCommand::Terminate => {
                self.inner.set(InterruptLevel::Terminate);
                self.inner.emit(InterruptEvent::Terminated {
                    reason: "terminate requested".to_string(),
                });
            }
            InterruptCommand::Reset => self.inner.set(InterruptLevel::Continue),
        }
    }

    pub fn pause(&self) {
        self.send(InterruptCommand::Pause)
    }

    pub fn resume(&self) {
        self.send(InterruptCommand::Continue)
    }

    pub fn terminate(&self) {
        self.send(InterruptCommand::Terminate)
    }

    pub fn level(&self) -> InterruptLevel {
        self.inner.level()
    }
}

struct InterruptInner {
    level: AtomicU8,
    lock: Mutex<()>,
    cv: Condvar,
    emit: Option<InterruptEmitFn>,
}

impl InterruptInner {
    fn level(&self) -> InterruptLevel {
        InterruptLevel::from_raw(self.level.load(Ordering::Acquire))
    }

    fn set(&self, level: InterruptLevel) {
        // Store under the lock so a waiter cannot miss the wakeup.
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.level.store(level.to_raw(), Ordering::Release);
        drop(guard);
        self.cv.notify_all();
    }

    fn emit(&self, ev: InterruptEvent) {
        if let Some(emit) = &self.emit {
            emit(ev)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn detached_interrupter_always_continues() {
        let i = Interrupter::detached();
        assert_eq!(i.poll(), InterruptLevel::Continue);
        assert!(!i.should_terminate("test"));
    }

    #[test]
    fn terminate_wakes_a_paused_waiter() {
        let (interrupter, handle) = Interrupter::new();
        handle.pause();
        let waiter = thread::spawn(move || interrupter.wait_while_paused("test"));
        thread::sleep(Duration::from_millis(20));
        handle.terminate();
        let level = waiter.join().expect("waiter thread panicked");
        assert_eq!(level, InterruptLevel::Terminate);
    }

    #[test]
    fn resume_returns_continue_and_emits_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let (interrupter, handle) = Interrupter::with_events(Arc::new(move |ev| {
            sink.lock().expect("events poisoned").push(ev)
        }));
        handle.pause();
        let waiter = thread::spawn(move || interrupter.should_terminate("test"));
        thread::sleep(Duration::from_millis(20));
        handle.resume();
        assert!(!waiter.join().expect("waiter thread panicked"));
        let events = seen.lock().expect("events poisoned");
        assert!(matches!(events.last(), Some(InterruptEvent::Resumed)));
    }

    #[test]
    fn interrupt_command_serde_roundtrip_terminate() {
        let json = r#"{"cmd":"terminate"}"#;
        let cmd: InterruptCommand = serde_json::from_str(json).expect("parse InterruptCommand");
        match cmd {
            InterruptCommand::Terminate => {}
            other => panic!("expected Terminate, got {other:?}"),
        }
    }
}
