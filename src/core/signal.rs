//! Signal protocol for template units
//!
//! Each template unit carries a set of named signals: `error`,
//! `exec-started`, and `complete`. Listeners fire in registration order.
//! `exec-started` and `complete` latch and fire at most once per unit;
//! `error` fires once per error occurrence, which includes errors
//! forwarded from a failed child inclusion.
//!
//! Listener snapshots are taken under the lock and invoked outside it, so
//! a forwarding listener may dispatch on another unit's signals without
//! re-entering this one.

use std::sync::{Arc, Mutex};

use super::error::TemplateError;
use super::unit::SourceMetadata;

/// Payload delivered with the `exec-started` signal.
///
/// Carries a snapshot of the unit's file metadata so the dispatcher can
/// emit cache-validation headers before the first output byte.
#[derive(Debug, Clone, Default)]
pub struct ExecStarted {
    pub metadata: Option<SourceMetadata>,
}

type ErrorListener = Arc<dyn Fn(&TemplateError) + Send + Sync>;
type StartListener = Arc<dyn Fn(&ExecStarted) + Send + Sync>;
type CompleteListener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct SignalState {
    on_error: Vec<ErrorListener>,
    on_exec_started: Vec<StartListener>,
    on_complete: Vec<CompleteListener>,
    exec_started_fired: bool,
    complete_fired: bool,
}

/// Named at-most-once-per-occurrence notifications for one template unit
#[derive(Default)]
pub struct Signals {
    state: Mutex<SignalState>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an `error` listener.
    pub fn on_error(&self, listener: impl Fn(&TemplateError) + Send + Sync + 'static) {
        self.state.lock().unwrap().on_error.push(Arc::new(listener));
    }

    /// Register an `exec-started` listener.
    pub fn on_exec_started(&self, listener: impl Fn(&ExecStarted) + Send + Sync + 'static) {
        self.state
            .lock()
            .unwrap()
            .on_exec_started
            .push(Arc::new(listener));
    }

    /// Register a `complete` listener.
    pub fn on_complete(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.state
            .lock()
            .unwrap()
            .on_complete
            .push(Arc::new(listener));
    }

    /// Fire the `error` signal for one error occurrence.
    pub fn dispatch_error(&self, err: &TemplateError) {
        let listeners: Vec<ErrorListener> = self.state.lock().unwrap().on_error.clone();
        for listener in listeners {
            listener(err);
        }
    }

    /// Fire the `exec-started` signal. Latches: later calls are no-ops.
    pub fn dispatch_exec_started(&self, info: ExecStarted) {
        let listeners: Vec<StartListener> = {
            let mut state = self.state.lock().unwrap();
            if state.exec_started_fired {
                return;
            }
            state.exec_started_fired = true;
            state.on_exec_started.clone()
        };
        for listener in listeners {
            listener(&info);
        }
    }

    /// Fire the `complete` signal. Latches: later calls are no-ops.
    pub fn dispatch_complete(&self) {
        let listeners: Vec<CompleteListener> = {
            let mut state = self.state.lock().unwrap();
            if state.complete_fired {
                return;
            }
            state.complete_fired = true;
            state.on_complete.clone()
        };
        for listener in listeners {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let signals = Signals::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            signals.on_complete(move || order.lock().unwrap().push(tag));
        }

        signals.dispatch_complete();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_complete_latches() {
        let signals = Signals::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = count.clone();
        signals.on_complete(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        signals.dispatch_complete();
        signals.dispatch_complete();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_fires_per_occurrence() {
        let signals = Signals::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = count.clone();
        signals.on_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = TemplateError::Runtime("first failure".to_string());
        signals.dispatch_error(&err);
        let err = TemplateError::Runtime("second failure".to_string());
        signals.dispatch_error(&err);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_forwarding_listener_reaches_parent() {
        let parent = Arc::new(Signals::new());
        let child = Signals::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        parent.on_error(move |err| log.lock().unwrap().push(err.to_string()));

        let upstream = parent.clone();
        child.on_error(move |err| upstream.dispatch_error(err));

        let err = TemplateError::Runtime("child failed".to_string());
        child.dispatch_error(&err);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Runtime error: child failed".to_string()]
        );
    }
}
