//! `Action`: the unit of work carried by an [`super::ActionQueue`].
//!
//! An action packages an arbitrary call plus its bound arguments for later,
//! host-thread execution. It is fire-and-forget: no retry, no result
//! propagation back to the submitting thread.

use std::fmt;

/// A labeled, queueable unit of deferred work.
///
/// The label identifies the item in logs and fault reports; it should name
/// what the action does (`"blank-screen"`, `"load-session-config"`), not
/// where it came from.
pub struct Action {
    label: &'static str,
    run: Box<dyn FnOnce() + Send + 'static>,
}

impl Action {
    /// Package a closure under a label.
    pub fn new(label: &'static str, f: impl FnOnce() + Send + 'static) -> Self {
        Self {
            label,
            run: Box::new(f),
        }
    }

    /// Package a closure with the default label.
    pub fn from_fn(f: impl FnOnce() + Send + 'static) -> Self {
        Self::new("action", f)
    }

    /// Package a call plus one bound argument.
    ///
    /// The argument is moved now, on the producer thread, and handed to the
    /// call later on the host thread. This is the shape used for one-shot
    /// administrative work such as loading a session configuration.
    pub fn with_arg<A: Send + 'static>(
        label: &'static str,
        f: impl FnOnce(A) + Send + 'static,
        arg: A,
    ) -> Self {
        Self::new(label, move || f(arg))
    }

    /// The label this action was created with.
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Execute the packaged call, consuming the action.
    pub(crate) fn invoke(self) {
        (self.run)();
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("label", &self.label).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_action_invoke_runs_closure() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);
        let action = Action::new("mark", move || ran_clone.store(true, Ordering::SeqCst));
        assert_eq!(action.label(), "mark");
        action.invoke();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_action_with_arg_binds_value() {
        let seen = Arc::new(std::sync::Mutex::new(String::new()));
        let seen_clone = Arc::clone(&seen);
        let action = Action::with_arg(
            "load-config",
            move |name: String| *seen_clone.lock().unwrap() = name,
            "session_a.json".to_owned(),
        );
        action.invoke();
        assert_eq!(*seen.lock().unwrap(), "session_a.json");
    }

    #[test]
    fn test_action_default_label() {
        let action = Action::from_fn(|| {});
        assert_eq!(action.label(), "action");
    }
}
