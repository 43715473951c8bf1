//! Fault reporting: surfacing handler and listener failures without
//! stopping delivery.
//!
//! A panic inside a queued action or a bus listener is caught at the
//! queue/bus boundary and turned into a [`FaultReport`]. By default reports
//! are logged through `tracing`; an embedding can install a hook per queue
//! or bus to surface them in its own UI instead.

use std::any::Any;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::error;

/// A caught failure from host-side execution of one item or listener.
#[derive(Debug, Clone)]
pub struct FaultReport {
    /// Label of the failing item (action label, or the listener origin).
    pub origin: &'static str,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FaultReport {
    /// Create a report from an explicit message.
    pub fn new(origin: &'static str, message: impl Into<String>) -> Self {
        Self {
            origin,
            message: message.into(),
        }
    }

    /// Create a report from a caught panic payload.
    pub(crate) fn from_panic(origin: &'static str, payload: &(dyn Any + Send)) -> Self {
        let message = payload.downcast_ref::<&str>().map_or_else(
            || {
                payload
                    .downcast_ref::<String>()
                    .cloned()
                    .unwrap_or_else(|| "non-string panic payload".to_owned())
            },
            |s| (*s).to_owned(),
        );
        Self { origin, message }
    }
}

/// Callback type for externally-installed fault handlers.
pub type FaultHook = Arc<dyn Fn(&FaultReport) + Send + Sync>;

/// Shared fault sink owned by each queue and bus.
///
/// Reports go to the installed hook when present, otherwise to the log.
#[derive(Default)]
pub(crate) struct FaultSink {
    hook: RwLock<Option<FaultHook>>,
}

impl FaultSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Install a hook, replacing any previous one.
    pub(crate) fn set_hook(&self, hook: FaultHook) {
        *self
            .hook
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Deliver a report to the hook, or log it.
    pub(crate) fn raise(&self, report: &FaultReport) {
        let hook = self
            .hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            hook(report);
        } else {
            error!(origin = report.origin, message = %report.message, "host-side item faulted");
        }
    }
}
