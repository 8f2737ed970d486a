//! Toast sinks

use std::sync::Mutex;

use tracing::{info, warn};

use crate::domain::Toast;
use crate::ports::ToastSink;

/// Keeps every toast so callers can inspect or print them later
#[derive(Default)]
pub struct RecordingToaster {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingToaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything shown so far
    pub fn take(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .map(|mut t| std::mem::take(&mut *t))
            .unwrap_or_default()
    }

    pub fn titles(&self) -> Vec<String> {
        self.toasts
            .lock()
            .map(|t| t.iter().map(|toast| toast.title.clone()).collect())
            .unwrap_or_default()
    }
}

impl ToastSink for RecordingToaster {
    fn show(&self, toast: Toast) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}

/// Writes toasts to the tracing log
#[derive(Default)]
pub struct TracingToaster;

impl ToastSink for TracingToaster {
    fn show(&self, toast: Toast) {
        if toast.is_error() {
            warn!(title = %toast.title, "{}", toast.description);
        } else {
            info!(title = %toast.title, "{}", toast.description);
        }
    }
}
