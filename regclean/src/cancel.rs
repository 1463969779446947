//! Cooperative cancellation shared between the caller and the scan workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ScanAborted;

/// A cloneable flag raised by [`AbortSignal::request`].
///
/// Validators poll it through [`AbortSignal::check`] before each enumeration,
/// so even a deep recursive walk stops within one step.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    requested: Arc<AtomicBool>,
}

impl AbortSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running session to stop. Idempotent.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// `Err(ScanAborted)` once an abort has been requested.
    ///
    /// # Errors
    ///
    /// Returns [`ScanAborted`] after [`AbortSignal::request`] was called on any clone.
    pub fn check(&self) -> Result<(), ScanAborted> {
        if self.is_requested() {
            Err(ScanAborted)
        } else {
            Ok(())
        }
    }
}
