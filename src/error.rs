//! Error type shared by every window-system backend.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindowError {
    /// The window behind a handle was closed or the handle went stale.
    #[error("{op}: window is no longer available")]
    Unavailable { op: &'static str },
    #[error("{op} failed (os error {code})")]
    Os { op: &'static str, code: u32 },
    #[error("highlight overlay setup failed: {0}")]
    Overlay(String),
    #[error("terminal backend error: {0}")]
    Io(#[from] io::Error),
}

impl WindowError {
    /// Transient errors only affect a single window for a single tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, WindowError::Unavailable { .. } | WindowError::Os { .. })
    }
}
