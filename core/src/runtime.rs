//! Process-wide runtime state.
//!
//! Operators may only be created after [`init`] has run. The flag is set
//! once and stays set for the lifetime of the process.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{OpError, OpResult};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Mark the process-wide runtime initialized.
///
/// Idempotent: repeated calls are no-ops. Returns an error only if platform
/// preparation fails; the pure-Rust build has no fallible preparation step.
pub fn init() -> OpResult<()> {
    INITIALIZED.store(true, Ordering::Release);
    Ok(())
}

/// True once [`init`] has run.
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

pub(crate) fn ensure_initialized(op: &'static str) -> OpResult<()> {
    if is_initialized() {
        Ok(())
    } else {
        Err(OpError::Uninitialized { op })
    }
}
