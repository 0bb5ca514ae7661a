use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{BridgeError, Result};

/// Cooperative abort flag shared between the host and the bridge.
///
/// The host raises it when an asynchronous abort is delivered. Every
/// staging mutation point checks the flag first and honors a pending abort
/// before touching shared state.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    pending: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an abort as pending.
    pub fn raise(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    /// Clear a pending abort.
    pub fn clear(&self) {
        self.pending.store(false, Ordering::SeqCst);
    }

    /// True while an abort is pending.
    pub fn pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Fail with `Interrupted` when an abort is pending.
    pub fn check(&self) -> Result<()> {
        if self.pending() {
            Err(BridgeError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Route SIGINT to this flag, for hosts that deliver aborts as signals.
    #[cfg(feature = "signals")]
    pub fn install_ctrlc(&self) -> std::result::Result<(), ctrlc::Error> {
        let pending = Arc::clone(&self.pending);
        ctrlc::set_handler(move || pending.store(true, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear() {
        let flag = InterruptFlag::new();
        assert!(!flag.pending());
        assert!(flag.check().is_ok());
    }

    #[test]
    fn raise_and_clear() {
        let flag = InterruptFlag::new();
        flag.raise();
        assert!(flag.pending());
        assert!(matches!(flag.check(), Err(BridgeError::Interrupted)));
        flag.clear();
        assert!(flag.check().is_ok());
    }

    #[test]
    fn clones_share_state() {
        let flag = InterruptFlag::new();
        let host_side = flag.clone();
        host_side.raise();
        assert!(flag.pending());
    }
}
