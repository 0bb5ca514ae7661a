use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};
use xpabridge_client::{Connector, XpaClient};

use crate::error::{BridgeError, Result};

type SharedHandle = Arc<Mutex<Option<Box<dyn XpaClient>>>>;

/// Registers a hook with the host's process-exit mechanism.
///
/// The bridge registers its teardown hook at most once, on the first
/// successful open. A `false` return means registration failed, which the
/// bridge treats as unrecoverable.
pub trait ExitRegistrar {
    fn register(&mut self, hook: Box<dyn FnOnce()>) -> bool;
}

/// Process-lifetime persistent connection to the messaging subsystem.
///
/// The handle is shared with the teardown hook registered on first open.
/// Teardown takes the handle out of the shared slot before closing it, so
/// the slot never holds a half-closed handle even when teardown re-enters.
pub struct Connection {
    handle: SharedHandle,
    hook_registered: bool,
}

impl Connection {
    pub fn new() -> Self {
        Self {
            handle: Arc::new(Mutex::new(None)),
            hook_registered: false,
        }
    }

    /// True while a handle is open.
    pub fn is_open(&self) -> bool {
        lock(&self.handle).is_some()
    }

    /// Open the handle on first use and register teardown exactly once.
    ///
    /// A connector failure is fatal. A registration failure is fatal too,
    /// but leaves the freshly opened handle in place; later calls see the
    /// open handle and do not retry registration.
    pub fn ensure_open(
        &mut self,
        connector: &dyn Connector,
        exit: &mut dyn ExitRegistrar,
    ) -> Result<()> {
        let mut guard = lock(&self.handle);
        if guard.is_some() {
            return Ok(());
        }
        let client = connector.open().ok_or_else(|| {
            BridgeError::Connection("failed to open persistent connection".into())
        })?;
        *guard = Some(client);
        info!("opened persistent messaging connection");
        drop(guard);

        if !self.hook_registered {
            let handle = Arc::clone(&self.handle);
            if !exit.register(Box::new(move || close_shared(&handle))) {
                return Err(BridgeError::Connection(
                    "failed to register exit teardown".into(),
                ));
            }
            self.hook_registered = true;
        }
        Ok(())
    }

    /// Run `f` against the open handle.
    pub fn with_client<T>(&self, f: impl FnOnce(&mut dyn XpaClient) -> T) -> Result<T> {
        let mut guard = lock(&self.handle);
        let client = guard
            .as_mut()
            .ok_or_else(|| BridgeError::Connection("connection is not open".into()))?;
        Ok(f(client.as_mut()))
    }

    /// Close the handle. No-op when already closed.
    pub fn disconnect(&self) {
        close_shared(&self.handle);
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

fn close_shared(handle: &SharedHandle) {
    // Take first, close after: a second closer sees an empty slot.
    let taken = lock(handle).take();
    if let Some(mut client) = taken {
        client.close();
        debug!("closed persistent messaging connection");
    }
}

fn lock(handle: &SharedHandle) -> MutexGuard<'_, Option<Box<dyn XpaClient>>> {
    // Nothing runs concurrently in the host model; a poisoned lock only
    // records a prior panic and the inner state is still usable.
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}
