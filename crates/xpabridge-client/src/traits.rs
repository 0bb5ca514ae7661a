use crate::slot::ReplySlot;

/// A live client handle to the XPA messaging subsystem.
///
/// `get` and `set` write up to `slots.len()` replies into the caller's
/// slots and return the reply count exactly as the library reports it;
/// a negative count passes through and the staging layer clamps it.
/// Per-server failures surface through the status convention in each
/// slot, not through a result type.
pub trait XpaClient {
    /// Retrieve data from every server matching `access_point`.
    fn get(
        &mut self,
        access_point: &str,
        command: Option<&str>,
        mode: Option<&str>,
        slots: &mut [ReplySlot],
    ) -> i32;

    /// Send a payload to every server matching `access_point`.
    fn set(
        &mut self,
        access_point: &str,
        command: Option<&str>,
        mode: Option<&str>,
        payload: &[u8],
        slots: &mut [ReplySlot],
    ) -> i32;

    /// Release the underlying handle. Closing twice is a no-op.
    fn close(&mut self);
}

/// Opens client handles to the messaging subsystem.
pub trait Connector {
    /// Open a new handle, or `None` when the subsystem is unavailable.
    fn open(&self) -> Option<Box<dyn XpaClient>>;
}
