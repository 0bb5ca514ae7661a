use bytes::Bytes;

/// One server reply as written by the messaging library.
///
/// A get/set call fills at most the configured bound of these; the bridge
/// drains them before the next call and transfers ownership of populated
/// fields into the result object.
#[derive(Debug, Default)]
pub struct ReplySlot {
    /// Payload byte length. Meaningful only alongside `payload`.
    pub len: usize,
    /// Binary payload, when the server returned data.
    pub payload: Option<Bytes>,
    /// Originating server identifier.
    pub server: Option<String>,
    /// Status text, possibly prefix-tagged per the status convention.
    pub status: Option<String>,
}

impl ReplySlot {
    /// True when no field holds data.
    pub fn is_empty(&self) -> bool {
        self.payload.is_none() && self.server.is_none() && self.status.is_none()
    }

    /// Drop all contents and zero the length.
    pub fn clear(&mut self) {
        self.len = 0;
        self.payload = None;
        self.server = None;
        self.status = None;
    }

    /// Populate the slot from one reply.
    pub fn fill(
        &mut self,
        payload: Option<Bytes>,
        server: Option<String>,
        status: Option<String>,
    ) {
        self.len = payload.as_ref().map_or(0, Bytes::len);
        self.payload = payload;
        self.server = server;
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_records_payload_length() {
        let mut slot = ReplySlot::default();
        slot.fill(Some(Bytes::from_static(b"data")), Some("a:b".into()), None);
        assert_eq!(slot.len, 4);
        assert!(!slot.is_empty());
    }

    #[test]
    fn fill_without_payload_has_zero_length() {
        let mut slot = ReplySlot::default();
        slot.fill(None, None, Some("XPA$MESSAGE ok".into()));
        assert_eq!(slot.len, 0);
        assert!(!slot.is_empty());
    }

    #[test]
    fn clear_empties_every_field() {
        let mut slot = ReplySlot::default();
        slot.fill(Some(Bytes::from_static(b"x")), Some("s".into()), Some("m".into()));
        slot.clear();
        assert!(slot.is_empty());
        assert_eq!(slot.len, 0);
    }
}
