use xpabridge_client::ReplySlot;

use crate::error::Result;
use crate::interrupt::InterruptFlag;

/// Bounded reply staging shared across sequential get/set calls.
///
/// The messaging call writes into the slots up to the bound; the bridge
/// drains them before every call and transfers ownership out when the
/// result object is built. The live count is signed because it arrives
/// straight from the library and may be negative on failure.
#[derive(Debug)]
pub struct Staging {
    slots: Vec<ReplySlot>,
    count: i32,
}

impl Staging {
    /// Staging area with capacity for `max_replies` replies.
    pub fn new(max_replies: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(max_replies, ReplySlot::default);
        Self { slots, count: 0 }
    }

    /// Reply bound.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live reply count clamped to [0, capacity].
    pub fn live(&self) -> usize {
        self.count.clamp(0, self.slots.len() as i32) as usize
    }

    /// The slots a messaging call writes into.
    pub fn slots_mut(&mut self) -> &mut [ReplySlot] {
        &mut self.slots
    }

    /// Record the reply count a messaging call returned.
    pub fn set_count(&mut self, count: i32) {
        self.count = count;
    }

    /// Reset the live count after ownership of the slots moved out.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Drain every live slot, newest first.
    ///
    /// Honors a pending abort before touching anything. The count walks
    /// down one slot at a time so it always reflects the slots still
    /// populated, and a second drain is a no-op. A negative count drains
    /// as zero.
    pub fn drain(&mut self, interrupt: &InterruptFlag) -> Result<()> {
        interrupt.check()?;
        while self.count > 0 {
            let i = (self.count - 1) as usize;
            if let Some(slot) = self.slots.get_mut(i) {
                slot.clear();
            }
            self.count -= 1;
        }
        if self.count < 0 {
            self.count = 0;
        }
        Ok(())
    }
}
