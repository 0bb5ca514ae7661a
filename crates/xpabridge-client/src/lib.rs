//! Client seam for the XPA messaging subsystem.
//!
//! The bridge consumes the messaging library through the fixed call
//! interface modeled here: open a handle, fan one get/set out to every
//! matching server, collect up to a bounded number of replies. The `sys`
//! feature provides the real libxpa bindings; everything above the seam is
//! written against the traits.

pub mod slot;
pub mod status;
pub mod traits;

#[cfg(all(feature = "sys", unix))]
pub mod sys;

pub use slot::ReplySlot;
pub use status::{classify_status, StatusKind, STATUS_ERROR_PREFIX, STATUS_MESSAGE_PREFIX};
pub use traits::{Connector, XpaClient};

#[cfg(all(feature = "sys", unix))]
pub use sys::{LibXpaClient, LibXpaConnector};
