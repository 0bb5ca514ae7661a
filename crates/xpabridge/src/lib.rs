//! XPA messaging bridge for an embedding scripting host.
//!
//! Exposes the XPA request/reply protocol to a host interpreter as two
//! callable primitives: [`Bridge::get`] pulls data or command output from
//! every server matching an access point pattern, [`Bridge::set`] pushes a
//! command with an optional binary payload. Each call fans out to a
//! bounded number of server replies, collected into a [`ReplySet`] the
//! host indexes and inspects.

pub mod cmd;
pub mod conn;
pub mod error;
pub mod interrupt;
pub mod reply;
pub mod staging;

pub use cmd::{Bridge, BridgeConfig, DEFAULT_MAX_REPLIES};
pub use conn::{Connection, ExitRegistrar};
pub use error::{BridgeError, Result};
pub use interrupt::InterruptFlag;
pub use reply::ReplySet;
pub use staging::Staging;

pub use xpabridge_client::{
    classify_status, Connector, ReplySlot, StatusKind, XpaClient, STATUS_ERROR_PREFIX,
    STATUS_MESSAGE_PREFIX,
};
pub use xpabridge_value::{ArrayValue, TypeCode, Value};

#[cfg(all(feature = "sys", unix))]
pub use xpabridge_client::{LibXpaClient, LibXpaConnector};
