use tracing::debug;
use xpabridge_client::Connector;
use xpabridge_value::Value;

use crate::conn::{Connection, ExitRegistrar};
use crate::error::{BridgeError, Result};
use crate::interrupt::InterruptFlag;
use crate::reply::ReplySet;
use crate::staging::Staging;

/// Default bound on collected replies per call.
pub const DEFAULT_MAX_REPLIES: usize = 100;

/// Bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Upper bound on collected replies per call. Servers past the bound
    /// are dropped by the library.
    pub max_replies: usize,
    /// XPA mode string passed with every get/set call.
    pub call_mode: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_replies: DEFAULT_MAX_REPLIES,
            call_mode: None,
        }
    }
}

/// The host-facing command surface. Owns the persistent connection, the
/// staging area and the abort flag shared across sequential calls.
pub struct Bridge {
    connector: Box<dyn Connector>,
    exit: Box<dyn ExitRegistrar>,
    conn: Connection,
    staging: Staging,
    interrupt: InterruptFlag,
    config: BridgeConfig,
}

impl Bridge {
    /// Bridge with default configuration.
    pub fn new(connector: Box<dyn Connector>, exit: Box<dyn ExitRegistrar>) -> Self {
        Self::with_config(connector, exit, BridgeConfig::default())
    }

    /// Bridge with explicit configuration.
    pub fn with_config(
        connector: Box<dyn Connector>,
        exit: Box<dyn ExitRegistrar>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            connector,
            exit,
            conn: Connection::new(),
            staging: Staging::new(config.max_replies),
            interrupt: InterruptFlag::new(),
            config,
        }
    }

    /// The abort flag the host raises to interrupt staging mutations.
    pub fn interrupt(&self) -> InterruptFlag {
        self.interrupt.clone()
    }

    /// True while the persistent connection is open.
    pub fn is_connected(&self) -> bool {
        self.conn.is_open()
    }

    /// Close the persistent connection. The next command reopens it.
    pub fn disconnect(&self) {
        self.conn.disconnect();
    }

    /// `get(access_point [, command])`: pull data from every server
    /// matching the access point pattern.
    pub fn get(&mut self, args: &[Value]) -> Result<ReplySet> {
        if args.is_empty() || args.len() > 2 {
            return Err(BridgeError::Argument("expecting 1 or 2 arguments".into()));
        }
        let access_point = access_point_arg(args)?;
        let command = command_arg(args.get(1))?;

        self.conn
            .ensure_open(self.connector.as_ref(), self.exit.as_mut())?;
        self.staging.drain(&self.interrupt)?;
        debug!(access_point, "dispatching get");

        let mode = self.config.call_mode.as_deref();
        let slots = self.staging.slots_mut();
        let count = self
            .conn
            .with_client(|client| client.get(access_point, command, mode, slots))?;
        self.staging.set_count(count);
        ReplySet::from_staging(&mut self.staging, &self.interrupt)
    }

    /// `set(access_point [, command [, data]])`: push a command and an
    /// optional binary payload to every matching server.
    pub fn set(&mut self, args: &[Value]) -> Result<ReplySet> {
        if args.is_empty() || args.len() > 3 {
            return Err(BridgeError::Argument(
                "expecting 1, 2 or 3 arguments".into(),
            ));
        }
        let access_point = access_point_arg(args)?;
        let command = command_arg(args.get(1))?;
        let payload = payload_arg(args.get(2))?;

        self.conn
            .ensure_open(self.connector.as_ref(), self.exit.as_mut())?;
        self.staging.drain(&self.interrupt)?;
        debug!(access_point, len = payload.len(), "dispatching set");

        let mode = self.config.call_mode.as_deref();
        let slots = self.staging.slots_mut();
        let count = self
            .conn
            .with_client(|client| client.set(access_point, command, mode, payload, slots))?;
        self.staging.set_count(count);
        ReplySet::from_staging(&mut self.staging, &self.interrupt)
    }
}

fn access_point_arg(args: &[Value]) -> Result<&str> {
    args[0]
        .as_str()
        .ok_or_else(|| BridgeError::Argument("access point must be a string".into()))
}

fn command_arg(arg: Option<&Value>) -> Result<Option<&str>> {
    match arg {
        None | Some(Value::Nil) => Ok(None),
        Some(Value::Str(command)) => Ok(Some(command)),
        Some(_) => Err(BridgeError::Argument(
            "command must be empty or a string".into(),
        )),
    }
}

fn payload_arg(arg: Option<&Value>) -> Result<&[u8]> {
    match arg {
        None | Some(Value::Nil) => Ok(&[]),
        Some(Value::Array(array)) => {
            // Surfaces the unsupported-type failure before any connection
            // or staging state changes.
            array.byte_len()?;
            Ok(array.data())
        }
        Some(_) => Err(BridgeError::Type("data must be a numeric array".into())),
    }
}
