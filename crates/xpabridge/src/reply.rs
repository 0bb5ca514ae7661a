use std::cell::OnceCell;
use std::fmt;

use bytes::Bytes;
use tracing::debug;
use xpabridge_client::{classify_status, StatusKind};
use xpabridge_value::{text_from_bytes, ArrayValue, Value, ValueError};

use crate::error::{BridgeError, Result};
use crate::interrupt::InterruptFlag;
use crate::staging::Staging;

/// The replies collected by one get/set call.
///
/// Owns every per-reply buffer transferred out of the staging area and is
/// immutable after construction. The derived counts are computed on first
/// read and cached; the reply count is fixed, so each is computed at most
/// once.
#[derive(Debug)]
pub struct ReplySet {
    lens: Vec<usize>,
    payloads: Vec<Option<Bytes>>,
    servers: Vec<Option<String>>,
    statuses: Vec<Option<String>>,
    buffers: OnceCell<usize>,
    messages: OnceCell<usize>,
    errors: OnceCell<usize>,
}

impl ReplySet {
    /// Move every live staging slot into a new result.
    ///
    /// Honors a pending abort before touching anything. Each slot field is
    /// taken, never cloned, and the staging count is reset, so every
    /// buffer ends up with exactly one owner.
    pub fn from_staging(staging: &mut Staging, interrupt: &InterruptFlag) -> Result<Self> {
        interrupt.check()?;
        let live = staging.live();
        let mut set = Self::with_capacity(live);
        for slot in &mut staging.slots_mut()[..live] {
            set.lens.push(slot.len);
            set.payloads.push(slot.payload.take());
            set.servers.push(slot.server.take());
            set.statuses.push(slot.status.take());
            slot.len = 0;
        }
        staging.reset();
        debug!(replies = live, "built reply set");
        Ok(set)
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            lens: Vec::with_capacity(n),
            payloads: Vec::with_capacity(n),
            servers: Vec::with_capacity(n),
            statuses: Vec::with_capacity(n),
            buffers: OnceCell::new(),
            messages: OnceCell::new(),
            errors: OnceCell::new(),
        }
    }

    /// Total reply count.
    pub fn replies(&self) -> usize {
        self.lens.len()
    }

    /// Replies carrying a binary payload. Computed once.
    pub fn buffers(&self) -> usize {
        *self
            .buffers
            .get_or_init(|| self.payloads.iter().filter(|p| p.is_some()).count())
    }

    /// Replies whose status is an informational message. Computed once.
    pub fn messages(&self) -> usize {
        *self
            .messages
            .get_or_init(|| self.count_kind(StatusKind::Message))
    }

    /// Replies whose status is an error. Computed once.
    pub fn errors(&self) -> usize {
        *self.errors.get_or_init(|| self.count_kind(StatusKind::Error))
    }

    fn count_kind(&self, kind: StatusKind) -> usize {
        self.statuses
            .iter()
            .filter(|status| classify_status(status.as_deref()) == kind)
            .count()
    }

    /// Resolve a 1-based index; non-positive values count from the end.
    fn resolve(&self, index: i64) -> Result<usize> {
        let count = self.replies();
        let adjusted = if index <= 0 {
            index + count as i64
        } else {
            index
        };
        if adjusted < 1 || adjusted > count as i64 {
            return Err(BridgeError::Index { index, count });
        }
        Ok((adjusted - 1) as usize)
    }

    /// Status string of reply `index`.
    pub fn status(&self, index: i64) -> Result<Option<&str>> {
        Ok(self.statuses[self.resolve(index)?].as_deref())
    }

    /// Server identifier of reply `index`.
    pub fn server(&self, index: i64) -> Result<Option<&str>> {
        Ok(self.servers[self.resolve(index)?].as_deref())
    }

    /// Payload of reply `index`.
    pub fn payload(&self, index: i64) -> Result<Option<&Bytes>> {
        Ok(self.payloads[self.resolve(index)?].as_ref())
    }

    /// Payload byte length of reply `index`.
    pub fn payload_len(&self, index: i64) -> Result<usize> {
        Ok(self.lens[self.resolve(index)?])
    }

    /// Payload of reply `index` as text of exactly its byte length.
    ///
    /// Interior NULs are preserved; no terminator scan happens.
    pub fn payload_text(&self, index: i64) -> Result<Option<String>> {
        let i = self.resolve(index)?;
        let text = text_from_bytes(self.payloads[i].as_deref(), self.lens[i] as i64)?;
        Ok(text)
    }

    /// Status classification of reply `index`.
    pub fn classify(&self, index: i64) -> Result<StatusKind> {
        Ok(classify_status(self.statuses[self.resolve(index)?].as_deref()))
    }

    /// Copy the payload of reply `index` into `target`, byte for byte.
    ///
    /// The target's byte size must equal the payload length exactly. Only
    /// sizes are compared; the element types need not match.
    pub fn scatter(&self, index: i64, target: &mut ArrayValue) -> Result<()> {
        let i = self.resolve(index)?;
        let expected = self.lens[i];
        let actual = target.byte_len()?;
        if actual != expected {
            return Err(BridgeError::SizeMismatch { expected, actual });
        }
        let src = self.payloads[i].as_deref().unwrap_or(&[]);
        target.data_mut().copy_from_slice(src);
        Ok(())
    }

    /// Generic host-facing query.
    ///
    /// No arguments (or a single absent one) yields the reply count. One
    /// integer argument selects a reply and yields its status string. A
    /// second argument picks a sub-field: absent for the payload byte
    /// length, 0 for the classification code, 1 for the status, 2 for the
    /// server name, 3 for the payload bytes, 4 for the payload as text. A
    /// numeric array as the second argument scatters the payload into it
    /// in place.
    pub fn eval(&self, args: &mut [Value]) -> Result<Value> {
        if args.len() > 2 {
            return Err(BridgeError::Argument("expecting 1 or 2 arguments".into()));
        }
        let Some((first, rest)) = args.split_first_mut() else {
            return Ok(Value::Int(self.replies() as i64));
        };
        if first.is_nil() && rest.is_empty() {
            return Ok(Value::Int(self.replies() as i64));
        }
        let index = first
            .as_int()
            .ok_or_else(|| BridgeError::Argument("expecting an index".into()))?;
        let Some(key) = rest.first_mut() else {
            return self.status_value(index);
        };
        match key {
            Value::Nil => Ok(Value::Int(self.payload_len(index)? as i64)),
            Value::Int(0) => Ok(Value::Int(self.classify(index)?.code())),
            Value::Int(1) => self.status_value(index),
            Value::Int(2) => Ok(match self.server(index)? {
                Some(name) => Value::Str(name.to_string()),
                None => Value::Nil,
            }),
            Value::Int(3) => Ok(match self.payload(index)? {
                Some(bytes) if !bytes.is_empty() => Value::Bytes(bytes.clone()),
                _ => Value::Nil,
            }),
            Value::Int(4) => Ok(match self.payload_text(index)? {
                Some(text) => Value::Str(text),
                None => Value::Nil,
            }),
            Value::Array(target) if target.code().is_numeric() => {
                self.scatter(index, target)?;
                Ok(Value::Nil)
            }
            Value::Array(target) => Err(ValueError::Unsupported(target.code()).into()),
            _ => Err(BridgeError::Argument("invalid key value".into())),
        }
    }

    /// By-name derived count: `replies`, `buffers`, `messages`, `errors`.
    pub fn get_field(&self, name: &str) -> Result<i64> {
        match name {
            "replies" => Ok(self.replies() as i64),
            "buffers" => Ok(self.buffers() as i64),
            "messages" => Ok(self.messages() as i64),
            "errors" => Ok(self.errors() as i64),
            _ => Err(BridgeError::Attribute(name.to_string())),
        }
    }

    fn status_value(&self, index: i64) -> Result<Value> {
        Ok(match self.status(index)? {
            Some(text) => Value::Str(text.to_string()),
            None => Value::Nil,
        })
    }
}

impl fmt::Display for ReplySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            plural(self.replies(), "reply", "replies"),
            plural(self.buffers(), "buffer", "buffers"),
            plural(self.messages(), "message", "messages"),
            plural(self.errors(), "error", "errors"),
        )
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}
