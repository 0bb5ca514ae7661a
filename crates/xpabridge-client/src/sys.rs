//! Bindings against the system XPA client library.
//!
//! Reply buffers returned by the library are mallocated on its side; each
//! one is copied into owned Rust memory and freed before the call returns,
//! so no library-owned pointer outlives the call that produced it.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::ptr;

use bytes::Bytes;
use tracing::debug;
use xpabridge_value::{c_bytes_from_text, text_from_bytes, LEN_UNKNOWN};

use crate::slot::ReplySlot;
use crate::traits::{Connector, XpaClient};

extern "C" {
    fn XPAOpen(mode: *const c_char) -> *mut c_void;
    fn XPAClose(xpa: *mut c_void);
    fn XPAGet(
        xpa: *mut c_void,
        template: *const c_char,
        paramlist: *const c_char,
        mode: *const c_char,
        bufs: *mut *mut c_char,
        lens: *mut usize,
        names: *mut *mut c_char,
        messages: *mut *mut c_char,
        n: c_int,
    ) -> c_int;
    fn XPASet(
        xpa: *mut c_void,
        template: *const c_char,
        paramlist: *const c_char,
        mode: *const c_char,
        buf: *const c_char,
        len: usize,
        names: *mut *mut c_char,
        messages: *mut *mut c_char,
        n: c_int,
    ) -> c_int;
}

/// Connects through the system libxpa.
#[derive(Debug, Clone, Default)]
pub struct LibXpaConnector {
    mode: Option<String>,
}

impl LibXpaConnector {
    /// Connector with the library's default open mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector with an explicit XPA mode string for `XPAOpen`.
    pub fn with_mode(mode: impl Into<String>) -> Self {
        Self {
            mode: Some(mode.into()),
        }
    }
}

impl Connector for LibXpaConnector {
    fn open(&self) -> Option<Box<dyn XpaClient>> {
        let mode = self.mode.as_deref().map(c_bytes_from_text);
        let mode_ptr = mode
            .as_ref()
            .map_or(ptr::null(), |m| m.as_ptr().cast::<c_char>());

        // SAFETY: `mode_ptr` is null or a NUL-terminated buffer that
        // outlives the call.
        let handle = unsafe { XPAOpen(mode_ptr) };
        if handle.is_null() {
            return None;
        }
        debug!("opened libxpa client handle");
        Some(Box::new(LibXpaClient { handle }))
    }
}

/// A live libxpa handle.
pub struct LibXpaClient {
    handle: *mut c_void,
}

impl XpaClient for LibXpaClient {
    fn get(
        &mut self,
        access_point: &str,
        command: Option<&str>,
        mode: Option<&str>,
        slots: &mut [ReplySlot],
    ) -> i32 {
        if self.handle.is_null() {
            return 0;
        }
        let n = slots.len();
        let template = c_bytes_from_text(access_point);
        let paramlist = command.map(c_bytes_from_text);
        let mode = mode.map(c_bytes_from_text);

        let mut bufs: Vec<*mut c_char> = vec![ptr::null_mut(); n];
        let mut lens: Vec<usize> = vec![0; n];
        let mut names: Vec<*mut c_char> = vec![ptr::null_mut(); n];
        let mut messages: Vec<*mut c_char> = vec![ptr::null_mut(); n];

        // SAFETY: every out array holds `n` writable elements and every
        // string argument is null or a NUL-terminated buffer live for the
        // duration of the call.
        let replies = unsafe {
            XPAGet(
                self.handle,
                template.as_ptr().cast(),
                opt_ptr(paramlist.as_deref()),
                opt_ptr(mode.as_deref()),
                bufs.as_mut_ptr(),
                lens.as_mut_ptr(),
                names.as_mut_ptr(),
                messages.as_mut_ptr(),
                n as c_int,
            )
        };
        debug!(access_point, replies, "libxpa get returned");

        let filled = replies.clamp(0, n as i32) as usize;
        for i in 0..filled {
            // SAFETY: the library reports `replies` populated entries; each
            // non-null pointer is a mallocated buffer this side now owns.
            unsafe {
                slots[i].len = lens[i];
                slots[i].payload = take_buffer(bufs[i], lens[i]);
                slots[i].server = take_string(names[i]);
                slots[i].status = take_string(messages[i]);
            }
        }
        replies
    }

    fn set(
        &mut self,
        access_point: &str,
        command: Option<&str>,
        mode: Option<&str>,
        payload: &[u8],
        slots: &mut [ReplySlot],
    ) -> i32 {
        if self.handle.is_null() {
            return 0;
        }
        let n = slots.len();
        let template = c_bytes_from_text(access_point);
        let paramlist = command.map(c_bytes_from_text);
        let mode = mode.map(c_bytes_from_text);

        let mut names: Vec<*mut c_char> = vec![ptr::null_mut(); n];
        let mut messages: Vec<*mut c_char> = vec![ptr::null_mut(); n];

        // SAFETY: out arrays hold `n` writable elements, the payload
        // pointer covers `payload.len()` readable bytes, and every string
        // argument is null or NUL-terminated and live for the call.
        let replies = unsafe {
            XPASet(
                self.handle,
                template.as_ptr().cast(),
                opt_ptr(paramlist.as_deref()),
                opt_ptr(mode.as_deref()),
                payload.as_ptr().cast(),
                payload.len(),
                names.as_mut_ptr(),
                messages.as_mut_ptr(),
                n as c_int,
            )
        };
        debug!(access_point, replies, "libxpa set returned");

        let filled = replies.clamp(0, n as i32) as usize;
        for i in 0..filled {
            // SAFETY: as in `get`, each non-null name/message pointer is a
            // mallocated buffer this side now owns.
            unsafe {
                slots[i].len = 0;
                slots[i].payload = None;
                slots[i].server = take_string(names[i]);
                slots[i].status = take_string(messages[i]);
            }
        }
        replies
    }

    fn close(&mut self) {
        if !self.handle.is_null() {
            // SAFETY: the handle came from XPAOpen and is closed only once;
            // the null store makes a second close a no-op.
            unsafe { XPAClose(self.handle) };
            self.handle = ptr::null_mut();
            debug!("closed libxpa client handle");
        }
    }
}

impl Drop for LibXpaClient {
    fn drop(&mut self) {
        self.close();
    }
}

fn opt_ptr(bytes: Option<&[u8]>) -> *const c_char {
    bytes.map_or(ptr::null(), |b| b.as_ptr().cast())
}

/// Copy a library-owned buffer into owned bytes and free the original.
///
/// # Safety
/// `ptr` must be null or a mallocated buffer of at least `len` readable
/// bytes that nothing else frees.
unsafe fn take_buffer(ptr: *mut c_char, len: usize) -> Option<Bytes> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: guaranteed by the caller.
    let copied = unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) }.to_vec();
    // SAFETY: the buffer was mallocated by the library and is freed once.
    unsafe { libc::free(ptr.cast::<c_void>()) };
    Some(Bytes::from(copied))
}

/// Copy a library-owned C string into an owned string and free the original.
///
/// # Safety
/// `ptr` must be null or a mallocated NUL-terminated string that nothing
/// else frees.
unsafe fn take_string(ptr: *mut c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: guaranteed by the caller.
    let bytes = unsafe { CStr::from_ptr(ptr) }.to_bytes();
    let text = text_from_bytes(Some(bytes), LEN_UNKNOWN).expect("length sentinel is valid");
    // SAFETY: the string was mallocated by the library and is freed once.
    unsafe { libc::free(ptr.cast::<c_void>()) };
    text
}
