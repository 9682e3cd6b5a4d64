//! The transport adapter between a duplex byte stream and the TLS engine.
//!
//! The conduit owns the two staging buffers and the stream, and implements
//! the send/receive contract the engine calls back into. Small writes
//! coalesce in the staging buffer; reads drain the read-ahead window before
//! touching the wire, and every wire read doubles as an opportunistic
//! prefetch.

use crate::buffer::{ReadAhead, StagedWrites};
use crate::error::TransportError;
use crate::writev::write_all_vectored;
use std::io::{self, ErrorKind, IoSliceMut, Read, Write};
use std::time::Duration;
use tracing::warn;

/// Receive-timeout hint threaded through the transport contract.
///
/// The conduit does not enforce it; deadline behavior is delegated to the
/// stream's own configuration (e.g. `TcpStream::set_read_timeout`), which
/// surfaces expiry as a would-block condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeoutHint(Option<Duration>);

impl TimeoutHint {
    /// No deadline requested.
    pub const NONE: TimeoutHint = TimeoutHint(None);

    pub fn new(duration: Duration) -> Self {
        Self(Some(duration))
    }

    pub fn duration(&self) -> Option<Duration> {
        self.0
    }
}

/// The byte-transport capability the TLS engine holds.
///
/// `Ok(0)` from [`recv`](Self::recv) means end-of-stream; there is no
/// separate close notification.
pub trait RecordTransport {
    /// Accept `bytes` for transmission, returning how many were taken.
    fn send(&mut self, bytes: &[u8]) -> Result<usize, TransportError>;

    /// Read up to `buf.len()` bytes, blocking per the stream's own timeout
    /// configuration.
    fn recv(&mut self, buf: &mut [u8], hint: TimeoutHint) -> Result<usize, TransportError>;
}

/// Transport adapter over a duplex stream.
///
/// Generic over the stream so tests can substitute scripted doubles and
/// callers can pass borrowing stream types where the connection is owned
/// elsewhere. One conduit per connection; the buffers are never shared.
#[derive(Debug)]
pub struct LinkConduit<S> {
    stream: S,
    staged: StagedWrites,
    ahead: ReadAhead,
}

impl<S: Read + Write> LinkConduit<S> {
    /// A conduit with the default staging and read-ahead capacities.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            staged: StagedWrites::default(),
            ahead: ReadAhead::default(),
        }
    }

    /// A conduit with explicit buffer capacities. A staging capacity of
    /// zero disables write coalescing entirely.
    pub fn with_capacities(stream: S, stage: usize, read_ahead: usize) -> Self {
        Self {
            stream,
            staged: StagedWrites::with_capacity(stage),
            ahead: ReadAhead::with_capacity(read_ahead),
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Bytes accepted by [`send`](Self::send) but not yet on the wire.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Discard the conduit and recover the stream. Staged bytes that were
    /// never flushed are lost.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Accept `bytes` for transmission.
    ///
    /// While the staging buffer has room this is pure buffering: no
    /// syscall, always succeeds. Once `bytes` would overflow it, the staged
    /// prefix and `bytes` go out in a single vectored write; the new bytes
    /// are never copied into staging first.
    pub fn send(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        if self.staged.fits(bytes.len()) {
            self.staged.push(bytes);
            return Ok(bytes.len());
        }
        self.flush_with(bytes)?;
        Ok(bytes.len())
    }

    /// Force any staged bytes onto the wire.
    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.flush_with(&[])
    }

    fn flush_with(&mut self, tail: &[u8]) -> Result<(), TransportError> {
        if self.staged.is_empty() && tail.is_empty() {
            return Ok(());
        }
        let mut segments: [&[u8]; 2] = [self.staged.bytes(), tail];
        match write_all_vectored(&mut self.stream, &mut segments) {
            Ok(_) => {
                self.staged.clear();
                Ok(())
            }
            Err(err) => Err(map_send_error(err)),
        }
    }

    /// Read up to `buf.len()` bytes.
    ///
    /// Staged output is flushed first so neither peer can deadlock waiting
    /// for a request the other never sent. A request satisfiable from the
    /// read-ahead window costs no syscall; otherwise one vectored read
    /// fills the caller's buffer and prefetches whatever else the kernel
    /// already has into the read-ahead window.
    pub fn recv(&mut self, buf: &mut [u8], _hint: TimeoutHint) -> Result<usize, TransportError> {
        self.flush_with(&[])?;
        if !self.ahead.is_empty() {
            return Ok(self.ahead.take(buf));
        }
        let wanted = buf.len();
        let read = {
            let mut slices = [IoSliceMut::new(buf), IoSliceMut::new(self.ahead.vacant_mut())];
            match self.stream.read_vectored(&mut slices) {
                Ok(n) => n,
                Err(err) => return Err(map_recv_error(err)),
            }
        };
        if read > wanted {
            self.ahead.commit(read - wanted);
            Ok(wanted)
        } else {
            Ok(read)
        }
    }
}

impl<S: Read + Write> RecordTransport for LinkConduit<S> {
    fn send(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        LinkConduit::send(self, bytes)
    }

    fn recv(&mut self, buf: &mut [u8], hint: TimeoutHint) -> Result<usize, TransportError> {
        LinkConduit::recv(self, buf, hint)
    }
}

fn is_reset(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    ) || err.raw_os_error() == Some(libc::ENETRESET)
}

fn map_send_error(err: io::Error) -> TransportError {
    match err.kind() {
        // A vectored write may have landed partially; retrying blindly
        // risks double delivery, so interruption counts as a dead link.
        ErrorKind::Interrupted => TransportError::ConnectionReset,
        ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout,
        _ if is_reset(&err) => TransportError::ConnectionReset,
        _ => {
            warn!(error = %err, "link write failed");
            TransportError::SendFailed
        }
    }
}

fn map_recv_error(err: io::Error) -> TransportError {
    match err.kind() {
        // Unlike a write, an interrupted read left nothing in flight and
        // can be reissued safely.
        ErrorKind::Interrupted => TransportError::WantRead,
        ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout,
        _ if is_reset(&err) => TransportError::ConnectionReset,
        _ => {
            warn!(error = %err, "link read failed");
            TransportError::ReceiveFailed
        }
    }
}
