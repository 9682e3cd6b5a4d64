use thiserror::Error;

/// Connection-level failures surfaced to the TLS engine.
///
/// These replace the negative return codes of the original callback
/// contract. None of them terminate the process; the engine is responsible
/// for converting them into a per-connection failure visible to its own
/// caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The operation was interrupted and can be reissued safely.
    #[error("read interrupted; retry requested")]
    WantRead,
    /// The stream's own timeout expired before the operation completed.
    #[error("link operation timed out")]
    Timeout,
    /// The peer closed or reset the connection.
    #[error("connection reset by peer")]
    ConnectionReset,
    /// An unclassified OS error on the write path.
    #[error("link write failed")]
    SendFailed,
    /// An unclassified OS error on the read path.
    #[error("link read failed")]
    ReceiveFailed,
}

/// The operating system refused to supply secure random bytes.
///
/// Seeding happens once per session; a failure here is fatal to bootstrap
/// because no secure channel can exist without it.
#[derive(Debug, Error)]
#[error("operating system entropy source failed: {0}")]
pub struct EntropyError(#[from] rand::Error);
