//! Byte-level link plumbing for ForgeLink's preshared-key TLS channels.
//!
//! ForgeLink distributes build artifacts between machines over links
//! authenticated with a preshared symmetric key. The TLS engine that
//! secures those links is an external collaborator; this crate owns
//! everything between that engine and the socket: write coalescing,
//! opportunistic read-ahead, a vectored write-all primitive that survives
//! partial writes, the mapping from OS error conditions onto the engine's
//! small error vocabulary, and the one-time session bootstrap that wires
//! it all together.
//!
//! The design is strictly synchronous and blocking, one connection per
//! conduit. Timeouts belong to the stream's own configuration; end-of-
//! stream reaches the engine as a zero-length receive.

pub mod bootstrap;
pub mod buffer;
pub mod engine;
pub mod entropy;
pub mod error;
pub mod link;
pub mod writev;

pub use bootstrap::{establish, SecureSession};
pub use buffer::{ReadAhead, StagedWrites, READ_AHEAD_CAPACITY, STAGE_CAPACITY};
pub use engine::{
    ChannelEngine, PresharedKey, Role, SuiteProfile, LINK_PSK_IDENTITY, LINK_SUITE,
};
pub use entropy::{fill_entropy, GeneratorSession};
pub use error::{EntropyError, TransportError};
pub use link::{LinkConduit, RecordTransport, TimeoutHint};
pub use writev::write_all_vectored;
