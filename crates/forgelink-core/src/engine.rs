//! Configuration surface of the external TLS engine.
//!
//! ForgeLink authenticates build-runner links with a preshared symmetric
//! key instead of certificates, so the only configuration the engine needs
//! from this core is a role, a suite profile, the key material, a seeded
//! generator, and a transport to call back into.

use crate::entropy::GeneratorSession;
use crate::link::RecordTransport;
use std::fmt;
use zeroize::Zeroize;

/// Which side of the link this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// Cipher-suite tuning profile handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteProfile {
    /// Broad-compatibility suite list; interoperates with stock TLS
    /// tooling pointed at a ForgeLink endpoint.
    Compat,
    /// Modern suites only.
    Strict,
}

/// Profile every link uses. Compiled in, not a runtime flag.
pub const LINK_SUITE: SuiteProfile = SuiteProfile::Compat;

/// PSK identity every link presents. Compiled in, not a runtime flag.
pub const LINK_PSK_IDENTITY: &str = "forgelink";

/// Preshared symmetric key plus the identity hint sent with it.
///
/// The secret is wiped when the key is dropped and never appears in debug
/// output.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct PresharedKey {
    secret: Vec<u8>,
    identity: String,
}

impl PresharedKey {
    pub fn new(secret: impl Into<Vec<u8>>, identity: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            identity: identity.into(),
        }
    }

    /// A key carrying the compiled-in link identity.
    pub fn for_link(secret: impl Into<Vec<u8>>) -> Self {
        Self::new(secret, LINK_PSK_IDENTITY)
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl fmt::Debug for PresharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresharedKey")
            .field("identity", &self.identity)
            .field("secret_len", &self.secret.len())
            .finish()
    }
}

/// What bootstrap needs from the external TLS engine.
///
/// The engine owns the handshake state machine, record layer, and
/// cryptography; this core only feeds it configuration and a transport.
pub trait ChannelEngine {
    /// The engine's own error type; its textual description ends up in the
    /// fatal bootstrap diagnostic.
    type Error: fmt::Display;

    /// Apply role-specific defaults and the fixed suite profile.
    fn apply_role_defaults(&mut self, role: Role, profile: SuiteProfile)
        -> Result<(), Self::Error>;

    /// Bind the preshared key and its identity to the engine's key
    /// exchange. Keys shorter than the engine's internal block size are the
    /// engine's to pad.
    fn bind_preshared_key(&mut self, key: &PresharedKey) -> Result<(), Self::Error>;

    /// Hand the engine its session randomness source.
    fn attach_generator(&mut self, generator: GeneratorSession) -> Result<(), Self::Error>;

    /// Wire the engine's record I/O to the given transport.
    fn attach_transport(
        &mut self,
        transport: Box<dyn RecordTransport + Send>,
    ) -> Result<(), Self::Error>;
}
