//! One-time session wiring.
//!
//! Bootstrap is the only place this core touches process-wide state, and
//! the only place a failure is allowed to kill the process: a link that
//! cannot seed randomness or bind its key is misconfigured, not unlucky,
//! and nothing downstream can run without it.

use crate::engine::{ChannelEngine, PresharedKey, Role, LINK_SUITE};
use crate::entropy::GeneratorSession;
use crate::link::LinkConduit;
use std::fmt;
use std::io::{Read, Write};
use std::process;
use std::sync::Once;

static SIGPIPE_DISPOSITION: Once = Once::new();

/// Stop the OS from raising a signal when the peer closes its end; broken
/// pipes must surface as error returns from the write path, never as
/// asynchronous signal delivery.
fn ignore_sigpipe() {
    SIGPIPE_DISPOSITION.call_once(|| {
        #[cfg(unix)]
        // SAFETY: SIG_IGN is a valid disposition for SIGPIPE and this runs
        // exactly once, before any link I/O.
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_IGN);
        }
    });
}

fn die(stage: &str, err: &dyn fmt::Display) -> ! {
    eprintln!("error: {stage}: {err}");
    process::exit(1);
}

/// A fully wired secure link session: the engine, configured and holding
/// the transport.
#[derive(Debug)]
pub struct SecureSession<E> {
    engine: E,
}

impl<E> SecureSession<E> {
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}

/// Wire a stream, a role, and a preshared key into the engine.
///
/// Runs the whole bootstrap sequence: ignore `SIGPIPE`, seed a
/// [`GeneratorSession`], apply role defaults with the compiled-in suite
/// profile, bind the key, attach the generator, and hand the engine a
/// [`LinkConduit`] over `stream` as its transport. End-of-stream reaches
/// the engine only as a zero-length receive; there is no separate
/// close-notify path.
///
/// Any failure is fatal: a diagnostic naming the failing stage and the
/// engine's own error text is printed and the process exits. There is no
/// retry or partial-bootstrap state.
pub fn establish<E, S>(mut engine: E, stream: S, role: Role, key: PresharedKey) -> SecureSession<E>
where
    E: ChannelEngine,
    S: Read + Write + Send + 'static,
{
    ignore_sigpipe();
    let generator = match GeneratorSession::seeded() {
        Ok(generator) => generator,
        Err(err) => die("seed session generator", &err),
    };
    if let Err(err) = engine.apply_role_defaults(role, LINK_SUITE) {
        die("apply engine defaults", &err);
    }
    if let Err(err) = engine.bind_preshared_key(&key) {
        die("bind preshared key", &err);
    }
    if let Err(err) = engine.attach_generator(generator) {
        die("attach session generator", &err);
    }
    if let Err(err) = engine.attach_transport(Box::new(LinkConduit::new(stream))) {
        die("attach link transport", &err);
    }
    SecureSession { engine }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{SuiteProfile, LINK_PSK_IDENTITY};
    use crate::link::{RecordTransport, TimeoutHint};
    use rand::RngCore;
    use std::convert::Infallible;
    use std::io::Cursor;

    /// Engine double recording the bootstrap sequence.
    #[derive(Default)]
    struct RecordingEngine {
        steps: Vec<&'static str>,
        role: Option<Role>,
        profile: Option<SuiteProfile>,
        identity: Option<String>,
        key_len: Option<usize>,
        generator: Option<GeneratorSession>,
        transport: Option<Box<dyn RecordTransport + Send>>,
    }

    impl ChannelEngine for RecordingEngine {
        type Error = Infallible;

        fn apply_role_defaults(
            &mut self,
            role: Role,
            profile: SuiteProfile,
        ) -> Result<(), Self::Error> {
            self.steps.push("defaults");
            self.role = Some(role);
            self.profile = Some(profile);
            Ok(())
        }

        fn bind_preshared_key(&mut self, key: &PresharedKey) -> Result<(), Self::Error> {
            self.steps.push("psk");
            self.identity = Some(key.identity().to_string());
            self.key_len = Some(key.secret().len());
            Ok(())
        }

        fn attach_generator(&mut self, generator: GeneratorSession) -> Result<(), Self::Error> {
            self.steps.push("generator");
            self.generator = Some(generator);
            Ok(())
        }

        fn attach_transport(
            &mut self,
            transport: Box<dyn RecordTransport + Send>,
        ) -> Result<(), Self::Error> {
            self.steps.push("transport");
            self.transport = Some(transport);
            Ok(())
        }
    }

    #[test]
    fn wires_the_engine_in_bootstrap_order() {
        let stream = Cursor::new(b"payload".to_vec());
        let key = PresharedKey::for_link([7u8; 32]);
        let mut session = establish(RecordingEngine::default(), stream, Role::Server, key);

        let engine = session.engine_mut();
        assert_eq!(engine.steps, ["defaults", "psk", "generator", "transport"]);
        assert_eq!(engine.role, Some(Role::Server));
        assert_eq!(engine.profile, Some(SuiteProfile::Compat));
        assert_eq!(engine.identity.as_deref(), Some(LINK_PSK_IDENTITY));
        assert_eq!(engine.key_len, Some(32));

        let generator = engine.generator.as_mut().expect("generator attached");
        assert_ne!(generator.next_u64(), generator.next_u64());

        let transport = engine.transport.as_mut().expect("transport attached");
        let mut buf = [0u8; 7];
        assert_eq!(transport.recv(&mut buf, TimeoutHint::NONE).expect("recv"), 7);
        assert_eq!(&buf, b"payload");
    }

    #[test]
    fn accepts_keys_shorter_than_a_cipher_block() {
        // Padding a short key up to the block size is the engine's job;
        // bootstrap binds whatever it is given.
        let stream = Cursor::new(Vec::new());
        let key = PresharedKey::for_link(b"tiny".to_vec());
        let session = establish(RecordingEngine::default(), stream, Role::Client, key);
        assert_eq!(session.engine().key_len, Some(4));
        assert_eq!(session.engine().role, Some(Role::Client));
    }

    #[test]
    fn repeated_bootstrap_reuses_the_signal_disposition() {
        // The Once guard makes a second establish safe in the same
        // process; each call still gets its own generator and transport.
        let first = establish(
            RecordingEngine::default(),
            Cursor::new(Vec::new()),
            Role::Client,
            PresharedKey::for_link([1u8; 32]),
        );
        let second = establish(
            RecordingEngine::default(),
            Cursor::new(Vec::new()),
            Role::Server,
            PresharedKey::for_link([2u8; 32]),
        );
        assert!(first.engine().transport.is_some());
        assert!(second.engine().transport.is_some());
    }
}
