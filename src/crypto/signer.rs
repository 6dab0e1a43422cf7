//! The signer capability and its two realizations.
//!
//! A [`Signer`] produces detached signatures and exposes the matching public
//! key. Nodes never see private key material; the Builder hands them the
//! signable bytes and attaches whatever comes back.
//!
//! Two realizations are provided:
//!
//! - [`MemorySigner`]: holds an Ed25519 key directly in memory.
//! - [`ExecSigner`]: shells out to an external key-management tool, for keys
//!   that must never enter this process.
//!
//! Both produce the same on-the-wire format (raw 64-byte detached Ed25519
//! signatures over raw 32-byte public keys), so nodes signed by either are
//! mutually verifiable.

use crate::error::{ForestError, Result};
use ed25519_dalek::{Signer as DalekSigner, SigningKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Expected length of a raw Ed25519 public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Expected length of a raw detached Ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Capability to produce detached signatures and expose a public key.
pub trait Signer {
    /// Signs `data`, returning the raw detached signature bytes.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Returns the raw public key bytes matching this signer's key.
    fn public_key(&self) -> Result<Vec<u8>>;
}

/// A signer holding Ed25519 key material directly in memory.
#[derive(Clone)]
pub struct MemorySigner {
    key: SigningKey,
}

impl MemorySigner {
    /// Generates a fresh random key.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Creates a signer from raw secret key bytes.
    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SECRET_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            ForestError::signer(format!(
                "secret key must be {} bytes, got {}",
                SECRET_KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self {
            key: SigningKey::from_bytes(&arr),
        })
    }
}

impl Signer for MemorySigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(data).to_bytes().to_vec())
    }

    fn public_key(&self) -> Result<Vec<u8>> {
        Ok(self.key.verifying_key().to_bytes().to_vec())
    }
}

impl std::fmt::Debug for MemorySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySigner").finish_non_exhaustive()
    }
}

/// A signer that shells out to an external key-management tool.
///
/// The tool is invoked as a subprocess with a single subcommand argument:
///
/// - `<tool> sign`: reads the payload on stdin, writes the raw 64-byte
///   detached signature to stdout.
/// - `<tool> public-key`: writes the raw 32-byte public key to stdout.
///
/// Extra arguments (key selection, config paths) can be supplied with
/// [`ExecSigner::with_args`] and are passed before the subcommand. Calls are
/// synchronous and unbounded; a caller that wants timeout behavior must
/// impose it externally.
#[derive(Debug, Clone)]
pub struct ExecSigner {
    program: PathBuf,
    args: Vec<String>,
}

impl ExecSigner {
    /// Creates a signer wrapping the given executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds fixed arguments passed before the subcommand on every invocation.
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn run(&self, subcommand: &str, input: Option<&[u8]>) -> Result<Vec<u8>> {
        debug!(
            program = %self.program.display(),
            subcommand,
            "invoking external signing tool"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(subcommand)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ForestError::signer(format!(
                    "failed to launch {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if let Some(data) = input {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| ForestError::signer("signing tool stdin unavailable"))?;
            stdin
                .write_all(data)
                .map_err(|e| ForestError::signer(format!("failed to write payload: {}", e)))?;
            // Dropping stdin closes the pipe so the tool sees EOF.
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ForestError::signer(format!("signing tool failed: {}", e)))?;

        if !output.status.success() {
            return Err(ForestError::signer(format!(
                "{} {} exited with {}: {}",
                self.program.display(),
                subcommand,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl Signer for ExecSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let sig = self.run("sign", Some(data))?;
        if sig.len() != SIGNATURE_LENGTH {
            return Err(ForestError::signer(format!(
                "signing tool produced {} bytes, expected a {}-byte signature",
                sig.len(),
                SIGNATURE_LENGTH
            )));
        }
        Ok(sig)
    }

    fn public_key(&self) -> Result<Vec<u8>> {
        let key = self.run("public-key", None)?;
        if key.len() != PUBLIC_KEY_LENGTH {
            return Err(ForestError::signer(format!(
                "signing tool produced {} bytes, expected a {}-byte public key",
                key.len(),
                PUBLIC_KEY_LENGTH
            )));
        }
        Ok(key)
    }
}
