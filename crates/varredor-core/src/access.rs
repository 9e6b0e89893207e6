//! Shared-secret access gate.
//!
//! A single passkey, configured at startup, guards every command. There are
//! no accounts and no sessions beyond the lifetime of the process.

use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct AccessGate {
    passkey: String,
}

impl AccessGate {
    /// Surrounding whitespace in the configured passkey is dropped, the same
    /// as for operator input.
    #[must_use]
    pub fn new(passkey: impl Into<String>) -> Self {
        let passkey: String = passkey.into();
        Self {
            passkey: passkey.trim().to_owned(),
        }
    }

    /// Compare operator input to the configured passkey in constant time.
    ///
    /// Surrounding whitespace (a trailing newline from a prompt) is ignored.
    #[must_use]
    pub fn verify(&self, input: &str) -> bool {
        let input = input.trim();
        if self.passkey.is_empty() || input.is_empty() {
            return false;
        }
        bool::from(self.passkey.as_bytes().ct_eq(input.as_bytes()))
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("passkey", &"[redacted]")
            .finish()
    }
}
