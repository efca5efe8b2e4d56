//! The identity seam.
//!
//! The core only ever asks two things of the identity provider: "is there
//! a signed-in user?" and "prompt sign-in". Identity details — who the
//! user is, tokens, claims — never cross this boundary.

use std::env;

use tracing::info;

/// The external identity provider.
pub trait IdentityProvider: Send + Sync {
    fn is_signed_in(&self) -> bool;

    /// Ask the host to start its sign-in flow. Saving is refused until
    /// [`Self::is_signed_in`] turns true; the provider decides what a
    /// prompt looks like.
    fn prompt_sign_in(&self);
}

/// Identity handled entirely by the host: always signed in. The default
/// when no provider is configured.
pub struct HostManagedIdentity;

impl IdentityProvider for HostManagedIdentity {
    fn is_signed_in(&self) -> bool {
        true
    }

    fn prompt_sign_in(&self) {}
}

/// Signed in iff a named environment variable holds a non-empty token.
/// Used by the CLI when `INVOICEGEN_TOKEN` is part of the environment.
pub struct EnvTokenIdentity {
    var: String,
}

impl EnvTokenIdentity {
    pub const DEFAULT_VAR: &'static str = "INVOICEGEN_TOKEN";

    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenIdentity {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl IdentityProvider for EnvTokenIdentity {
    fn is_signed_in(&self) -> bool {
        env::var(&self.var).map(|v| !v.trim().is_empty()).unwrap_or(false)
    }

    fn prompt_sign_in(&self) {
        info!(var = %self.var, "sign-in required: set the token variable and retry");
    }
}
