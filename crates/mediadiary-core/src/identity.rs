//! Identity provider seam.
//!
//! Sign-in and session bootstrap happen outside the core; the store only
//! needs to end a session.

use crate::error::Result;

/// External identity provider.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider: Send + Sync {
    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns `DiaryError::SignOut` when the provider could not sign out.
    async fn sign_out(&self) -> Result<()>;
}
