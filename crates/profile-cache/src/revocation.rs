//! Token revocation boundary.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;

/// Revocation backend consumed when a user revokes an issued token.
///
/// The profile cache only records token snapshots; actually invalidating
/// a token is the job of whatever revocation mechanism the deployment
/// runs. Implementations typically write the identifier into a shared
/// revocation store consulted during token validation.
#[async_trait]
pub trait RevocationCache: Send + Sync {
    /// Marks a token chain as revoked for its remaining lifetime.
    ///
    /// `ttl` should match the time until the token's `exp`; keeping the
    /// entry longer is wasted space, shorter re-admits the token.
    ///
    /// ## Errors
    ///
    /// Returns an error if the revocation entry could not be written.
    async fn revoke(&self, token_root_id: &str, ttl: Duration) -> CacheResult<()>;
}
