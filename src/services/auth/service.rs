use thiserror::Error;

use crate::repos::account_repo::AccountRow;
use crate::services::auth::resolver::{IdentityResolver, ResolveError};
use crate::services::auth::verifier::{AuthFailure, TokenVerifier};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Rejected(#[from] AuthFailure),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Verify → resolve. The only entry point the HTTP layer uses.
#[derive(Debug)]
pub struct AuthService {
    verifier: TokenVerifier,
    resolver: IdentityResolver,
}

impl AuthService {
    pub fn new(verifier: TokenVerifier, resolver: IdentityResolver) -> Self {
        Self { verifier, resolver }
    }

    pub async fn authenticate(&self, raw_header: Option<&str>) -> Result<AccountRow, AuthError> {
        let claims = self.verifier.verify(raw_header).await?;
        let account = self.resolver.resolve(&claims).await?;
        Ok(account)
    }
}
