/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::repos::account_repo::AccountRepo;
use crate::services::auth::jwks::{HttpJwksFetcher, KeySource};
use crate::services::auth::{AuthService, IdentityResolver, TokenVerifier};

pub fn build_auth_service(
    config: &Config,
    accounts: Arc<dyn AccountRepo>,
) -> Result<Arc<AuthService>, AppError> {
    let fetcher = HttpJwksFetcher::new(config.auth_jwks_url.clone(), config.jwks_fetch_timeout)
        .map_err(|err| {
            tracing::error!(error = %err, "failed to build jwks http client");
            AppError::Internal
        })?;

    let keys = Arc::new(KeySource::new(Arc::new(fetcher)));
    let verifier = TokenVerifier::new(
        keys,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    );
    let resolver = IdentityResolver::new(accounts, config.profile_sync);

    Ok(Arc::new(AuthService::new(verifier, resolver)))
}
