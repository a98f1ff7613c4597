use std::sync::Arc;

use thiserror::Error;

use crate::repos::account_repo::{
    AccountRepo, AccountRow, DISPLAY_NAME_MAX_CHARS, NewAccount, ProfileChanges,
};
use crate::repos::error::RepoError;
use crate::services::auth::verifier::VerifiedClaims;

/// Whether profile fields follow the provider's claims after the first login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileSyncPolicy {
    /// Claims only seed the account on creation.
    #[default]
    Never,
    /// `display_name` is overwritten from `nickname` on every login.
    OnLogin,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    // create hit the unique constraint but the re-read found nothing
    #[error("account for subject disappeared after create conflict")]
    Vanished,
}

/// Maps a verified provider subject to the local account, creating it on first sight.
pub struct IdentityResolver {
    accounts: Arc<dyn AccountRepo>,
    sync_policy: ProfileSyncPolicy,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("sync_policy", &self.sync_policy)
            .finish()
    }
}

impl IdentityResolver {
    pub fn new(accounts: Arc<dyn AccountRepo>, sync_policy: ProfileSyncPolicy) -> Self {
        Self {
            accounts,
            sync_policy,
        }
    }

    pub async fn resolve(&self, claims: &VerifiedClaims) -> Result<AccountRow, ResolveError> {
        if let Some(account) = self.accounts.find_by_subject(&claims.subject).await? {
            return self.sync(account, claims).await;
        }

        let display_name = seed_display_name(claims);
        let new = NewAccount {
            external_subject: &claims.subject,
            display_name: &display_name,
        };

        match self.accounts.create(new).await {
            Ok(account) => {
                tracing::info!(account_id = account.id, "provisioned account for new subject");
                Ok(account)
            }
            Err(RepoError::Conflict) => {
                // A concurrent first login won the insert; one re-read, no loop.
                tracing::debug!("account create conflicted, re-reading");
                self.accounts
                    .find_by_subject(&claims.subject)
                    .await?
                    .ok_or(ResolveError::Vanished)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn sync(
        &self,
        account: AccountRow,
        claims: &VerifiedClaims,
    ) -> Result<AccountRow, ResolveError> {
        if self.sync_policy == ProfileSyncPolicy::Never {
            return Ok(account);
        }

        let Some(nickname) = nickname(claims) else {
            return Ok(account);
        };
        if nickname == account.display_name {
            return Ok(account);
        }

        let changes = ProfileChanges {
            display_name: Some(nickname),
            ..Default::default()
        };
        let updated = self.accounts.save_profile(account.id, &changes, None).await?;

        Ok(updated.unwrap_or(account))
    }
}

fn nickname(claims: &VerifiedClaims) -> Option<String> {
    claims
        .nickname
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| n.chars().take(DISPLAY_NAME_MAX_CHARS).collect())
}

fn seed_display_name(claims: &VerifiedClaims) -> String {
    nickname(claims)
        .unwrap_or_else(|| claims.subject.chars().take(DISPLAY_NAME_MAX_CHARS).collect())
}
