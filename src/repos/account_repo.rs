/*
 * Responsibility
 * - accounts (gamer profile) の永続化の契約
 * - external_subject の一意性は storage 側で保証する (check-then-create はしない)
 * - 実装: postgres.rs (SQLx) / memory.rs (プロセス内)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::repos::error::RepoResult;

pub const DISPLAY_NAME_MAX_CHARS: usize = 50;

/// Local identity record linked to a provider subject.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub external_subject: Option<String>,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub level: i32,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewAccount<'a> {
    pub external_subject: &'a str,
    pub display_name: &'a str,
}

/// Partial update of the profile fields.
///
/// `avatar_url` is tri-state:
/// - None: do not update
/// - Some(None): set NULL
/// - Some(Some(v)): set v
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub avatar_url: Option<Option<String>>,
    pub level: Option<i32>,
    pub points: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffinityInput {
    pub game_id: i64,
    pub skill_level: i16,
    pub hours_played: i32,
}

#[async_trait]
pub trait AccountRepo: Send + Sync + 'static {
    async fn find_by_subject(&self, subject: &str) -> RepoResult<Option<AccountRow>>;

    /// Insert a new account.
    ///
    /// Returns `RepoError::Conflict` when another account already owns the subject.
    async fn create(&self, new: NewAccount<'_>) -> RepoResult<AccountRow>;

    async fn get(&self, id: i64) -> RepoResult<Option<AccountRow>>;

    /// Apply `changes` and, when `games` is given, replace the account's whole
    /// affinity set. Both happen atomically. `Ok(None)` if the account is gone.
    async fn save_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
        games: Option<&[AffinityInput]>,
    ) -> RepoResult<Option<AccountRow>>;

    /// Accounts ordered by points (desc), optionally restricted to players of one game.
    async fn leaderboard(&self, limit: i64, game_id: Option<i64>) -> RepoResult<Vec<AccountRow>>;
}
