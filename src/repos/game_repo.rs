/*
 * Responsibility
 * - games カタログと account ごとの game affinity の読み出し
 */
use async_trait::async_trait;
use sqlx::FromRow;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct GameRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub icon_url: Option<String>,
}

/// One (account, game) link joined with the game name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AffinityRow {
    pub account_id: i64,
    pub game_id: i64,
    pub game_name: String,
    pub skill_level: i16,
    pub hours_played: i32,
}

#[async_trait]
pub trait GameRepo: Send + Sync + 'static {
    async fn list_games(&self) -> RepoResult<Vec<GameRow>>;

    async fn affinities_for(&self, account_ids: &[i64]) -> RepoResult<Vec<AffinityRow>>;
}
