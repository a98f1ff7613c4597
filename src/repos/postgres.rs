/*
 * Responsibility
 * - accounts / games / game_affinities テーブル向け SQLx 操作
 * - PgPool を持ち AccountRepo / GameRepo を実装
 * - 一意制約違反 (23505) は RepoError::Conflict、FK 違反 (23503) は MissingReference
 */
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::account_repo::{
    AccountRepo, AccountRow, AffinityInput, NewAccount, ProfileChanges,
};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::game_repo::{AffinityRow, GameRepo, GameRow};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepo for PgStore {
    async fn find_by_subject(&self, subject: &str) -> RepoResult<Option<AccountRow>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, external_subject, display_name, avatar_url, level, points, created_at
            FROM accounts
            WHERE external_subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, new: NewAccount<'_>) -> RepoResult<AccountRow> {
        // No ON CONFLICT: the caller needs to see the violation to re-read the winner.
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (external_subject, display_name, level, points)
            VALUES ($1, $2, 1, 0)
            RETURNING id, external_subject, display_name, avatar_url, level, points, created_at
            "#,
        )
        .bind(new.external_subject)
        .bind(new.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get(&self, id: i64) -> RepoResult<Option<AccountRow>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, external_subject, display_name, avatar_url, level, points, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn save_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
        games: Option<&[AffinityInput]>,
    ) -> RepoResult<Option<AccountRow>> {
        let mut tx = self.pool.begin().await?;

        let avatar_url = changes.avatar_url.as_ref().map(|inner| inner.as_deref());

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts
            SET
                display_name = COALESCE($2, display_name),
                avatar_url = CASE
                    WHEN $3 = false THEN avatar_url
                    ELSE $4
                END,
                level = COALESCE($5, level),
                points = COALESCE($6, points)
            WHERE id = $1
            RETURNING id, external_subject, display_name, avatar_url, level, points, created_at
            "#,
        )
        .bind(id)
        .bind(changes.display_name.as_deref())
        .bind(avatar_url.is_some()) // $3: flag to set avatar_url
        .bind(avatar_url.flatten()) // $4: new avatar_url value
        .bind(changes.level)
        .bind(changes.points)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        // Dropping `tx` rolls back.
        let Some(row) = row else {
            return Ok(None);
        };

        if let Some(games) = games {
            sqlx::query(
                r#"
                DELETE FROM game_affinities
                WHERE account_id = $1
                "#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;

            for game in games {
                sqlx::query(
                    r#"
                    INSERT INTO game_affinities (account_id, game_id, skill_level, hours_played)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(id)
                .bind(game.game_id)
                .bind(game.skill_level)
                .bind(game.hours_played)
                .execute(&mut *tx)
                .await
                .map_err(RepoError::from_sqlx)?;
            }
        }

        tx.commit().await?;

        Ok(Some(row))
    }

    async fn leaderboard(&self, limit: i64, game_id: Option<i64>) -> RepoResult<Vec<AccountRow>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT a.id, a.external_subject, a.display_name, a.avatar_url, a.level, a.points, a.created_at
            FROM accounts a
            WHERE $2::BIGINT IS NULL
               OR EXISTS (
                    SELECT 1 FROM game_affinities ga
                    WHERE ga.account_id = a.id AND ga.game_id = $2
               )
            ORDER BY a.points DESC, a.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl GameRepo for PgStore {
    async fn list_games(&self) -> RepoResult<Vec<GameRow>> {
        let rows = sqlx::query_as::<_, GameRow>(
            r#"
            SELECT id, name, category, icon_url
            FROM games
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn affinities_for(&self, account_ids: &[i64]) -> RepoResult<Vec<AffinityRow>> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, AffinityRow>(
            r#"
            SELECT ga.account_id, ga.game_id, g.name AS game_name, ga.skill_level, ga.hours_played
            FROM game_affinities ga
            JOIN games g ON g.id = ga.game_id
            WHERE ga.account_id = ANY($1)
            "#,
        )
        .bind(account_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
