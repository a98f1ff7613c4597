//! Process-local store used for local development (`STORAGE_BACKEND=memory`) and tests.
//!
//! Mirrors the PostgreSQL constraints that callers depend on:
//! - `external_subject` is unique (`RepoError::Conflict`)
//! - affinities must reference an existing game (`RepoError::MissingReference`)
//! - one affinity per (account, game)
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::account_repo::{
    AccountRepo, AccountRow, AffinityInput, NewAccount, ProfileChanges,
};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::game_repo::{AffinityRow, GameRepo, GameRow};

/// Catalog seeded into a fresh store (same rows as the initial migration).
pub const DEFAULT_GAMES: &[(&str, &str)] = &[
    ("Valorant", "FPS"),
    ("Fortnite", "Battle Royale"),
    ("CS:GO", "FPS"),
    ("League of Legends", "MOBA"),
];

#[derive(Debug, Default)]
struct Inner {
    next_account_id: i64,
    next_game_id: i64,
    accounts: BTreeMap<i64, AccountRow>,
    subjects: HashMap<String, i64>,
    games: BTreeMap<i64, GameRow>,
    // (account_id, game_id) -> (skill_level, hours_played)
    affinities: BTreeMap<(i64, i64), (i16, i32)>,
}

impl Inner {
    fn insert_game(&mut self, name: &str, category: &str) -> RepoResult<GameRow> {
        if self.games.values().any(|g| g.name == name) {
            return Err(RepoError::Conflict);
        }
        self.next_game_id += 1;
        let row = GameRow {
            id: self.next_game_id,
            name: name.to_string(),
            category: category.to_string(),
            icon_url: None,
        };
        self.games.insert(row.id, row.clone());
        Ok(row)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_default_games() -> RepoResult<Self> {
        Self::with_games(DEFAULT_GAMES).await
    }

    /// Fresh store holding `catalog`. A repeated name is a `Conflict`, as with
    /// the UNIQUE constraint on `games.name`.
    pub async fn with_games(catalog: &[(&str, &str)]) -> RepoResult<Self> {
        let store = Self::new();
        {
            let mut inner = store.inner.write().await;
            for (name, category) in catalog {
                inner.insert_game(name, category)?;
            }
        }
        Ok(store)
    }

    #[cfg(test)]
    pub async fn account_count(&self) -> usize {
        self.inner.read().await.accounts.len()
    }
}

#[async_trait]
impl AccountRepo for MemoryStore {
    async fn find_by_subject(&self, subject: &str) -> RepoResult<Option<AccountRow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .subjects
            .get(subject)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn create(&self, new: NewAccount<'_>) -> RepoResult<AccountRow> {
        let mut inner = self.inner.write().await;

        if inner.subjects.contains_key(new.external_subject) {
            return Err(RepoError::Conflict);
        }

        inner.next_account_id += 1;
        let row = AccountRow {
            id: inner.next_account_id,
            external_subject: Some(new.external_subject.to_string()),
            display_name: new.display_name.to_string(),
            avatar_url: None,
            level: 1,
            points: 0,
            created_at: Utc::now(),
        };
        inner
            .subjects
            .insert(new.external_subject.to_string(), row.id);
        inner.accounts.insert(row.id, row.clone());

        Ok(row)
    }

    async fn get(&self, id: i64) -> RepoResult<Option<AccountRow>> {
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn save_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
        games: Option<&[AffinityInput]>,
    ) -> RepoResult<Option<AccountRow>> {
        let mut inner = self.inner.write().await;

        if !inner.accounts.contains_key(&id) {
            return Ok(None);
        }

        // Validate everything before mutating so a failure leaves no partial write.
        if let Some(games) = games {
            for (i, game) in games.iter().enumerate() {
                if !inner.games.contains_key(&game.game_id) {
                    return Err(RepoError::MissingReference);
                }
                if games[..i].iter().any(|g| g.game_id == game.game_id) {
                    return Err(RepoError::Conflict);
                }
            }
        }

        let row = {
            let Some(account) = inner.accounts.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = &changes.display_name {
                account.display_name = name.clone();
            }
            if let Some(avatar_url) = &changes.avatar_url {
                account.avatar_url = avatar_url.clone();
            }
            if let Some(level) = changes.level {
                account.level = level;
            }
            if let Some(points) = changes.points {
                account.points = points;
            }
            account.clone()
        };

        if let Some(games) = games {
            inner.affinities.retain(|(account_id, _), _| *account_id != id);
            for game in games {
                inner
                    .affinities
                    .insert((id, game.game_id), (game.skill_level, game.hours_played));
            }
        }

        Ok(Some(row))
    }

    async fn leaderboard(&self, limit: i64, game_id: Option<i64>) -> RepoResult<Vec<AccountRow>> {
        let inner = self.inner.read().await;

        let mut rows: Vec<AccountRow> = inner
            .accounts
            .values()
            .filter(|a| match game_id {
                Some(game_id) => inner.affinities.contains_key(&(a.id, game_id)),
                None => true,
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.points.cmp(&a.points).then(a.id.cmp(&b.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(rows)
    }
}

#[async_trait]
impl GameRepo for MemoryStore {
    async fn list_games(&self) -> RepoResult<Vec<GameRow>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<GameRow> = inner.games.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn affinities_for(&self, account_ids: &[i64]) -> RepoResult<Vec<AffinityRow>> {
        let inner = self.inner.read().await;

        let rows = inner
            .affinities
            .iter()
            .filter(|((account_id, _), _)| account_ids.contains(account_id))
            .filter_map(|((account_id, game_id), (skill_level, hours_played))| {
                inner.games.get(game_id).map(|game| AffinityRow {
                    account_id: *account_id,
                    game_id: *game_id,
                    game_name: game.name.clone(),
                    skill_level: *skill_level,
                    hours_played: *hours_played,
                })
            })
            .collect();

        Ok(rows)
    }
}
