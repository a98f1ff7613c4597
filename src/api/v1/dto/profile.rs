/*
 * Responsibility
 * - profile / leaderboard の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 * - 公開 ID を返す場合は、encode 済みの値を返す (内部 ID を漏らさない)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::repos::account_repo::DISPLAY_NAME_MAX_CHARS;
use crate::services::id_codec::{self, IdCodec};
use crate::services::profile::Profile;

pub const AVATAR_URL_MAX_LEN: usize = 256;
pub const SKILL_LEVELS: std::ops::RangeInclusive<i64> = 1..=5;

pub const LEADERBOARD_DEFAULT_LIMIT: i64 = 50;
pub const LEADERBOARD_MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    // Tri-state:
    // - None: field missing (do not update)
    // - Some(None): null (set NULL)
    // - Some(Some(v)): set value
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: Option<Option<String>>,
    pub level: Option<i32>,
    pub points: Option<i64>,
    // Present: replaces the whole affinity set (empty list clears it)
    pub games: Option<Vec<GameAffinityRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct GameAffinityRequest {
    pub game_id: String, // encoded
    pub skill_level: i64,
    pub hours_played: i64,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.display_name {
            if name.trim().is_empty() {
                return Err("display_name cannot be empty");
            }
            if name.trim().chars().count() > DISPLAY_NAME_MAX_CHARS {
                return Err("display_name must be <= 50 chars");
            }
        }
        if let Some(Some(url)) = &self.avatar_url {
            if url.len() > AVATAR_URL_MAX_LEN {
                return Err("avatar_url must be <= 256 chars");
            }
            let parsed = Url::parse(url).map_err(|_| "avatar_url must be an absolute URL")?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err("avatar_url must be an http(s) URL");
            }
        }
        if let Some(level) = self.level
            && level < 1
        {
            return Err("level must be >= 1");
        }
        if let Some(points) = self.points
            && points < 0
        {
            return Err("points must be >= 0");
        }
        if let Some(games) = &self.games {
            for game in games {
                if !SKILL_LEVELS.contains(&game.skill_level) {
                    return Err("skill_level must be between 1 and 5");
                }
                if game.hours_played < 0 || game.hours_played > i64::from(i32::MAX) {
                    return Err("hours_played is out of range");
                }
            }
            let mut ids: Vec<&str> = games.iter().map(|g| g.game_id.as_str()).collect();
            ids.sort_unstable();
            if ids.windows(2).any(|w| w[0] == w[1]) {
                return Err("games must not contain the same game twice");
            }
        }

        Ok(())
    }
}

/// Distinguishes an explicit `null` from a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
    pub game: Option<String>, // encoded
}

impl LeaderboardQuery {
    pub fn validate(&self) -> Result<i64, &'static str> {
        let limit = self.limit.unwrap_or(LEADERBOARD_DEFAULT_LIMIT);
        if !(1..=LEADERBOARD_MAX_LIMIT).contains(&limit) {
            return Err("limit must be between 1 and 100");
        }
        Ok(limit)
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String, // encoded
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub level: i32,
    pub points: i64,
    pub created_at: DateTime<Utc>,
    pub top_games: Vec<String>,
    pub favorite_game: Option<String>,
}

impl AccountResponse {
    pub fn from_profile(profile: Profile, codec: &IdCodec) -> id_codec::Result<Self> {
        let account = profile.account;
        Ok(Self {
            id: codec.encode(account.id)?,
            display_name: account.display_name,
            avatar_url: account.avatar_url,
            level: account.level,
            points: account.points,
            created_at: account.created_at,
            top_games: profile.top_games,
            favorite_game: profile.favorite_game,
        })
    }
}
