/*
 * Responsibility
 * - account + game affinity から公開プロフィールを組み立てる
 * - top_games / favorite_game の決定ルールをここに閉じ込める
 */
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::repos::account_repo::AccountRow;
use crate::repos::game_repo::AffinityRow;

pub const TOP_GAMES_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub account: AccountRow,
    pub top_games: Vec<String>,
    pub favorite_game: Option<String>,
}

impl Profile {
    pub fn new(account: AccountRow, affinities: &[AffinityRow]) -> Self {
        let mut own: Vec<&AffinityRow> = affinities
            .iter()
            .filter(|a| a.account_id == account.id)
            .collect();

        let favorite_game = own
            .iter()
            .copied()
            .min_by(|a, b| by_hours(a, b))
            .map(|a| a.game_name.clone());

        own.sort_by(|a, b| by_skill(a, b));
        let top_games = own
            .into_iter()
            .take(TOP_GAMES_LEN)
            .map(|a| a.game_name.clone())
            .collect();

        Self {
            account,
            top_games,
            favorite_game,
        }
    }
}

/// Build profiles for many accounts from one batched affinity read, keeping account order.
pub fn assemble(accounts: Vec<AccountRow>, affinities: Vec<AffinityRow>) -> Vec<Profile> {
    let mut by_account: HashMap<i64, Vec<AffinityRow>> = HashMap::new();
    for affinity in affinities {
        by_account
            .entry(affinity.account_id)
            .or_default()
            .push(affinity);
    }

    accounts
        .into_iter()
        .map(|account| {
            let own = by_account.remove(&account.id).unwrap_or_default();
            Profile::new(account, &own)
        })
        .collect()
}

// skill desc, hours desc, name asc
fn by_skill(a: &AffinityRow, b: &AffinityRow) -> Ordering {
    b.skill_level
        .cmp(&a.skill_level)
        .then(b.hours_played.cmp(&a.hours_played))
        .then_with(|| a.game_name.cmp(&b.game_name))
}

// hours desc, skill desc, name asc
fn by_hours(a: &AffinityRow, b: &AffinityRow) -> Ordering {
    b.hours_played
        .cmp(&a.hours_played)
        .then(b.skill_level.cmp(&a.skill_level))
        .then_with(|| a.game_name.cmp(&b.game_name))
}
