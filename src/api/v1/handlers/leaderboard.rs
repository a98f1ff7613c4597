/*
 * Responsibility
 * - GET /leaderboard (points 降順, ?limit / ?game)
 * - affinity は 1 query でまとめて読み、account 順を保ったまま組み立てる
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::profile::{AccountResponse, LeaderboardQuery},
        extractors::ApiQuery,
    },
    error::AppError,
    services::profile,
    state::AppState,
};

pub async fn leaderboard(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LeaderboardQuery>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let limit = query
        .validate()
        .map_err(|msg| AppError::bad_request("bad_request", msg))?;

    let game_id = match query.game.as_deref() {
        Some(public_id) => Some(state.id_codec.decode(public_id)?),
        None => None,
    };

    let accounts = state.accounts.leaderboard(limit, game_id).await?;
    let ids: Vec<i64> = accounts.iter().map(|a| a.id).collect();
    let affinities = state.games.affinities_for(&ids).await?;

    let res = profile::assemble(accounts, affinities)
        .into_iter()
        .map(|p| AccountResponse::from_profile(p, &state.id_codec))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(res))
}
