/*
 * Responsibility
 * - GET /gamers/{id} (公開プロフィール)
 * - Path の公開 ID は PublicGamerId extractor で内部 ID へ復号済み
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{dto::profile::AccountResponse, extractors::PublicGamerId},
    error::AppError,
    services::profile::Profile,
    state::AppState,
};

pub async fn get_gamer(
    State(state): State<AppState>,
    gamer_id: PublicGamerId,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state
        .accounts
        .get(gamer_id.id)
        .await?
        .ok_or(AppError::not_found("gamer"))?;

    let affinities = state.games.affinities_for(&[account.id]).await?;
    let profile = Profile::new(account, &affinities);

    Ok(Json(AccountResponse::from_profile(profile, &state.id_codec)?))
}
