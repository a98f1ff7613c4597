/*
 * Responsibility
 * - GET/PUT /profile (認証必須, 自分の account)
 * - AuthCtx は middleware が検証 + 解決済みのものを extractor で受け取る
 * - PUT は DTO validation → 公開 game id の復号 → repo で一括更新
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::profile::{AccountResponse, UpdateProfileRequest},
        extractors::{ApiJson, AuthCtxExtractor},
    },
    error::AppError,
    repos::account_repo::{AccountRow, AffinityInput, ProfileChanges},
    services::profile::Profile,
    state::AppState,
};

pub async fn get_profile(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<AccountResponse>, AppError> {
    let res = respond(&state, ctx.account).await?;
    Ok(Json(res))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("bad_request", msg))?;

    let games = req
        .games
        .as_ref()
        .map(|games| {
            games
                .iter()
                .map(|g| -> Result<AffinityInput, AppError> {
                    Ok(AffinityInput {
                        game_id: state.id_codec.decode(&g.game_id)?,
                        // ranges checked by validate()
                        skill_level: g.skill_level as i16,
                        hours_played: g.hours_played as i32,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let changes = ProfileChanges {
        display_name: req.display_name.map(|n| n.trim().to_string()),
        avatar_url: req.avatar_url,
        level: req.level,
        points: req.points,
    };

    let account = state
        .accounts
        .save_profile(ctx.account_id(), &changes, games.as_deref())
        .await?
        .ok_or(AppError::not_found("account"))?;

    tracing::info!(account_id = account.id, "profile updated");

    let res = respond(&state, account).await?;
    Ok(Json(res))
}

async fn respond(state: &AppState, account: AccountRow) -> Result<AccountResponse, AppError> {
    let affinities = state.games.affinities_for(&[account.id]).await?;
    let profile = Profile::new(account, &affinities);
    Ok(AccountResponse::from_profile(profile, &state.id_codec)?)
}
