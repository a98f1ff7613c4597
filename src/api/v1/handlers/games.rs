/*
 * Responsibility
 * - GET /games (カタログ一覧, 名前順)
 */
use axum::{Json, extract::State};

use crate::{api::v1::dto::games::GameResponse, error::AppError, state::AppState};

pub async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<GameResponse>>, AppError> {
    let rows = state.games.list_games().await?;

    let res = rows
        .into_iter()
        .map(|row| GameResponse::from_row(row, &state.id_codec))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(res))
}
