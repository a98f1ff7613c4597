/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - public: /health, /leaderboard, /gamers/{id}, /games
 * - protected: /profile (Bearer 必須, route_layer で適用)
 */
use axum::{Router, routing::get};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{
    gamers::get_gamer,
    games::list_games,
    health::health,
    leaderboard::leaderboard,
    profile::{get_profile, update_profile},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/leaderboard", get(leaderboard))
        .route("/gamers/{gamer_id}", get(get_gamer))
        .route("/games", get(list_games));

    let protected = Router::new().route("/profile", get(get_profile).put(update_profile));
    let protected = middleware::auth::access::apply(protected, state);

    public.merge(protected)
}
