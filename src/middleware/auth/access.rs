//! access token (JWT, JWKS 検証) → account 解決 → AuthCtx を extensions に入れる
//!
//! - `Authorization` ヘッダの解釈・署名/iss/aud/exp 検証・account の自動作成は
//!   `services::auth::AuthService` 側で実施する
//! - ここは HTTP との接続 (ヘッダ取り出し, 401 への変換, extensions への格納) だけ
//! - 失敗時は handler を呼ばずに 401 を返す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthError, AuthFailure};
use crate::state::AppState;

/// 保護したい route 群に認証を掛ける。
///
/// `route_layer` なので、マッチしない path は 401 ではなく 404 のまま。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/profile", get(get_profile));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let raw = match req.headers().get(header::AUTHORIZATION) {
        None => None,
        // non-visible ASCII cannot be a bearer token
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| reject(AuthFailure::MalformedHeader))?,
        ),
    };

    let account = match state.auth.authenticate(raw).await {
        Ok(account) => account,
        Err(AuthError::Rejected(failure)) => return Err(reject(failure)),
        Err(err) => return Err(err.into()),
    };

    tracing::debug!(account_id = account.id, "request authenticated");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(account));

    Ok(next.run(req).await)
}

fn reject(failure: AuthFailure) -> AppError {
    tracing::warn!(reason = failure.code(), "access token rejected");
    AppError::Unauthorized(failure)
}
