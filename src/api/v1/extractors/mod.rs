/*
 * Responsibility
 * - handler 共通の extractor を束ねる
 *   - auth_ctx: 認証済み account
 *   - public_id: Path の公開 ID → 内部 ID
 *   - request_body: Json / Query (rejection を AppError に揃える)
 */
mod auth_ctx;
mod public_id;
mod request_body;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use public_id::*;
pub use request_body::{ApiJson, ApiQuery};
