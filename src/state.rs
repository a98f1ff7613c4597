/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - accounts / games: storage (PostgreSQL or memory) を trait object で保持
 *   - id_codec: 公開 ID の encode/decode
 *   - auth: token 検証 + account 解決 (middleware から使う)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::account_repo::AccountRepo;
use crate::repos::game_repo::GameRepo;
use crate::services::auth::AuthService;
use crate::services::id_codec::IdCodec;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepo>,
    pub games: Arc<dyn GameRepo>,
    pub id_codec: IdCodec,
    pub auth: Arc<AuthService>,
}
