/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が token 検証 + account 解決をして request extensions に格納し、
 *   handler はこの型だけを受け取る
 *
 * Notes
 * - JWT / JWKS の検証ロジックは services::auth 側の責務
 */
use crate::repos::account_repo::AccountRow;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `account` は token の `sub` に紐づくローカル account (初回は自動作成済み)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub account: AccountRow,
}

impl AuthCtx {
    pub fn new(account: AccountRow) -> Self {
        Self { account }
    }

    pub fn account_id(&self) -> i64 {
        self.account.id
    }
}
