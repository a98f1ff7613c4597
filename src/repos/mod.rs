/*
 * Responsibility
 * - 永続化層の公開インターフェース
 * - handler / service は trait (AccountRepo / GameRepo) 越しに触る
 */
pub mod account_repo;
pub mod error;
pub mod game_repo;
pub mod memory;
pub mod postgres;
