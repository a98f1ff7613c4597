/**
 * Responsibility
 *
 * 主な責務
 *  - リソースごとの「意味付きID型」を宣言する
 *
 * 置くもの
 *  - GamerTag などのタグ型
 *  - type PublicGamerId = PublicId<GamerTag> のような alias
 *
 * 置かないもの
 *  - decode ロジック
 *  - extractor 実装
 *  - AppState / codec 参照
 */
use super::core::PublicId;

/**
 * 以下に pub で列挙するものは、./mod.rs 経由で全て公開されるため注意
 * pub use types::*;
 */
// gamers (accounts)
pub enum GamerTag {}
pub type PublicGamerId = PublicId<GamerTag>;
